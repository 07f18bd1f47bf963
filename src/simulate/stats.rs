//! Byte totals in tar's `Total bytes written: 10240 (10KiB, 5.0MiB/s)` style.

use std::time::Duration;

const UNITS: [&str; 9] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi", "Yi"];

/// Human-readable size in binary units, rounded up.
///
/// One decimal below 10 once scaled (`1.5KiB`), whole numbers otherwise
/// (`10KiB`, `512B`).
pub fn human_bytes(bytes: f64) -> String {
    let mut value = bytes.max(0.0);
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit > 0 && value < 10.0 {
        let tenths = (value * 10.0).ceil() / 10.0;
        if tenths < 10.0 {
            return format!("{tenths:.1}{}B", UNITS[unit]);
        }
    }
    format!("{:.0}{}B", value.ceil(), UNITS[unit])
}

/// One figure: `label: bytes (size, rate/s)`; no `label: ` when empty.
pub fn stat_line(label: &str, bytes: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    #[allow(clippy::cast_precision_loss)] // display only
    let size = human_bytes(bytes as f64);
    #[allow(clippy::cast_precision_loss)]
    let rate = if secs > 0.0 {
        human_bytes(bytes as f64 / secs)
    } else {
        "?".to_string()
    };

    if label.is_empty() {
        format!("{bytes} ({size}, {rate}/s)")
    } else {
        format!("{label}: {bytes} ({size}, {rate}/s)")
    }
}

/// Plain figure for deleted bytes: `label: bytes`, or nothing without a label.
pub fn deleted_line(label: &str, bytes: u64) -> String {
    if label.is_empty() {
        String::new()
    } else {
        format!("{label}: {bytes}")
    }
}
