//! checkpoint - run tar-style checkpoint actions over a simulated archive.

use anyhow::Result;
use checkpoint::cli::Cli;
use checkpoint::config::Config;
use checkpoint::simulate::{Mode, SimulatedArchive};
use checkpoint::{Checkpoint, debug, log, logger, shutdown};
use clap::{ColorChoice, Parser};
use std::time::Duration;

/// Exit status for usage errors and reported failures, as tar uses.
const EXIT_FAILURE: i32 = 2;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;
    let sim = &config.simulate;

    // An archive written to stdout pushes the listing to stderr
    let listing_to_stderr = sim.archive == "-" && sim.mode != Mode::Read;
    let mut checkpoint = Checkpoint::with_std_console(config.interval(), listing_to_stderr);

    for spec in &config.checkpoint.actions {
        if let Err(e) = checkpoint.compile_action(spec) {
            log!("error"; "{}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
    checkpoint.finish_compile()?;

    // Blocked signals must be in place before the handler thread exists
    shutdown::setup_shutdown_handler()?;

    let mut archive = SimulatedArchive::new(&sim.archive, sim.mode, sim.record_size);
    let delay = Duration::from_millis(sim.delay_ms);
    debug!(
        "simulate";
        "{} {} record(s) of {} bytes to {}",
        sim.mode,
        sim.blocks,
        sim.record_size,
        sim.archive
    );

    archive.reset_timer();
    let outcome = simulate(&mut checkpoint, &mut archive, sim.blocks, delay);
    checkpoint.finish();
    outcome?;

    debug!(
        "simulate";
        "{} record(s), {} checkpoint tick(s)",
        archive.records(),
        checkpoint.ticks()
    );

    if archive.exit_code() != 0 {
        std::process::exit(archive.exit_code());
    }
    Ok(())
}

/// Move `blocks` records, ticking the checkpoint engine for each transfer.
fn simulate(
    checkpoint: &mut Checkpoint,
    archive: &mut SimulatedArchive,
    blocks: u64,
    delay: Duration,
) -> Result<()> {
    for _ in 0..blocks {
        if shutdown::is_shutdown() {
            break;
        }
        for &is_write in archive.transfer_record() {
            checkpoint.run_tick(is_write, archive)?;
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
    Ok(())
}
