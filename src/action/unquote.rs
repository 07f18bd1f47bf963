//! Unquoting of action arguments (`echo=`, `exec=`, `ttyout=`).

/// Strip one pair of matching wrapping quotes, then resolve backslash escapes.
///
/// `"hello"` and `'hello'` become `hello`; a lone quote or mismatched pair is
/// left untouched. Quote stripping always happens before escape resolution,
/// so an escaped quote at either end never counts as wrapping.
pub fn unquote(text: &str) -> String {
    resolve_escapes(strip_quotes(text))
}

/// Remove a single matching `'…'` or `"…"` pair around the whole text.
fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(&q @ (b'"' | b'\'')) if bytes.len() > 1 && bytes[bytes.len() - 1] == q => {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

/// Resolve C-style escapes.
///
/// Supports `\\ \a \b \f \n \r \t \v \?` and up to three octal digits.
/// An octal value names a Latin-1 character, so `\377` is `ÿ` and reaches
/// the output UTF-8 encoded. Unknown escapes are kept verbatim, backslash
/// included.
fn resolve_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };

        match next {
            '\\' => out.push('\\'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '?' => out.push('?'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                // \777 overflows a byte; keep the low eight bits like C does
                out.push(char::from((value & 0xff) as u8));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_one_matching_pair() {
        assert_eq!(unquote("\"hello\""), "hello");
        assert_eq!(unquote("'hello'"), "hello");
        assert_eq!(unquote("hello"), "hello");
    }

    #[test]
    fn test_unquote_is_idempotent_on_plain_text() {
        let once = unquote("plain text");
        assert_eq!(unquote(&once), once);
    }

    #[test]
    fn test_does_not_double_unwrap() {
        assert_eq!(unquote("'it''s'"), "it''s");
        assert_eq!(unquote("\"'x'\""), "'x'");
    }

    #[test]
    fn test_mismatched_or_lone_quotes_are_kept() {
        assert_eq!(unquote("\"hello'"), "\"hello'");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(unquote(r"a\tb\nc"), "a\tb\nc");
        assert_eq!(unquote(r"status\r"), "status\r");
        assert_eq!(unquote(r"back\\slash"), "back\\slash");
        assert_eq!(unquote(r"\101\102"), "AB");
        assert_eq!(unquote(r"\0"), "\0");
    }

    #[test]
    fn test_high_octal_is_latin1_char() {
        assert_eq!(unquote(r"\377"), "\u{ff}");
        assert_eq!(unquote(r"\377").as_bytes(), [0xc3, 0xbf]);
        assert_eq!(unquote(r"\777"), "\u{ff}");
    }

    #[test]
    fn test_unknown_escape_and_trailing_backslash_kept() {
        assert_eq!(unquote(r"\q"), "\\q");
        assert_eq!(unquote("end\\"), "end\\");
    }

    #[test]
    fn test_quotes_stripped_before_escapes() {
        assert_eq!(unquote(r#""\r""#), "\r");
    }
}
