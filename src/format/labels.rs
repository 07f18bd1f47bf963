//! Splitting of the `%{...}T` label argument.

use thiserror::Error;

/// At most one label each for read, written and deleted bytes.
pub const MAX_LABELS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("cannot split string '{0}': missing closing quote")]
    MissingQuote(String),

    #[error("too many words in '{0}'")]
    TooMany(String),
}

/// Split `arg` on commas.
///
/// Single and double quotes group text containing commas; a backslash
/// escapes the next character outside single quotes. Empty words are kept,
/// so `read,,deleted` leaves the middle label blank, but an empty argument
/// has no words at all.
pub fn split_labels(arg: &str) -> Result<Vec<String>, LabelError> {
    if arg.is_empty() {
        return Ok(Vec::new());
    }

    let mut words = Vec::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;
    let mut chars = arg.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => word.push(c),
            (_, '\\') => match chars.next() {
                Some(escaped) => word.push(escaped),
                None => word.push('\\'),
            },
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => quote = Some(c),
            (None, ',') => words.push(std::mem::take(&mut word)),
            (None, c) => word.push(c),
        }
    }

    if quote.is_some() {
        return Err(LabelError::MissingQuote(arg.to_string()));
    }
    words.push(word);

    if words.len() > MAX_LABELS {
        return Err(LabelError::TooMany(arg.to_string()));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(split_labels("read,wrote").unwrap(), vec!["read", "wrote"]);
        assert_eq!(split_labels("in").unwrap(), vec!["in"]);
    }

    #[test]
    fn test_split_keeps_spaces_and_empty_words() {
        assert_eq!(
            split_labels("bytes in, ,gone").unwrap(),
            vec!["bytes in", " ", "gone"]
        );
        assert_eq!(split_labels("a,,c").unwrap(), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_empty_argument_has_no_words() {
        assert!(split_labels("").unwrap().is_empty());
        assert_eq!(split_labels(",").unwrap(), vec!["", ""]);
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(
            split_labels(r#""in, total",'out, total'"#).unwrap(),
            vec!["in, total", "out, total"]
        );
        assert_eq!(split_labels(r"a\,b,c").unwrap(), vec!["a,b", "c"]);
    }

    #[test]
    fn test_split_errors() {
        assert_eq!(
            split_labels("a,b,c,d"),
            Err(LabelError::TooMany("a,b,c,d".into()))
        );
        assert_eq!(
            split_labels("\"open"),
            Err(LabelError::MissingQuote("\"open".into()))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LabelError::TooMany("a,b,c,d".into()).to_string(),
            "too many words in 'a,b,c,d'"
        );
    }
}
