// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::model::{Entry, Key, KeyError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("expected KEY=VALUE")]
    MissingEquals,
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    #[error("unterminated quote")]
    UnterminatedQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid line(s): {}", lines.join(", "))]
    InvalidLines { lines: Vec<String> },
}

impl ParseError {
    pub fn lines(&self) -> &[String] {
        match self {
            Self::InvalidLines { lines } => lines,
        }
    }
}

/// Parses one `KEY=value` or `export KEY=value` line.
///
/// Quoted segments (`'...'`, `"..."`) may be concatenated with bare text. An unquoted `#`
/// preceded by whitespace starts a description that runs to the end of the line.
pub fn parse_assignment(line: &str) -> Result<(Key, Entry), AssignmentError> {
    let line = line.trim_start();
    let line = strip_export(line);
    let (raw_key, raw_value) = line.split_once('=').ok_or(AssignmentError::MissingEquals)?;
    let key = Key::new(raw_key.trim())?;
    let (value, description) = lex_value(raw_value)?;
    Ok((key, Entry::new(value).with_description(description)))
}

/// Parses a block of assignment lines into a key to entry map.
///
/// Blank lines and `#` comment lines are skipped; a value that starts with a quote left open
/// continues on the next line. The last occurrence of a key wins. Any invalid line rejects the whole text.
pub fn parse_env_file(text: &str) -> Result<BTreeMap<Key, Entry>, ParseError> {
    let mut entries = BTreeMap::new();
    let mut invalid = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let candidate = match pending.take() {
            Some(mut joined) => {
                joined.push('\n');
                joined.push_str(raw);
                joined
            }
            None => {
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                raw.to_owned()
            }
        };

        match parse_assignment(&candidate) {
            Ok((key, entry)) => {
                entries.insert(key, entry);
            }
            Err(AssignmentError::UnterminatedQuote) => pending = Some(candidate),
            Err(_) => invalid.push(candidate.trim().to_owned()),
        }
    }
    if let Some(unterminated) = pending {
        invalid.push(unterminated.trim().to_owned());
    }

    if invalid.is_empty() {
        Ok(entries)
    } else {
        Err(ParseError::InvalidLines { lines: invalid })
    }
}

fn strip_export(line: &str) -> &str {
    match line.strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => line,
    }
}

/// Splits a raw value into its text and optional trailing description.
///
/// A quote opens a quoted segment only at the start of the value or right after a closed
/// segment (optionally through a `\'` or `\"` escape, as in `'it'\''s'`). Everywhere else
/// quotes and backslashes are literal text.
fn lex_value(raw: &str) -> Result<(String, Option<String>), AssignmentError> {
    let mut value = String::new();
    let mut gap = String::new();
    let mut chars = raw.chars().peekable();
    let mut started = false;
    let mut after_quote = false;

    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            gap.push(ch);
            while let Some(&next) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                gap.push(next);
                chars.next();
            }
            if chars.peek() == Some(&'#') {
                chars.next();
                let description: String = chars.collect();
                let description = description.trim();
                let description = (!description.is_empty()).then(|| description.to_owned());
                return Ok((value, description));
            }
            after_quote = false;
            continue;
        }

        value.push_str(&gap);
        gap.clear();
        let opens_quote = !started || after_quote;
        started = true;
        match ch {
            '\\' if after_quote && matches!(chars.peek(), Some('\'' | '"')) => {
                value.extend(chars.next());
            }
            '\'' if opens_quote => {
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => value.push(inner),
                        None => return Err(AssignmentError::UnterminatedQuote),
                    }
                }
                after_quote = true;
            }
            '"' if opens_quote => {
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&escaped @ ('"' | '\\' | '$' | '`')) => {
                                value.push(escaped);
                                chars.next();
                            }
                            _ => value.push('\\'),
                        },
                        Some(inner) => value.push(inner),
                        None => return Err(AssignmentError::UnterminatedQuote),
                    }
                }
                after_quote = true;
            }
            other => {
                value.push(other);
                after_quote = false;
            }
        }
    }

    Ok((value, None))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{parse_assignment, parse_env_file, AssignmentError, ParseError};
    use crate::model::{Entry, Key, KeyError};
    use crate::shell::{format_assignment, format_export};

    fn parsed(line: &str) -> (String, String, Option<String>) {
        let (key, entry) = parse_assignment(line).unwrap();
        (key.into_string(), entry.value, entry.description)
    }

    #[rstest]
    #[case("KEY=value", "KEY", "value")]
    #[case("API_KEY=secret123", "API_KEY", "secret123")]
    #[case("EMPTY=", "EMPTY", "")]
    #[case("export KEY=value", "KEY", "value")]
    #[case("export  KEY=value", "KEY", "value")]
    #[case("KEY='value'", "KEY", "value")]
    #[case("KEY=\"value\"", "KEY", "value")]
    #[case("KEY='value with spaces'", "KEY", "value with spaces")]
    #[case("  KEY=value  ", "KEY", "value")]
    #[case("KEY= value", "KEY", " value")]
    #[case("KEY=val=ue", "KEY", "val=ue")]
    #[case("URL=http://example.com?a=1&b=2", "URL", "http://example.com?a=1&b=2")]
    #[case("KEY=value with spaces", "KEY", "value with spaces")]
    #[case("KEY=a#b", "KEY", "a#b")]
    #[case("KEY='a # b'", "KEY", "a # b")]
    #[case(r#"KEY="say \"hi\" \$HOME""#, "KEY", r#"say "hi" $HOME"#)]
    #[case(r"KEY=a\ b", "KEY", r"a\ b")]
    #[case("MSG=don't", "MSG", "don't")]
    #[case("MSG=rock'n roll", "MSG", "rock'n roll")]
    #[case(r#"MSG=say "hi""#, "MSG", r#"say "hi""#)]
    #[case(r"SHARE=\\server\share", "SHARE", r"\\server\share")]
    #[case("KEY=x 'y", "KEY", "x 'y")]
    #[case("exporter=1", "exporter", "1")]
    fn assignment_values(#[case] line: &str, #[case] key: &str, #[case] value: &str) {
        let (k, v, _) = parsed(line);
        assert_eq!((k.as_str(), v.as_str()), (key, value));
    }

    #[test]
    fn trailing_comment_becomes_description() {
        assert_eq!(
            parsed("PORT=8080   # http port "),
            ("PORT".to_owned(), "8080".to_owned(), Some("http port".to_owned()))
        );
        assert_eq!(parsed("PORT='80 # not a comment'").2, None);
        assert_eq!(parsed("EMPTY= # only a note"), ("EMPTY".to_owned(), String::new(), Some("only a note".to_owned())));
    }

    #[rstest]
    #[case("NOEQUALS", AssignmentError::MissingEquals)]
    #[case("123=value", AssignmentError::InvalidKey(KeyError::Invalid { key: "123".to_owned() }))]
    #[case("KEY-NAME=value", AssignmentError::InvalidKey(KeyError::Invalid { key: "KEY-NAME".to_owned() }))]
    #[case("=value", AssignmentError::InvalidKey(KeyError::Empty))]
    #[case("KEY='open", AssignmentError::UnterminatedQuote)]
    fn assignment_errors(#[case] line: &str, #[case] expected: AssignmentError) {
        assert_eq!(parse_assignment(line), Err(expected));
    }

    #[rstest]
    #[case("it's a test")]
    #[case("")]
    #[case("  spaced  out  ")]
    #[case("multi'quote'test")]
    #[case("a # b")]
    #[case("line one\nline two")]
    fn export_line_round_trips(#[case] value: &str) {
        let line = format_export("KEY", value);
        assert_eq!(parsed(&line), ("KEY".to_owned(), value.to_owned(), None));
    }

    #[test]
    fn export_line_for_quoted_text_matches_shell_form() {
        assert_eq!(format_export("KEY", "it's a test"), r"export KEY='it'\''s a test'");
        assert_eq!(parsed(r"export KEY='it'\''s a test'").1, "it's a test");
    }

    #[test]
    fn editor_assignment_round_trips_with_description() {
        let key = Key::new("DB_URL").unwrap();
        let entry = Entry::new("postgres://u:p@h/db?ssl=true x")
            .with_description(Some("primary database".to_owned()));
        let line = format_assignment(&key, &entry);
        assert_eq!(parse_assignment(&line), Ok((key, entry)));
    }

    #[test]
    fn env_file_skips_blanks_and_comments_and_last_wins() {
        let text = "# header\n\nA=1\r\nB='two'\n  # indented comment\nA=3\n";
        let entries = parse_env_file(text).unwrap();
        let pairs: Vec<(&str, &str)> =
            entries.iter().map(|(k, e)| (k.as_str(), e.value.as_str())).collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "two")]);
    }

    #[test]
    fn env_file_joins_lines_inside_quotes() {
        let entries = parse_env_file("CERT='-----BEGIN-----\nabc\n-----END-----'\nNEXT=1").unwrap();
        assert_eq!(entries["CERT"].value, "-----BEGIN-----\nabc\n-----END-----");
        assert_eq!(entries["NEXT"].value, "1");
    }

    #[test]
    fn env_file_rejects_everything_on_any_invalid_line() {
        let err = parse_env_file("GOOD=1\n123KEY=x\nKEY-NAME=y\nALSO_GOOD=2").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLines { lines: vec!["123KEY=x".to_owned(), "KEY-NAME=y".to_owned()] }
        );
        assert_eq!(err.lines().len(), 2);
    }

    #[test]
    fn env_file_keeps_bare_apostrophes_on_their_own_line() {
        let entries = parse_env_file("A=don't\nB=rock'n roll").unwrap();
        let pairs: Vec<(&str, &str)> =
            entries.iter().map(|(k, e)| (k.as_str(), e.value.as_str())).collect();
        assert_eq!(pairs, vec![("A", "don't"), ("B", "rock'n roll")]);
    }

    #[test]
    fn env_file_reports_unterminated_quote() {
        let err = parse_env_file("A=1\nB='never closed\nC=3").unwrap_err();
        assert_eq!(err.lines(), ["B='never closed\nC=3".to_owned()]);
    }

    #[test]
    fn empty_env_file_is_an_empty_map() {
        assert!(parse_env_file("\n# nothing\n").unwrap().is_empty());
    }
}
