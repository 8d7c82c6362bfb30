//! Tokenization of BVH source text
//!
//! The hierarchy section is a free-form stream of whitespace-separated
//! tokens, while the motion section is line oriented. [`Tokens`] covers the
//! former, [`lines`] the latter.

use std::iter::Peekable;
use std::str::{FromStr, SplitWhitespace};

use crate::error::FormatError;

/// Whitespace-delimited token stream over the hierarchy section
#[derive(Debug)]
pub struct Tokens<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace().peekable(),
            consumed: 0,
        }
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> Option<&'a str> {
        self.inner.peek().copied()
    }

    /// Number of tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Take the next token, failing with `UnexpectedEof` if the stream is done
    pub fn expect_any(&mut self, context: &'static str) -> Result<&'a str, FormatError> {
        self.next().ok_or(FormatError::UnexpectedEof { context })
    }

    /// Take the next token and require it to be exactly `keyword`
    pub fn expect(&mut self, keyword: &'static str) -> Result<(), FormatError> {
        let token = self.expect_any(keyword)?;
        if token == keyword {
            Ok(())
        } else {
            Err(FormatError::UnexpectedToken {
                expected: keyword,
                found: token.to_string(),
            })
        }
    }

    /// Take the next token and parse it as a number
    pub fn parse<T: FromStr>(&mut self, context: &'static str) -> Result<T, FormatError> {
        let token = self.expect_any(context)?;
        parse_number(token, context)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        self.consumed += 1;
        Some(token)
    }
}

/// Parse a numeric token, reporting the token and where it appeared on failure
pub fn parse_number<T: FromStr>(token: &str, context: impl Into<String>) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidNumber {
        token: token.to_string(),
        context: context.into(),
    })
}

/// A non-empty, trimmed line of the motion section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number within the whole source text
    pub number: usize,
    pub text: &'a str,
}

/// Split a section into its non-empty lines
///
/// `first_line` is the source line number of the first line of `text`, so
/// that errors can point at the original file.
pub fn lines(text: &str, first_line: usize) -> impl Iterator<Item = Line<'_>> {
    text.lines()
        .enumerate()
        .map(move |(offset, raw)| Line {
            number: first_line + offset,
            text: raw.trim(),
        })
        .filter(|line| !line.text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokens_split_on_any_whitespace() {
        let tokens: Vec<_> = Tokens::new("ROOT Hips\r\n{\n\tOFFSET  0 0 0\n}").collect();
        assert_eq!(tokens, vec!["ROOT", "Hips", "{", "OFFSET", "0", "0", "0", "}"]);
    }

    #[test]
    fn test_expect_reports_found_token() {
        let mut tokens = Tokens::new("OFFSET");
        let err = tokens.expect("{").unwrap_err();
        assert_eq!(
            err,
            FormatError::UnexpectedToken {
                expected: "{",
                found: "OFFSET".to_string(),
            }
        );
        assert_eq!(tokens.consumed(), 1);
    }

    #[test]
    fn test_parse_number() {
        let mut tokens = Tokens::new("1.5 -2e1 abc");
        assert_eq!(tokens.parse::<f32>("OFFSET").unwrap(), 1.5);
        assert_eq!(tokens.parse::<f32>("OFFSET").unwrap(), -20.0);
        assert!(matches!(
            tokens.parse::<f32>("OFFSET"),
            Err(FormatError::InvalidNumber { .. })
        ));
        assert_eq!(
            tokens.parse::<f32>("OFFSET"),
            Err(FormatError::UnexpectedEof { context: "OFFSET" })
        );
    }

    #[test]
    fn test_lines_skip_blank_and_keep_numbers() {
        let text = "MOTION\n\n  Frames: 2  \r\n\nFrame Time: 0.1\n";
        let collected: Vec<_> = lines(text, 10).collect();
        assert_eq!(
            collected,
            vec![
                Line {
                    number: 10,
                    text: "MOTION"
                },
                Line {
                    number: 12,
                    text: "Frames: 2"
                },
                Line {
                    number: 14,
                    text: "Frame Time: 0.1"
                },
            ]
        );
    }
}
