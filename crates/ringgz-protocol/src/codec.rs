//! The [`Wire`] trait and the line splitting/joining helpers behind it.
//!
//! A command on the wire is a keyword followed by its arguments, all
//! joined by [`DELIMITER`]:
//!
//! ```text
//! doMove~12~2~3
//! ```
//!
//! The newline terminator belongs to the transport; [`Wire::decode`]
//! tolerates a trailing `\n` or `\r\n` so lines can be fed in either way.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::ProtocolError;

/// The reserved character separating keyword and arguments.
pub const DELIMITER: char = '~';

/// A command that can be written to and read from a protocol line.
///
/// `decode(&encode(c)) == c` holds for every valid command, i.e. one
/// whose string arguments contain neither the delimiter nor line breaks.
pub trait Wire: Sized {
    /// Renders the command as a line, without terminator.
    fn encode(&self) -> String;

    /// Parses one line.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] on an unknown keyword, a wrong number
    /// of arguments, or a non-integer where an integer is required.
    fn decode(line: &str) -> Result<Self, ProtocolError>;
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Builds a line one argument at a time.
pub(crate) struct LineBuilder {
    buf: String,
}

impl LineBuilder {
    pub(crate) fn new(keyword: &str) -> Self {
        Self {
            buf: keyword.to_string(),
        }
    }

    pub(crate) fn arg(mut self, value: impl fmt::Display) -> Self {
        self.buf.push(DELIMITER);
        // Writing into a String cannot fail.
        let _ = write!(self.buf, "{value}");
        self
    }

    pub(crate) fn args<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        values.into_iter().fold(self, |line, value| line.arg(value))
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A line split into its keyword and raw arguments.
pub(crate) struct Fields<'a> {
    pub(crate) keyword: &'a str,
    pub(crate) args: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub(crate) fn split(line: &'a str) -> Result<Self, ProtocolError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let mut parts = line.split(DELIMITER);
        // `split` always yields at least one item.
        let keyword = parts.next().unwrap_or_default();
        Ok(Self {
            keyword,
            args: parts.collect(),
        })
    }

    /// Fails unless the argument count lies in `min..=max`.
    pub(crate) fn arity(
        &self,
        keyword: &'static str,
        min: usize,
        max: usize,
        expected: &'static str,
    ) -> Result<(), ProtocolError> {
        let got = self.args.len();
        if got < min || got > max {
            return Err(ProtocolError::Arity {
                keyword,
                expected,
                got,
            });
        }
        Ok(())
    }

    /// Fails unless there are exactly `n` arguments.
    pub(crate) fn exactly(
        &self,
        keyword: &'static str,
        n: usize,
        expected: &'static str,
    ) -> Result<(), ProtocolError> {
        self.arity(keyword, n, n, expected)
    }
}

/// Parses an integer argument.
pub(crate) fn int<T: FromStr>(
    keyword: &'static str,
    value: &str,
) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::NotAnInteger {
        keyword,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_builder_joins_with_delimiter() {
        let line = LineBuilder::new("doMove").arg(12).arg(2).arg(3).finish();
        assert_eq!(line, "doMove~12~2~3");
    }

    #[test]
    fn test_line_builder_without_args_is_bare_keyword() {
        assert_eq!(LineBuilder::new("accept").finish(), "accept");
    }

    #[test]
    fn test_fields_split_strips_terminators() {
        let fields = Fields::split("join~Alice~0\r\n").unwrap();
        assert_eq!(fields.keyword, "join");
        assert_eq!(fields.args, vec!["Alice", "0"]);
    }

    #[test]
    fn test_fields_split_keeps_empty_trailing_argument() {
        let fields = Fields::split("sendMessage~").unwrap();
        assert_eq!(fields.args, vec![""]);
    }

    #[test]
    fn test_fields_split_empty_line() {
        assert_eq!(Fields::split("\n").err(), Some(ProtocolError::Empty));
    }

    #[test]
    fn test_int_rejects_non_numeric() {
        let err = int::<i32>("doMove", "twelve").unwrap_err();
        assert!(err.to_string().contains("twelve"));
    }
}
