//! Line-oriented reader for the macro text format
//!
//! Every value sits on a known line, so errors can point at the line that
//! broke instead of whatever token the parser happened to stop on.

use mc4d_core::{Error, Vec4, NDIMS};
use std::io::{self, BufRead};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unexpected end of stream, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("expected {expected} fields for {what}, found {found}")]
    FieldCount {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("'{token}' is not a valid {what}")]
    BadToken { token: String, what: &'static str },
    #[error("{0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub struct LineReader<R> {
    inner: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
        }
    }

    /// 1-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Wraps a format error with the current line number.
    pub fn error(&self, err: FormatError) -> Error {
        match err {
            FormatError::Io(e) => Error::from(e),
            other => Error::malformed(self.line, &other.to_string()),
        }
    }

    /// Next line without its terminator.
    pub fn next_line(&mut self, expected: &'static str) -> Result<&str, Error> {
        self.buf.clear();
        let n = self
            .inner
            .read_line(&mut self.buf)
            .map_err(|e| self.error(e.into()))?;
        self.line += 1;
        if n == 0 {
            return Err(self.error(FormatError::UnexpectedEof { expected }));
        }
        let trimmed = self.buf.trim_end_matches(['\n', '\r']).len();
        self.buf.truncate(trimmed);
        Ok(self.buf.as_str())
    }

    /// Next line split on whitespace into exactly `N` fields of type `T`.
    pub fn next_fields<T: FromStr, const N: usize>(
        &mut self,
        what: &'static str,
    ) -> Result<[T; N], Error> {
        let line = self.next_line(what)?.to_owned();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != N {
            return Err(self.error(FormatError::FieldCount {
                what,
                expected: N,
                found: tokens.len(),
            }));
        }
        let mut parsed = Vec::with_capacity(N);
        for token in tokens {
            let value = token.parse::<T>().map_err(|_| {
                self.error(FormatError::BadToken {
                    token: token.to_string(),
                    what,
                })
            })?;
            parsed.push(value);
        }
        parsed
            .try_into()
            .map_err(|_| self.error(FormatError::Invalid(format!("bad {}", what))))
    }

    pub fn next_count(&mut self, what: &'static str) -> Result<usize, Error> {
        let [count] = self.next_fields::<usize, 1>(what)?;
        Ok(count)
    }

    pub fn next_vec4(&mut self, what: &'static str) -> Result<Vec4, Error> {
        self.next_fields::<i32, NDIMS>(what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc4d_core::ErrorCode;

    #[test]
    fn reads_lines_and_fields() {
        let mut r = LineReader::new("my macro\r\n3 -2 0 2\n7\n".as_bytes());
        assert_eq!(r.next_line("name").unwrap(), "my macro");
        assert_eq!(r.next_vec4("ref").unwrap(), [3, -2, 0, 2]);
        assert_eq!(r.next_count("count").unwrap(), 7);
        assert_eq!(r.line(), 3);
    }

    #[test]
    fn reports_line_of_failure() {
        let mut r = LineReader::new("ok\n1 2 x 4\n".as_bytes());
        r.next_line("name").unwrap();
        let err = r.next_vec4("ref").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedStream);
        assert!(err.message.starts_with("line 2:"), "{}", err.message);
        assert!(err.message.contains("'x'"));
    }

    #[test]
    fn wrong_field_count_and_eof() {
        let mut r = LineReader::new("1 2 3\n".as_bytes());
        let err = r.next_vec4("ref").unwrap_err();
        assert!(err.message.contains("expected 4 fields"));
        let err = r.next_line("name").unwrap_err();
        assert!(err.message.contains("unexpected end of stream"));
    }
}
