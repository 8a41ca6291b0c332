//! Memory reference trace parsing.
//!
//! A trace is line-oriented text, one reference per line:
//!
//! ```text
//! R 0x1fffffcc
//! w 0x00400a10
//! ```
//!
//! The operation is `R` or `W` in either case; the address is a `0x`-prefixed
//! hexadecimal literal. Anything after the address token is ignored. Every
//! line must hold a reference: a blank line is a format error like any other.
//! [`TraceReader`] parses lazily, one line per `next()`.

use std::io::{BufRead, Lines};
use std::path::PathBuf;

use crate::common::{SimError, TraceError};

/// Kind of memory reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceOp {
    /// Load.
    Read,
    /// Store.
    Write,
}

impl TraceOp {
    /// `true` for [`TraceOp::Write`].
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl std::str::FromStr for TraceOp {
    type Err = TraceError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "R" | "r" => Ok(Self::Read),
            "W" | "w" => Ok(Self::Write),
            other => Err(TraceError::UnknownOperation(other.to_string())),
        }
    }
}

/// One parsed trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Read or write.
    pub op: TraceOp,
    /// Byte address referenced.
    pub address: u64,
}

impl TraceRecord {
    /// A read of `address`.
    pub const fn read(address: u64) -> Self {
        Self {
            op: TraceOp::Read,
            address,
        }
    }

    /// A write of `address`.
    pub const fn write(address: u64) -> Self {
        Self {
            op: TraceOp::Write,
            address,
        }
    }
}

/// Parses a `0x`-prefixed hexadecimal address token.
fn parse_address(token: &str) -> Result<u64, TraceError> {
    let invalid = || TraceError::InvalidAddress(token.to_string());
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u64::from_str_radix(digits, 16).map_err(|_| invalid())
}

/// Parses one trace line.
///
/// # Errors
///
/// A [`TraceError`] if the line is blank, has an unknown operation, has no
/// address, or has an address that is not a 64-bit hexadecimal literal.
pub fn parse_line(line: &str) -> Result<TraceRecord, TraceError> {
    let mut tokens = line.split_whitespace();
    let op = tokens
        .next()
        .ok_or(TraceError::EmptyLine)?
        .parse::<TraceOp>()?;
    let address = tokens
        .next()
        .ok_or_else(|| TraceError::MissingAddress(line.trim().to_string()))?;
    Ok(TraceRecord {
        op,
        address: parse_address(address)?,
    })
}

/// Lazy iterator over the references in a trace.
///
/// Yields `Err` for an unreadable or malformed line, tagged with the trace
/// name and the 1-based line number.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: Lines<R>,
    source: PathBuf,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader. `source` names the trace in diagnostics.
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far.
    pub const fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(source) => {
                return Some(Err(SimError::Io {
                    path: self.source.clone(),
                    source,
                }));
            }
        };
        self.line_no += 1;
        Some(parse_line(&line).map_err(|source| SimError::TraceFormat {
            line: self.line_no,
            source,
        }))
    }
}
