//! Error types.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors reported by the table store, the engine and the calendar.
///
/// Only [`Error::Resource`] indicates a fault of the environment; every other
/// variant is caused by the date the caller asked for.
#[derive(Debug, Error)]
pub enum Error {
    #[error("lunar table unavailable: {0}")]
    Resource(#[from] ResourceError),
    #[error("year {year} not in supported range {start}..={end}")]
    YearOutOfRange { year: i32, start: i32, end: i32 },
    #[error("month {month} not in 1..=12")]
    InvalidMonth { month: u32 },
    #[error("day {day} not in 1..={max}")]
    InvalidDay { day: u32, max: u32 },
    #[error("year {year} has no intercalation month {month} (actual: {actual})")]
    InvalidIntercalation { year: i32, month: u32, actual: u32 },
}

impl Error {
    /// Returns `true` if the error was caused by the requested date rather
    /// than by a missing or broken table.
    ///
    /// # Example
    ///
    /// ```
    /// use eumnyeok::Error;
    ///
    /// let err = Error::InvalidMonth { month: 13 };
    /// assert!(err.is_input_error());
    /// ```
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::Resource(_))
    }
}

/// The lunar table could not be read, parsed, or failed its structural checks.
///
/// A store keeps the first failure and hands out clones of it, so the
/// underlying I/O and parse errors are shared.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("cannot read table file: {0}")]
    Missing(#[source] Arc<io::Error>),
    #[error("cannot parse table: {0}")]
    Malformed(#[source] Arc<serde_json::Error>),
    #[error("table holds {actual} records, year range requires {expected}")]
    Length { expected: usize, actual: usize },
    #[error("record for year {year} is inconsistent: {reason}")]
    Inconsistent { year: i32, reason: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
