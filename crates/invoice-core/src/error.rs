use chrono::NaiveDate;
use thiserror::Error;

/// Rejection reasons for the caller-supplied report date.
///
/// These never trigger a retry; a failing date aborts the run before any
/// network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// No date string was supplied.
    #[error("No date provided. Please provide a date in YYYY-MM-DD format.")]
    EmptyInput,

    /// The string is not `YYYY-MM-DD` or does not name a real calendar day.
    #[error(
        "Invalid date format: {0}. Date must be in YYYY-MM-DD format (e.g., 2024-01-15). \
         Please check for typos or incorrect separators."
    )]
    FormatError(String),

    /// A well-formed date outside the accepted reporting year.
    #[error(
        "Invalid date: {date}. Date must be between 2024-01-01 and 2024-12-31. \
         The provided date is {days_outside} days outside the valid range."
    )]
    OutOfRange {
        date: NaiveDate,
        days_outside: i64,
    },
}

/// Outcome of a failed fetch, either per attempt or for the whole call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a 4xx status. Never retried.
    #[error("client error (status {0})")]
    ClientError(u16),

    /// The server answered with a 5xx or another non-success status.
    #[error("server error (status {0})")]
    ServerError(u16),

    /// The attempt exceeded the per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body-read failure.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Every attempt failed with a retryable cause.
    #[error("giving up after {attempts} attempts; last error: {last_cause}")]
    RetriesExhausted { attempts: u32, last_cause: String },
}

impl FetchFailure {
    /// `true` for causes worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchFailure::ServerError(_) | FetchFailure::Timeout | FetchFailure::TransportError(_)
        )
    }
}

/// Terminal failures of the CSV aggregation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationFailure {
    /// The text is not well-formed delimited data with a header row.
    #[error("CSV parsing error: {0}")]
    ParseError(String),

    /// One or more required columns are absent from the header.
    #[error("CSV missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Every row was dropped because its invoice date could not be parsed.
    #[error("No valid invoice dates found after parsing")]
    NoValidDates,

    /// A non-empty amount cell that is not a decimal number.
    #[error("Invalid amount {value:?} on line {line}")]
    InvalidAmount { line: u64, value: String },

    /// Anything else that prevented a result.
    #[error("Failed to process CSV: {0}")]
    Unexpected(String),
}

/// Startup configuration problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required settings were not supplied on the command line or environment.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}
