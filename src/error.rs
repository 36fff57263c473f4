use chrono::NaiveDateTime;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GoesSolarError>;

#[derive(Error, Debug)]
pub enum GoesSolarError {
    /// A page or file could not be fetched from the remote server.
    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// A listing entry or filename did not match its expected format.
    #[error("malformed entry '{entry}': {reason}")]
    MalformedEntry { entry: String, reason: String },

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("no data found near {instant}")]
    NoDataFound { instant: NaiveDateTime },

    #[error("IO error {0}")]
    Io(#[from] std::io::Error),

    #[error("thread error {0}")]
    Thread(String),
}

pub fn transport_error(url: &str, reason: impl ToString) -> GoesSolarError {
    GoesSolarError::Transport {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

pub fn malformed_entry(entry: &str, reason: impl ToString) -> GoesSolarError {
    GoesSolarError::MalformedEntry {
        entry: entry.to_owned(),
        reason: reason.to_string(),
    }
}
