use std::fmt;

/// Error type for the `pauc` library.
#[derive(Debug)]
pub enum PaucError {
    /// Rejected caller input: empty or non-finite samples, constant range, bad bin count
    /// or sample size.
    InvalidInput(String),
    /// Wraps an I/O failure while reading a prediction file.
    Io(std::io::Error),
    /// Wraps a malformed delimited prediction file.
    Parse(String),
}

impl PaucError {
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        PaucError::InvalidInput(reason.into())
    }
}

impl From<std::io::Error> for PaucError {
    fn from(err: std::io::Error) -> Self {
        PaucError::Io(err)
    }
}

impl From<csv::Error> for PaucError {
    fn from(err: csv::Error) -> Self {
        PaucError::Parse(err.to_string())
    }
}

impl fmt::Display for PaucError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PaucError::InvalidInput(s) => write!(f, "Invalid input: {}", s),
            PaucError::Io(e) => write!(f, "I/O error: {}", e),
            PaucError::Parse(s) => write!(f, "Parse error: {}", s),
        }
    }
}

impl std::error::Error for PaucError {}
