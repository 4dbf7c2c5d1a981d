use std::fmt;

use crate::schema::SchemaError;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Remote(Box<dyn std::error::Error + Send + Sync>),
    Protocol(String),
    Schema(SchemaError),
    InvalidSchedule(String),
    /// An argument the API would refuse, caught before any request.
    InvalidParameter(String),
    Deprecated {
        operation: &'static str,
        replacement: &'static str,
    },
    ConfigIntegrity(String),
    Io(std::io::Error),
}

impl Error {
    /// True when the failure came from the transport rather than from local checks.
    pub fn is_remote_request(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Remote(_) | Error::Protocol(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Remote(e) => write!(f, "remote request failed: {e}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Schema(e) => write!(f, "schema validation failed: {e}"),
            Error::InvalidSchedule(msg) => write!(f, "invalid schedule: {msg}"),
            Error::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Error::Deprecated {
                operation,
                replacement,
            } => write!(f, "{operation} is deprecated, use {replacement}"),
            Error::ConfigIntegrity(msg) => write!(f, "invalid config: {msg}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Remote(e) => Some(e.as_ref()),
            Error::Schema(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Error::Schema(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
