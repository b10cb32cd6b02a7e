use std::{fmt, io};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with a non-2xx status.
    Http { status: u16 },
    Request,
    Json,
    Io,
    UnsupportedCategory,
    Config,
    Other,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn http(status: u16) -> Self {
        Error {
            kind: ErrorKind::Http { status },
            message: format!("HTTP error! status: {}", status),
        }
    }

    pub fn unsupported(shape: &str, key: &str) -> Self {
        Error {
            kind: ErrorKind::UnsupportedCategory,
            message: format!("Unsupported {} type: {}", shape, key),
        }
    }

    /// Status code of a failed HTTP exchange, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Http { status } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            message: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Error::http(status.as_u16()),
            None => Error {
                kind: ErrorKind::Request,
                message: value.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Json,
            message: value.to_string(),
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error {
            kind: ErrorKind::Other,
            message: value.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            kind: ErrorKind::Other,
            message: value,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
