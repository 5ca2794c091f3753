use std::io;

use thiserror::Error;

/// Everything that can go wrong while turning socket bytes into a `Request`.
///
/// None of these are recovered mid-parse. They travel up to the processor
/// loop, which logs them and closes the connection.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
    #[error("malformed header: {0:?}")]
    MalformedHeader(String),
    #[error("invalid URI: {0:?}")]
    InvalidUri(String),
    #[error("line exceeds {limit} bytes without a terminator")]
    LineTooLong { limit: usize },
    #[error("socket I/O failure: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    pub(crate) fn request_line(raw: &[u8]) -> Self {
        ParseError::MalformedRequestLine(String::from_utf8_lossy(raw).into_owned())
    }

    pub(crate) fn header(raw: &[u8]) -> Self {
        ParseError::MalformedHeader(String::from_utf8_lossy(raw).into_owned())
    }

    pub(crate) fn uri(raw: &str) -> Self {
        ParseError::InvalidUri(raw.to_string())
    }
}
