//! Wrapper around Reqwest's error type to facilitate exclusive matching

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    InvalidEndpoint,
    ConnectFailed,
    DecodingFailed,
    RedirectPolicyViolated,
    TimedOut,
    Status(StatusCode),
    UnknownReqwestError,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("{}", describe(.0))]
    Request(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

fn describe(err: &reqwest::Error) -> &'static str {
    match classify(err) {
        ErrorKind::ConnectFailed => "connection failed",
        ErrorKind::DecodingFailed => "decoding failed",
        ErrorKind::RedirectPolicyViolated => "redirect policy violated",
        ErrorKind::TimedOut => "timed out",
        _ => "unknown reqwest error",
    }
}

fn classify(err: &reqwest::Error) -> ErrorKind {
    if err.is_decode() {
        ErrorKind::DecodingFailed
    } else if err.is_timeout() {
        ErrorKind::TimedOut
    } else if err.is_redirect() {
        ErrorKind::RedirectPolicyViolated
    } else if err.is_connect() {
        ErrorKind::ConnectFailed
    } else if let Some(status) = err.status() {
        ErrorKind::Status(status)
    } else {
        ErrorKind::UnknownReqwestError
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Request(err)
    }
}

// Providers wrap error messages in a handful of shapes:
// {"error": {"message": ..}}, {"error": ".."} or {"message": ..}
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorMessage },
    Flat { error: String },
    Message { message: String },
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl Error {
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Error {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody::Nested { error }) => error.message,
            Ok(ErrorBody::Flat { error }) => error,
            Ok(ErrorBody::Message { message }) => message,
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
            Err(_) => body.trim().to_string(),
        };

        Error::Status { status, message }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidEndpoint(_) => ErrorKind::InvalidEndpoint,
            Error::Request(err) => classify(err),
            Error::Status { status, .. } => ErrorKind::Status(*status),
        }
    }
}
