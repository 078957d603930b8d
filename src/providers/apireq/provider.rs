//! Conversions between Reqwest API errors and provider error types

use crate::providers::apireq::{ReqwestError, ReqwestErrorKind};
use crate::providers::{Error, ErrorKind};

impl From<ReqwestError> for Error {
    fn from(value: ReqwestError) -> Self {
        let kind: ErrorKind = match value.kind() {
            ReqwestErrorKind::InvalidEndpoint => ErrorKind::BadRequest,
            ReqwestErrorKind::ConnectFailed => ErrorKind::Connection,
            ReqwestErrorKind::DecodingFailed | ReqwestErrorKind::RedirectPolicyViolated => {
                ErrorKind::UnexpectedResponse
            }
            ReqwestErrorKind::TimedOut => ErrorKind::TimedOut,
            ReqwestErrorKind::Status(status) => match status.as_u16() {
                401 | 403 => ErrorKind::Authentication,
                404 => ErrorKind::NotFound,
                429 => ErrorKind::ExcessUsage,
                503 => ErrorKind::ApiOverloaded,
                400..=499 => ErrorKind::BadRequest,
                500..=599 => ErrorKind::InternalError,
                _ => ErrorKind::UnexpectedResponse,
            },
            ReqwestErrorKind::UnknownReqwestError => ErrorKind::UnspecifiedError,
        };

        Error::from_source(kind, Box::new(value))
    }
}
