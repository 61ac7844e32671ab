use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use std::collections::HashMap;
use thiserror::Error;

/// Message the server puts in its JSON error envelope when the study could
/// not be normalized into the shape the inference expects.
pub const FORMATTING_ERROR_MESSAGE: &str = "Error formatting study";

/// Classification of a failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server rejected the study because it could not be formatted.
    Formatting,
    /// Any other non-success HTTP response.
    Request,
    /// The request never produced an HTTP response, or its body could not be used.
    Transport,
}

/// Classify an error response from its `Content-Type` header and raw body.
///
/// The server reports formatting failures through the body of the response
/// rather than through a dedicated status code. This never fails: anything
/// that is not exactly a JSON `{"message": "Error formatting study"}` envelope
/// is a plain [`ErrorKind::Request`].
pub fn classify_response(content_type: Option<&str>, body: &[u8]) -> ErrorKind {
    if content_type != Some("application/json") {
        return ErrorKind::Request;
    }
    match serde_json::from_slice::<HashMap<String, String>>(body) {
        Ok(envelope)
            if envelope.get("message").map(String::as_str) == Some(FORMATTING_ERROR_MESSAGE) =>
        {
            ErrorKind::Formatting
        }
        _ => ErrorKind::Request,
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed with status {status}")]
    Request {
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    },
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
    #[error("Malformed multipart response: {0}")]
    Multipart(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body of the failed response, if the server answered.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            ClientError::Request { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Request { headers, body, .. } => {
                let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
                classify_response(content_type, body)
            }
            _ => ErrorKind::Transport,
        }
    }

    pub fn is_formatting_error(&self) -> bool {
        self.kind() == ErrorKind::Formatting
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => ClientError::Request {
                status,
                headers: HeaderMap::new(),
                body: error.to_string().into_bytes(),
            },
            None => ClientError::Connection(error.to_string()),
        }
    }
}
