use std::io::Write;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::error::ClientError;

/// Outcome of a request against the inline result endpoint.
///
/// The same endpoint answers either with a multipart container of binary
/// records, or with a JSON status body when the job has not finished yet.
/// Records are slices of the received body and share its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineResponse {
    /// Only binary records were returned.
    Records(Vec<Bytes>),
    /// The response carried non-record bytes, usually a JSON status body.
    /// Any records received alongside it are kept but the body decides how
    /// the response must be interpreted.
    StatusEnvelope {
        records: Vec<Bytes>,
        body: Bytes,
    },
}

impl InlineResponse {
    /// Build a response from the decoded records and the bytes that were not
    /// part of any record.
    pub fn from_parts(records: Vec<Bytes>, trailing: Bytes) -> Self {
        if trailing.is_empty() {
            InlineResponse::Records(records)
        } else {
            InlineResponse::StatusEnvelope {
                records,
                body: trailing,
            }
        }
    }
}

/// Blocking HTTP primitive used by the protocol client.
///
/// Every method performs a single `GET`. Any response whose status is not
/// `200 OK` must be reported as [`ClientError::Request`] carrying the status,
/// headers and raw body, so that callers can classify it. A zero `timeout`
/// means the request has no timeout of its own.
pub trait Transport {
    /// Request the inline result endpoint and split its multipart body.
    fn fetch_inline(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<InlineResponse, ClientError>;

    /// Request a URL and return its whole body.
    fn get(&self, url: &str, headers: &HeaderMap, timeout: Duration) -> Result<Bytes, ClientError>;

    /// Request a URL and stream its body into `writer`, returning the number
    /// of bytes written.
    fn download_to(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
        writer: &mut dyn Write,
    ) -> Result<u64, ClientError> {
        let bytes = self.get(url, headers, timeout)?;
        writer.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }
}
