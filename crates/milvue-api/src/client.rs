use std::io::Write;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{StatusCode, Url};

use crate::error::ClientError;
use crate::multipart;
use crate::transport::{InlineResponse, Transport};

trait ResponseExt {
    fn require_ok(self) -> Result<reqwest::blocking::Response, ClientError>;
}

impl ResponseExt for reqwest::blocking::Response {
    fn require_ok(self) -> Result<reqwest::blocking::Response, ClientError> {
        if self.status() == StatusCode::OK {
            Ok(self)
        } else {
            let status = self.status();
            let headers = self.headers().clone();
            let body = self.bytes().map(|b| b.to_vec()).unwrap_or_default();
            Err(ClientError::Request {
                status,
                headers,
                body,
            })
        }
    }
}

/// Blocking HTTP transport for the Milvue API, backed by `reqwest`.
///
/// The client only performs requests; URLs and headers are built by the
/// caller. It is cheap to clone and shares its connection pool between clones.
/// Timeouts are set per request, the underlying client has none of its own.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::blocking::Client,
}

impl Client {
    pub fn new() -> Result<Self, ClientError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { http_client })
    }

    /// Create a client reusing an already configured `reqwest` client.
    pub fn with_http_client(http_client: reqwest::blocking::Client) -> Self {
        Self { http_client }
    }

    fn send(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{url}: {e}")))?;
        let mut request_builder = self.http_client.get(url).headers(headers.clone());

        if !timeout.is_zero() {
            request_builder = request_builder.timeout(timeout);
        }

        let response = request_builder.send()?.require_ok()?;

        Ok(response)
    }
}

impl Transport for Client {
    fn fetch_inline(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<InlineResponse, ClientError> {
        let response = self.send(url, headers, timeout)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes()?;

        multipart::decode_inline(content_type.as_deref(), body)
    }

    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Bytes, ClientError> {
        let data = self.send(url, headers, timeout)?.bytes()?;

        Ok(data)
    }

    fn download_to(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
        writer: &mut dyn Write,
    ) -> Result<u64, ClientError> {
        let mut response = self.send(url, headers, timeout)?;
        let written = response.copy_to(writer)?;

        Ok(written)
    }
}
