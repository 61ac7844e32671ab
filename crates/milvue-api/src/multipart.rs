//! Splitting of `multipart/related` bodies returned by the inline result endpoint.

use bytes::{Bytes, BytesMut};
use memchr::memmem::Finder;

use crate::error::ClientError;
use crate::routes::DICOM_CONTENT_TYPE;
use crate::transport::InlineResponse;

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

struct Part {
    content_type: Option<String>,
    body: Bytes,
}

impl Part {
    /// Parts without a content type are assumed to be records, as in a
    /// container whose root type is `application/dicom`.
    fn is_record(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(content_type) => media_type(content_type).eq_ignore_ascii_case(DICOM_CONTENT_TYPE),
        }
    }
}

/// Decode the body of an inline result response.
///
/// A multipart body is split into binary records that share the body's
/// buffer; the bytes of any part that is not a record become the trailing
/// body. A body that is not multipart is returned whole as the trailing body.
pub(crate) fn decode_inline(
    content_type: Option<&str>,
    body: Bytes,
) -> Result<InlineResponse, ClientError> {
    let Some(boundary) = content_type.and_then(multipart_boundary) else {
        return Ok(InlineResponse::from_parts(Vec::new(), body));
    };

    let mut records = Vec::new();
    let mut trailing = BytesMut::new();
    for part in split_parts(&body, &boundary)? {
        if part.is_record() {
            records.push(part.body);
        } else {
            trailing.extend_from_slice(&part.body);
        }
    }

    log::debug!(
        "Decoded multipart body: {} record(s), {} trailing byte(s)",
        records.len(),
        trailing.len()
    );

    Ok(InlineResponse::from_parts(records, trailing.freeze()))
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn multipart_boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let essence = params.next()?.trim().to_ascii_lowercase();
    if !essence.starts_with("multipart/") {
        return None;
    }
    params.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn split_parts(body: &Bytes, boundary: &str) -> Result<Vec<Part>, ClientError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let separator = format!("\r\n--{boundary}").into_bytes();
    let delimiter_finder = Finder::new(&delimiter);
    let separator_finder = Finder::new(&separator);
    let crlf_finder = Finder::new(CRLF);

    let mut position = find(&delimiter_finder, body, 0).ok_or_else(|| {
        ClientError::Multipart(format!("boundary `{boundary}` not found in body"))
    })?;

    let mut parts = Vec::new();
    loop {
        position += delimiter.len();
        if body[position..].starts_with(b"--") {
            break;
        }
        let line_end = find(&crlf_finder, body, position)
            .ok_or_else(|| ClientError::Multipart("unterminated boundary line".to_string()))?;
        let start = line_end + CRLF.len();
        let end = find(&separator_finder, body, start).ok_or_else(|| {
            ClientError::Multipart("missing closing boundary".to_string())
        })?;

        parts.push(parse_part(body.slice(start..end))?);
        position = end + CRLF.len();
    }

    Ok(parts)
}

fn parse_part(raw: Bytes) -> Result<Part, ClientError> {
    // Empty header block: the body starts right after the blank line.
    if raw.starts_with(CRLF) {
        return Ok(Part {
            content_type: None,
            body: raw.slice(CRLF.len()..),
        });
    }

    let header_end = memchr::memmem::find(&raw, HEADER_END)
        .ok_or_else(|| ClientError::Multipart("part headers are not terminated".to_string()))?;
    let headers = String::from_utf8_lossy(&raw[..header_end]);
    let content_type = headers.split("\r\n").find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-type")
            .then(|| value.trim().to_string())
    });

    Ok(Part {
        content_type,
        body: raw.slice(header_end + HEADER_END.len()..),
    })
}

fn find(finder: &Finder<'_>, haystack: &[u8], from: usize) -> Option<usize> {
    finder
        .find(haystack.get(from..)?)
        .map(|index| index + from)
}
