//! URLs and headers of the Milvue API endpoints.

use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::credentials::MilvueCredentials;
use crate::error::ClientError;
use crate::schemas::{ResultRequest, RetrievalMode};

/// Header carrying the access token on every request.
pub const OWNER_HEADER: &str = "x-goog-meta-owner";
/// Media type of a single binary artifact.
pub const DICOM_CONTENT_TYPE: &str = "application/dicom";
/// Media type of the inline multipart container.
pub const DICOM_MULTIPART_CONTENT_TYPE: &str = "multipart/related; type=application/dicom";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// `{api}/v3/studies/{study}/status`
pub fn status_url(base_url: &Url, study_instance_uid: &str) -> Result<Url, ClientError> {
    with_segments(base_url, ["v3", "studies", study_instance_uid, "status"])
}

/// `{api}/v3/studies/{study}?inference_command={cmd}&signed_url={bool}{&extra}`
pub fn result_url(
    base_url: &Url,
    request: &ResultRequest,
    mode: RetrievalMode,
) -> Result<Url, ClientError> {
    let mut url = with_segments(base_url, ["v3", "studies", request.study_instance_uid()])?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("inference_command", request.inference_command())
            .append_pair(
                "signed_url",
                if mode.is_signed_url() { "true" } else { "false" },
            );
        for (key, value) in request.params() {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

/// `{api}/v3/{report}/{study}`
pub fn report_url(
    base_url: &Url,
    report: &str,
    study_instance_uid: &str,
) -> Result<Url, ClientError> {
    with_segments(base_url, ["v3", report, study_instance_uid])
}

/// Headers sent to the status and report endpoints.
pub fn owner_headers(credentials: &MilvueCredentials) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    let token = HeaderValue::from_str(credentials.token())
        .map_err(|_| ClientError::InvalidHeader(OWNER_HEADER.to_string()))?;
    headers.insert(HeaderName::from_static(OWNER_HEADER), token);
    Ok(headers)
}

/// Headers negotiating the result endpoint in the given mode.
pub fn result_headers(
    credentials: &MilvueCredentials,
    mode: RetrievalMode,
) -> Result<HeaderMap, ClientError> {
    let mut headers = owner_headers(credentials)?;
    match mode {
        RetrievalMode::Inline => {
            let multipart = HeaderValue::from_static(DICOM_MULTIPART_CONTENT_TYPE);
            headers.insert(ACCEPT, multipart.clone());
            headers.insert(CONTENT_TYPE, multipart);
        }
        RetrievalMode::SignedUrl => {
            headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
    }
    Ok(headers)
}

/// Headers sent when downloading one artifact from a signed URL.
pub fn artifact_headers(credentials: &MilvueCredentials) -> Result<HeaderMap, ClientError> {
    let mut headers = owner_headers(credentials)?;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DICOM_CONTENT_TYPE));
    Ok(headers)
}

fn with_segments<'a>(
    base_url: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, ClientError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
