//! In-memory transport replaying scripted replies, for protocol tests.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bytes::Bytes;
use milvue_api::{ClientError, InlineResponse, Transport, Url};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::artifact::{ArtifactDecode, ArtifactIdentifiers, StudyIdentifiers};
use crate::client::{Milvue, MilvueBuilder};

pub const API: &str = "https://api.test";
pub const STUDY: &str = "1.2.840.10008";
pub const FORMATTING_ERROR_BODY: &[u8] = br#"{"message":"Error formatting study"}"#;

#[derive(Debug, Clone)]
pub enum Reply {
    /// `200 OK` with the given body.
    Body(Bytes),
    /// `200 OK` on the inline endpoint, already split.
    Inline(InlineResponse),
    /// A non-success response.
    Status {
        code: u16,
        content_type: Option<&'static str>,
        body: Vec<u8>,
    },
    Disconnected,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Reply::Body(Bytes::copy_from_slice(body.as_bytes()))
    }

    pub fn formatting_error() -> Self {
        Reply::Status {
            code: 400,
            content_type: Some("application/json"),
            body: FORMATTING_ERROR_BODY.to_vec(),
        }
    }

    fn into_result(self) -> Result<Reply, ClientError> {
        match self {
            Reply::Status {
                code,
                content_type,
                body,
            } => {
                let mut headers = HeaderMap::new();
                if let Some(content_type) = content_type {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                }
                Err(ClientError::Request {
                    status: StatusCode::from_u16(code).unwrap(),
                    headers,
                    body,
                })
            }
            Reply::Disconnected => Err(ClientError::Connection("connection refused".to_string())),
            ok => Ok(ok),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub timeout: Duration,
    pub at: Instant,
}

/// Replies are queued per URL path. The last reply of a route is repeated
/// once its queue is drained.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, path: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| path_of(&request.url) == path)
            .collect()
    }

    fn next(&self, url: &str, headers: &HeaderMap, timeout: Duration) -> Result<Reply, ClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            timeout,
            at: Instant::now(),
        });

        let path = path_of(url);
        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(&path)
            .unwrap_or_else(|| panic!("no reply scripted for {path}"));
        let reply = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };
        reply.into_result()
    }
}

impl Transport for ScriptedTransport {
    fn fetch_inline(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<InlineResponse, ClientError> {
        match self.next(url, headers, timeout)? {
            Reply::Inline(response) => Ok(response),
            Reply::Body(body) => Ok(InlineResponse::from_parts(Vec::new(), body)),
            other => panic!("unexpected inline reply {other:?}"),
        }
    }

    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Bytes, ClientError> {
        match self.next(url, headers, timeout)? {
            Reply::Body(body) => Ok(body),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    fn download_to(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
        writer: &mut dyn Write,
    ) -> Result<u64, ClientError> {
        let body = self.get(url, headers, timeout)?;
        writer.write_all(&body)?;
        Ok(body.len() as u64)
    }
}

fn path_of(url: &str) -> String {
    Url::parse(url).unwrap().path().to_string()
}

pub fn milvue(transport: ScriptedTransport) -> Milvue<ScriptedTransport> {
    let counter = AtomicUsize::new(0);
    MilvueBuilder::new("secret-token")
        .with_endpoint(API)
        .with_timeout(Duration::from_secs(5))
        .with_name_generator(move || format!("{}.dcm", counter.fetch_add(1, Ordering::SeqCst)))
        .build_with_transport(transport)
        .unwrap()
}

pub fn status_path() -> String {
    format!("/v3/studies/{STUDY}/status")
}

pub fn result_path() -> String {
    format!("/v3/studies/{STUDY}")
}

pub fn status_body(status: &str) -> Reply {
    Reply::json(&format!(
        r#"{{"study_instance_uid":"{STUDY}","status":"{status}","version":"3.2.0"}}"#
    ))
}

/// Artifact whose bytes are `study|series|sop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestArtifact(pub StudyIdentifiers);

impl TestArtifact {
    pub fn encode(study: &str, series: &str, sop: &str) -> Bytes {
        Bytes::from(format!("{study}|{series}|{sop}"))
    }
}

impl ArtifactDecode for TestArtifact {
    type Error = String;

    fn decode(bytes: Bytes) -> Result<Self, Self::Error> {
        let text = String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())?;
        match text.split('|').collect::<Vec<_>>().as_slice() {
            [study, series, sop] => Ok(TestArtifact(StudyIdentifiers {
                study_instance_uid: study.to_string(),
                series_instance_uid: series.to_string(),
                sop_instance_uid: sop.to_string(),
            })),
            _ => Err(format!("malformed artifact `{text}`")),
        }
    }
}

impl ArtifactIdentifiers for TestArtifact {
    type Error = String;

    fn identifiers(&self) -> Result<StudyIdentifiers, Self::Error> {
        Ok(self.0.clone())
    }
}
