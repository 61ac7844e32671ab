use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Status of an inference job as reported by the server.
///
/// Only [`JobStatus::Done`] and [`JobStatus::Error`] are terminal. Any value
/// the client does not know about is kept verbatim in [`JobStatus::Other`]
/// and treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Running,
    Done,
    Error,
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Other(value) => value,
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Other(String::new())
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        match value {
            "running" => JobStatus::Running,
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        JobStatus::from(value.as_str())
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET /v3/studies/{study}/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub study_instance_uid: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
}

/// JSON body of the result endpoint.
///
/// In signed URL mode a finished job lists one URL per artifact. The list is
/// absent while the job runs and may be absent or empty when there is nothing
/// to retrieve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultResponse {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: JobStatus,
    #[serde(default)]
    pub signed_urls: Option<Vec<String>>,
}

impl ResultResponse {
    /// Signed URLs of the artifacts, empty when none were returned.
    pub fn urls(&self) -> &[String] {
        self.signed_urls.as_deref().unwrap_or_default()
    }
}

/// Strings the server may send as `null` or as another JSON type decode to
/// an empty string instead of failing the whole body.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Ok(value),
        _ => Ok(String::new()),
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<JobStatus, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(JobStatus::from)
}
