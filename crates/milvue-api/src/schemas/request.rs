/// How the result endpoint should deliver the artifacts of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Artifacts are streamed in the response body as a multipart container.
    Inline,
    /// The response is a JSON list of signed URLs, one per artifact.
    SignedUrl,
}

impl RetrievalMode {
    pub fn is_signed_url(&self) -> bool {
        matches!(self, RetrievalMode::SignedUrl)
    }
}

/// Parameters of a result query for one study.
///
/// Extra parameters are appended to the query string in insertion order,
/// after `inference_command` and `signed_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRequest {
    study_instance_uid: String,
    inference_command: String,
    params: Vec<(String, String)>,
}

impl ResultRequest {
    pub fn new(study_instance_uid: impl Into<String>, inference_command: impl Into<String>) -> Self {
        Self {
            study_instance_uid: study_instance_uid.into(),
            inference_command: inference_command.into(),
            params: Vec::new(),
        }
    }

    /// Add an extra query parameter to the request.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn study_instance_uid(&self) -> &str {
        &self.study_instance_uid
    }

    pub fn inference_command(&self) -> &str {
        &self.inference_command
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}
