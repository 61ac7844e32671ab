use milvue_api::ClientError;
use milvue_api::schemas::StatusResponse;

/// Errors surfaced by the polling and retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum MilvueError {
    /// The job reached the terminal `error` status.
    #[error("Prediction failed for study {}", .0.study_instance_uid)]
    PredictionError(StatusResponse),
    /// The job has not finished yet. Retrieval can be retried later.
    #[error("Prediction is still running")]
    PredictionRunning,
    /// Polling exhausted its total wait time. Carries the last observed status.
    #[error("Timed out waiting for the prediction (last status: {})", .0.status)]
    PredictionTimeout(StatusResponse),
    /// The server could not format the study for inference.
    #[error("Error formatting study")]
    FormattingError,
    /// Any other request or transport failure, unchanged.
    #[error(transparent)]
    Client(ClientError),
    /// A successful response carried a JSON body that could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// An artifact could not be decoded by its codec.
    #[error("Failed to decode artifact: {0}")]
    Artifact(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MilvueError {
    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MilvueError::PredictionRunning | MilvueError::PredictionTimeout(_)
        )
    }

    /// Status response attached to the error, if any.
    pub fn status_response(&self) -> Option<&StatusResponse> {
        match self {
            MilvueError::PredictionError(response) | MilvueError::PredictionTimeout(response) => {
                Some(response)
            }
            _ => None,
        }
    }
}

/// Transport errors are classified on their way into the taxonomy: a
/// formatting error envelope becomes [`MilvueError::FormattingError`], every
/// other error is kept as is.
impl From<ClientError> for MilvueError {
    fn from(error: ClientError) -> Self {
        if error.is_formatting_error() {
            MilvueError::FormattingError
        } else {
            MilvueError::Client(error)
        }
    }
}
