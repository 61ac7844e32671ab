use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use milvue_api::schemas::{ResultRequest, RetrievalMode, StatusResponse};
use milvue_api::{InlineResponse, Transport, routes};

use crate::artifact::{ArtifactDecode, decode_artifact};
use crate::client::Milvue;
use crate::error::MilvueError;
use crate::storage::PendingFiles;

impl<T: Transport> Milvue<T> {
    /// Retrieve the artifacts of a finished job streamed in the response body.
    ///
    /// Returns [`MilvueError::PredictionRunning`] while the job has not finished.
    pub fn get<A: ArtifactDecode>(&self, request: &ResultRequest) -> Result<Vec<A>, MilvueError> {
        self.fetch_inline_records(request)?
            .into_iter()
            .map(decode_artifact)
            .collect()
    }

    /// Same as [`Milvue::get`] but writes each artifact to a new file of
    /// `folder` and returns their paths.
    ///
    /// Nothing is left in `folder` when the call fails.
    pub fn get_to_file(
        &self,
        request: &ResultRequest,
        folder: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, MilvueError> {
        let records = self.fetch_inline_records(request)?;

        let mut files = PendingFiles::new(folder.as_ref(), self.names.as_ref())?;
        for record in &records {
            files.write(|writer| Ok(writer.write_all(record)?))?;
        }
        let paths = files.commit();

        log::info!(
            "Wrote {} artifact(s) of study {} to {}",
            paths.len(),
            request.study_instance_uid(),
            folder.as_ref().display()
        );
        Ok(paths)
    }

    fn fetch_inline_records(&self, request: &ResultRequest) -> Result<Vec<Bytes>, MilvueError> {
        let url = routes::result_url(&self.base_url, request, RetrievalMode::Inline)?;
        let headers = routes::result_headers(&self.credentials, RetrievalMode::Inline)?;

        log::debug!("Requesting inline results at {url}");
        match self.transport.fetch_inline(url.as_str(), &headers, self.timeout)? {
            InlineResponse::Records(records) => {
                log::debug!("Received {} record(s)", records.len());
                Ok(records)
            }
            InlineResponse::StatusEnvelope { records, body } => {
                // A body that is not a status object at all is not a running job.
                let envelope: StatusResponse = serde_json::from_slice(&body).unwrap_or_default();
                log::debug!(
                    "{:.150} {} {} {}",
                    String::from_utf8_lossy(&body),
                    envelope.study_instance_uid,
                    envelope.status,
                    envelope.version
                );
                if envelope.status.is_running() {
                    return Err(MilvueError::PredictionRunning);
                }
                Ok(records)
            }
        }
    }
}
