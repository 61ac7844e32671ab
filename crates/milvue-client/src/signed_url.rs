use std::path::{Path, PathBuf};

use milvue_api::schemas::{ResultRequest, ResultResponse, RetrievalMode};
use milvue_api::{Transport, routes};

use crate::artifact::{ArtifactDecode, decode_artifact};
use crate::client::Milvue;
use crate::error::MilvueError;
use crate::storage::PendingFiles;

impl<T: Transport> Milvue<T> {
    /// Retrieve the artifacts of a job through the signed URLs listed by the server.
    ///
    /// The job status is not checked: the caller is expected to have waited
    /// for it to be done. An absent or empty URL list yields no artifacts.
    /// URLs are resolved in order and the first failure aborts the whole
    /// batch, so either every artifact is returned or none is.
    pub fn get_signed_url<A: ArtifactDecode>(
        &self,
        request: &ResultRequest,
    ) -> Result<Vec<A>, MilvueError> {
        let response = self.fetch_signed_urls(request)?;
        let urls = response.urls();
        if urls.is_empty() {
            log::debug!("No signed URL for study {}", request.study_instance_uid());
            return Ok(Vec::new());
        }

        let headers = routes::artifact_headers(&self.credentials)?;
        let mut artifacts = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            // Download failures go through the same classification as the URL request.
            let bytes = self.transport.get(url, &headers, self.timeout)?;
            log::debug!("Downloaded artifact {}/{}", index + 1, urls.len());
            artifacts.push(decode_artifact(bytes)?);
        }

        Ok(artifacts)
    }

    /// Same as [`Milvue::get_signed_url`] but streams each artifact to a new
    /// file of `folder` and returns their paths.
    ///
    /// Unlike the in-memory variant, a running job is reported as
    /// [`MilvueError::PredictionRunning`] before any URL is resolved. Files
    /// already written are removed when the batch fails.
    pub fn get_signed_url_to_file(
        &self,
        request: &ResultRequest,
        folder: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, MilvueError> {
        let response = self.fetch_signed_urls(request)?;
        if response.status.is_running() {
            return Err(MilvueError::PredictionRunning);
        }
        let urls = response.urls();
        if urls.is_empty() {
            log::debug!("No signed URL for study {}", request.study_instance_uid());
            return Ok(Vec::new());
        }

        let headers = routes::artifact_headers(&self.credentials)?;
        let mut files = PendingFiles::new(folder.as_ref(), self.names.as_ref())?;
        for (index, url) in urls.iter().enumerate() {
            files.write(|writer| {
                // Download failures go through the same classification as the URL request.
                let written = self
                    .transport
                    .download_to(url, &headers, self.timeout, writer)?;
                log::debug!(
                    "Downloaded artifact {}/{} ({written} bytes)",
                    index + 1,
                    urls.len()
                );
                Ok(())
            })?;
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

    fn fetch_signed_urls(&self, request: &ResultRequest) -> Result<ResultResponse, MilvueError> {
        let url = routes::result_url(&self.base_url, request, RetrievalMode::SignedUrl)?;
        let headers = routes::result_headers(&self.credentials, RetrievalMode::SignedUrl)?;

        log::debug!("Requesting signed URLs at {url}");
        let body = self.transport.get(url.as_str(), &headers, self.timeout)?;
        let response: ResultResponse = serde_json::from_slice(&body)?;

        log::debug!(
            "Study {} status: {}, {} signed URL(s)",
            request.study_instance_uid(),
            response.status,
            response.urls().len()
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactIdentifiers, RawArtifact};
    use crate::test_utils::*;
    use milvue_api::ClientError;
    use milvue_api::InlineResponse;
    use milvue_api::routes::{DICOM_CONTENT_TYPE, JSON_CONTENT_TYPE, OWNER_HEADER};
    use reqwest::header::{ACCEPT, CONTENT_TYPE};
    use rstest::rstest;

    const STORAGE: &str = "https://storage.test";

    fn request() -> ResultRequest {
        ResultRequest::new(STUDY, "smartxpert")
    }

    fn url_list(status: &str, count: usize) -> Reply {
        let urls: Vec<String> = (1..=count)
            .map(|i| format!(r#""{STORAGE}/artifacts/{i}.dcm?sig=abc""#))
            .collect();
        Reply::json(&format!(
            r#"{{"status":"{status}","signed_urls":[{}]}}"#,
            urls.join(",")
        ))
    }

    fn artifact(index: usize) -> Reply {
        Reply::Body(TestArtifact::encode(STUDY, "2.1", &format!("2.1.{index}")))
    }

    fn three_artifacts(second: Reply) -> ScriptedTransport {
        ScriptedTransport::new()
            .on(&result_path(), [url_list("done", 3)])
            .on("/artifacts/1.dcm", [artifact(1)])
            .on("/artifacts/2.dcm", [second])
            .on("/artifacts/3.dcm", [artifact(3)])
    }

    #[test]
    fn should_resolve_urls_in_order() {
        let milvue = milvue(three_artifacts(artifact(2)));

        let artifacts: Vec<TestArtifact> = milvue.get_signed_url(&request()).unwrap();

        let sops: Vec<_> = artifacts
            .iter()
            .map(|a| a.identifiers().unwrap().sop_instance_uid)
            .collect();
        assert_eq!(sops, ["2.1.1", "2.1.2", "2.1.3"]);

        let requests = milvue.transport().requests();
        assert!(requests[0].url.contains("signed_url=true"));
        assert_eq!(requests[0].headers[ACCEPT], JSON_CONTENT_TYPE);
        assert_eq!(requests[1].url, format!("{STORAGE}/artifacts/1.dcm?sig=abc"));
        assert_eq!(requests[1].headers[OWNER_HEADER], "secret-token");
        assert_eq!(requests[1].headers[CONTENT_TYPE], DICOM_CONTENT_TYPE);
    }

    #[rstest]
    #[case::absent(r#"{"status":"done"}"#)]
    #[case::null(r#"{"status":"done","signed_urls":null}"#)]
    #[case::empty(r#"{"status":"done","signed_urls":[]}"#)]
    fn should_return_no_artifacts_without_urls(#[case] body: &str) {
        let milvue = milvue(ScriptedTransport::new().on(&result_path(), [Reply::json(body)]));

        let artifacts: Vec<RawArtifact> = milvue.get_signed_url(&request()).unwrap();

        assert!(artifacts.is_empty());
    }

    #[test]
    fn should_not_check_status_in_memory() {
        let milvue = milvue(
            ScriptedTransport::new()
                .on(&result_path(), [url_list("running", 1)])
                .on("/artifacts/1.dcm", [artifact(1)]),
        );

        let artifacts: Vec<RawArtifact> = milvue.get_signed_url(&request()).unwrap();

        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn should_abort_batch_on_first_failure() {
        let milvue = milvue(three_artifacts(Reply::Status {
            code: 403,
            content_type: Some("application/xml"),
            body: b"<Error>AccessDenied</Error>".to_vec(),
        }));

        let result = milvue.get_signed_url::<TestArtifact>(&request());

        match result {
            Err(MilvueError::Client(ClientError::Request { status, .. })) => {
                assert_eq!(status.as_u16(), 403)
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(milvue.transport().requests_to("/artifacts/3.dcm").is_empty());
    }

    #[rstest]
    #[case::in_memory(false)]
    #[case::to_file(true)]
    fn should_classify_formatting_error(#[case] to_file: bool) {
        let milvue = milvue(ScriptedTransport::new().on(&result_path(), [Reply::formatting_error()]));
        let dir = tempfile::tempdir().unwrap();

        let result = if to_file {
            milvue.get_signed_url_to_file(&request(), dir.path()).map(|_| ())
        } else {
            milvue.get_signed_url::<RawArtifact>(&request()).map(|_| ())
        };

        assert!(matches!(result, Err(MilvueError::FormattingError)));
    }

    #[test]
    fn should_classify_formatting_error_on_download() {
        let milvue = milvue(three_artifacts(Reply::formatting_error()));

        let result = milvue.get_signed_url::<RawArtifact>(&request());

        assert!(matches!(result, Err(MilvueError::FormattingError)));
    }

    #[test]
    fn should_propagate_malformed_url_list() {
        let milvue = milvue(ScriptedTransport::new().on(&result_path(), [Reply::json("{")]));

        let result = milvue.get_signed_url::<RawArtifact>(&request());

        assert!(matches!(result, Err(MilvueError::Decode(_))));
    }

    #[test]
    fn should_report_running_before_resolving_urls() {
        let milvue = milvue(
            ScriptedTransport::new()
                .on(&result_path(), [url_list("running", 3)])
                .on("/artifacts/1.dcm", [artifact(1)]),
        );
        let dir = tempfile::tempdir().unwrap();

        let result = milvue.get_signed_url_to_file(&request(), dir.path());

        assert!(matches!(result, Err(MilvueError::PredictionRunning)));
        assert_eq!(milvue.transport().requests().len(), 1);
    }

    #[test]
    fn should_write_each_artifact_to_file() {
        let milvue = milvue(three_artifacts(artifact(2)));
        let dir = tempfile::tempdir().unwrap();

        let paths = milvue.get_signed_url_to_file(&request(), dir.path()).unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(
            std::fs::read(&paths[2]).unwrap(),
            TestArtifact::encode(STUDY, "2.1", "2.1.3")
        );
    }

    #[test]
    fn should_remove_written_files_when_batch_fails() {
        let milvue = milvue(three_artifacts(Reply::Disconnected));
        let dir = tempfile::tempdir().unwrap();

        let result = milvue.get_signed_url_to_file(&request(), dir.path());

        assert!(matches!(
            result,
            Err(MilvueError::Client(ClientError::Connection(_)))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn should_yield_same_identifiers_inline_and_signed() {
        let bytes = TestArtifact::encode(STUDY, "3.1", "3.1.7");
        let milvue = milvue(
            ScriptedTransport::new()
                .on(
                    &result_path(),
                    [
                        Reply::Inline(InlineResponse::Records(vec![bytes.clone()])),
                        url_list("done", 1),
                    ],
                )
                .on("/artifacts/1.dcm", [Reply::Body(bytes)]),
        );

        let inline: Vec<TestArtifact> = milvue.get(&request()).unwrap();
        let signed: Vec<TestArtifact> = milvue.get_signed_url(&request()).unwrap();

        assert_eq!(
            inline[0].identifiers().unwrap(),
            signed[0].identifiers().unwrap()
        );
    }
}
