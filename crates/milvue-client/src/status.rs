use std::thread;
use std::time::{Duration, Instant};

use milvue_api::Transport;
use milvue_api::routes;
use milvue_api::schemas::{JobStatus, StatusResponse};

use crate::client::Milvue;
use crate::error::MilvueError;

/// Bounds of the [`Milvue::wait_done`] polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Pause between two consecutive polls.
    pub interval: Duration,
    /// Wall-clock budget of the whole loop, measured from its start.
    pub total_wait_time: Duration,
}

impl WaitOptions {
    pub fn new(interval: Duration, total_wait_time: Duration) -> Self {
        Self {
            interval,
            total_wait_time,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_total_wait_time(mut self, total_wait_time: Duration) -> Self {
        self.total_wait_time = total_wait_time;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            total_wait_time: Duration::from_secs(600),
        }
    }
}

impl<T: Transport> Milvue<T> {
    /// Query the status of the job of a study once.
    ///
    /// Errors are returned as reported by the transport, without classification.
    pub fn get_status(&self, study_instance_uid: &str) -> Result<StatusResponse, MilvueError> {
        let url = routes::status_url(&self.base_url, study_instance_uid)?;
        let headers = routes::owner_headers(&self.credentials)?;

        let body = self
            .transport
            .get(url.as_str(), &headers, self.timeout)
            .map_err(MilvueError::Client)?;
        let response: StatusResponse = serde_json::from_slice(&body)?;

        log::debug!("Study {study_instance_uid} status: {}", response.status);
        Ok(response)
    }

    /// Poll the status of a job until it is `done` or `error`.
    ///
    /// At least one poll is always made. Polls are spaced by
    /// [`WaitOptions::interval`]; once [`WaitOptions::total_wait_time`] has
    /// elapsed the last observed response is returned in
    /// [`MilvueError::PredictionTimeout`]. Transport errors end the loop
    /// immediately.
    pub fn wait_done(
        &self,
        study_instance_uid: &str,
        options: WaitOptions,
    ) -> Result<StatusResponse, MilvueError> {
        let deadline = Instant::now().checked_add(options.total_wait_time);

        loop {
            let response = self.get_status(study_instance_uid)?;
            match response.status {
                JobStatus::Done => {
                    log::info!("Prediction done for study {study_instance_uid}");
                    return Ok(response);
                }
                JobStatus::Error => {
                    log::info!("Prediction failed for study {study_instance_uid}");
                    return Err(MilvueError::PredictionError(response));
                }
                _ => {}
            }

            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(timed_out(study_instance_uid, response));
                    }
                    options.interval.min(remaining)
                }
                None => options.interval,
            };
            thread::sleep(pause);

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(timed_out(study_instance_uid, response));
            }
        }
    }
}

fn timed_out(study_instance_uid: &str, last: StatusResponse) -> MilvueError {
    log::warn!(
        "Gave up waiting for study {study_instance_uid}, last status: {}",
        last.status
    );
    MilvueError::PredictionTimeout(last)
}
