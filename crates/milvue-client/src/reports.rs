//! JSON reports produced by the inference products.

use milvue_api::{Transport, routes};
use serde::de::DeserializeOwned;

use crate::client::Milvue;
use crate::error::MilvueError;

/// Report endpoints, one per inference product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReportKind {
    Smarturgences,
    Smartxpert,
}

impl<T: Transport> Milvue<T> {
    /// Fetch the report of a study and decode it into `R`.
    pub fn get_report<R: DeserializeOwned>(
        &self,
        kind: ReportKind,
        study_instance_uid: &str,
    ) -> Result<R, MilvueError> {
        let url = routes::report_url(&self.base_url, &kind.to_string(), study_instance_uid)?;
        let headers = routes::owner_headers(&self.credentials)?;

        log::debug!("Requesting {kind} report at {url}");
        let body = self
            .transport
            .get(url.as_str(), &headers, self.timeout)
            .map_err(MilvueError::Client)?;

        Ok(serde_json::from_slice(&body)?)
    }

    pub fn get_smarturgences(
        &self,
        study_instance_uid: &str,
    ) -> Result<serde_json::Value, MilvueError> {
        self.get_report(ReportKind::Smarturgences, study_instance_uid)
    }

    pub fn get_smartxpert(&self, study_instance_uid: &str) -> Result<serde_json::Value, MilvueError> {
        self.get_report(ReportKind::Smartxpert, study_instance_uid)
    }
}
