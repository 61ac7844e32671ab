//! Client for the Milvue asynchronous inference API.
//!
//! A job is keyed by a study instance UID. Callers poll its status with
//! [`Milvue::get_status`] or [`Milvue::wait_done`], then retrieve the resulting
//! artifacts either inline ([`Milvue::get`]) or through signed URLs
//! ([`Milvue::get_signed_url`]).

mod client;
mod error;
mod inline;
mod signed_url;
mod status;

pub mod artifact;
pub mod reports;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use crate::artifact::{ArtifactDecode, ArtifactIdentifiers, RawArtifact, StudyIdentifiers};
pub use crate::client::*;
pub use crate::error::MilvueError;
pub use crate::reports::ReportKind;
pub use crate::status::WaitOptions;
pub use crate::storage::{NameGenerator, UuidNameGenerator};

pub use milvue_api::schemas::{JobStatus, ResultRequest, ResultResponse, StatusResponse};
pub use milvue_api::credentials::TOKEN_ENV;
pub use milvue_api::{ClientError, InlineResponse, MilvueCredentials, Transport};
