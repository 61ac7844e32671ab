//! Codec interfaces for the binary artifacts returned by a job.
//!
//! The client does not interpret artifacts itself. It hands the raw bytes of
//! each record to an [`ArtifactDecode`] implementation chosen by the caller.

use std::convert::Infallible;

use bytes::Bytes;

use crate::error::MilvueError;

/// Trait for decoding one artifact from its raw bytes.
pub trait ArtifactDecode: Sized {
    type Error: Into<Box<dyn std::error::Error + Send + Sync + 'static>>;

    fn decode(bytes: Bytes) -> Result<Self, Self::Error>;
}

/// Trait for artifacts that can report which study, series and instance they belong to.
pub trait ArtifactIdentifiers {
    type Error: Into<Box<dyn std::error::Error + Send + Sync + 'static>>;

    fn identifiers(&self) -> Result<StudyIdentifiers, Self::Error>;
}

/// Identifiers of a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudyIdentifiers {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub sop_instance_uid: String,
}

/// An artifact kept as the raw bytes received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArtifact(Bytes);

impl RawArtifact {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ArtifactDecode for RawArtifact {
    type Error = Infallible;

    fn decode(bytes: Bytes) -> Result<Self, Self::Error> {
        Ok(RawArtifact(bytes))
    }
}

pub(crate) fn decode_artifact<A: ArtifactDecode>(bytes: Bytes) -> Result<A, MilvueError> {
    A::decode(bytes).map_err(|e| MilvueError::Artifact(e.into()))
}
