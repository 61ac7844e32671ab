//! This module provides the [Milvue] struct, the entry point of the inference result API.

use std::sync::Arc;
use std::time::Duration;

use milvue_api::{Client, ClientError, MilvueCredentials, Transport, Url};

use crate::storage::{NameGenerator, UuidNameGenerator};

/// Environment variable overriding the API endpoint.
pub const ENDPOINT_ENV: &str = "MILVUE_API_URL";
/// Environment variable holding the per-request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "MILVUE_TIMEOUT";
pub const DEFAULT_ENDPOINT: &str = "https://api.milvue.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur during the initialization of the [Milvue] client.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
    /// Represents an error when the endpoint URL is invalid.
    #[error("Failed to parse endpoint URL: {0}")]
    InvalidEndpointUrl(String),
    /// Represents an error when an environment variable is not set.
    #[error("Environment variable not set: {0}")]
    EnvNotSet(String),
    #[error("Invalid value `{value}` for environment variable {name}")]
    InvalidEnv { name: String, value: String },
}

/// This builder struct is used to create a [Milvue] client.
pub struct MilvueBuilder {
    endpoint: Option<String>,
    credentials: MilvueCredentials,
    timeout: Duration,
    names: Arc<dyn NameGenerator>,
}

impl MilvueBuilder {
    /// Creates a new [MilvueBuilder] with the given credentials.
    pub fn new(credentials: impl Into<MilvueCredentials>) -> Self {
        MilvueBuilder {
            endpoint: None,
            credentials: credentials.into(),
            timeout: DEFAULT_TIMEOUT,
            names: Arc::new(UuidNameGenerator),
        }
    }

    /// Sets the API endpoint. Defaults to [`DEFAULT_ENDPOINT`].
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the timeout applied to every HTTP request. A zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how files written by the `..._to_file` operations are named.
    pub fn with_name_generator(mut self, names: impl NameGenerator + 'static) -> Self {
        self.names = Arc::new(names);
        self
    }

    /// Builds the [Milvue] client over the default HTTP transport.
    pub fn build(self) -> Result<Milvue, InitError> {
        let transport = Client::new()?;
        self.build_with_transport(transport)
    }

    /// Builds the [Milvue] client over a custom transport.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Milvue<T>, InitError> {
        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let base_url = endpoint
            .parse::<Url>()
            .map_err(|e| InitError::InvalidEndpointUrl(format!("{endpoint}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(InitError::InvalidEndpointUrl(endpoint.to_string()));
        }

        Ok(Milvue {
            transport,
            base_url,
            credentials: self.credentials,
            timeout: self.timeout,
            names: self.names,
        })
    }
}

/// This struct provides the main interface to poll inference jobs and retrieve their results.
///
/// Every operation performs blocking HTTP calls on the current thread.
#[derive(Clone)]
pub struct Milvue<T = Client> {
    pub(crate) transport: T,
    pub(crate) base_url: Url,
    pub(crate) credentials: MilvueCredentials,
    pub(crate) timeout: Duration,
    pub(crate) names: Arc<dyn NameGenerator>,
}

impl Milvue {
    /// Creates a new [MilvueBuilder] to configure the client.
    pub fn builder(credentials: impl Into<MilvueCredentials>) -> MilvueBuilder {
        MilvueBuilder::new(credentials)
    }

    /// Creates a new [Milvue] instance from environment variables.
    ///
    /// This function reads `MILVUE_API_URL`, `MILVUE_TOKEN` and `MILVUE_TIMEOUT`.
    /// Only the token is required.
    pub fn from_env() -> Result<Self, InitError> {
        let credentials = MilvueCredentials::from_env()
            .map_err(|_| InitError::EnvNotSet(milvue_api::credentials::TOKEN_ENV.to_string()))?;
        let mut builder = MilvueBuilder::new(credentials);

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            builder = builder.with_endpoint(endpoint);
        }
        if let Ok(value) = std::env::var(TIMEOUT_ENV) {
            builder = builder.with_timeout(parse_timeout_secs(TIMEOUT_ENV, &value)?);
        }

        builder.build()
    }
}

impl<T: Transport> Milvue<T> {
    pub fn endpoint(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

pub(crate) fn parse_timeout_secs(name: &str, value: &str) -> Result<Duration, InitError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| InitError::InvalidEnv {
            name: name.to_string(),
            value: value.to_string(),
        })
}
