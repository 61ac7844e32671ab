use std::fmt::{Debug, Formatter};
use std::str::FromStr;

/// Name of the environment variable holding the access token.
pub const TOKEN_ENV: &str = "MILVUE_TOKEN";

/// Access token sent to the Milvue API in the ownership header.
#[derive(Clone, PartialEq, Eq)]
pub struct MilvueCredentials {
    token: String,
}

impl MilvueCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Creates a new instance of `MilvueCredentials` from the `MILVUE_TOKEN` environment variable.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let token = std::env::var(TOKEN_ENV)?;
        Ok(Self::new(token))
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Debug for MilvueCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilvueCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl FromStr for MilvueCredentials {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Err("Token cannot be empty".to_string())
        } else {
            Ok(Self::new(s))
        }
    }
}

impl From<&str> for MilvueCredentials {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for MilvueCredentials {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}
