pub mod client;
pub mod credentials;
pub mod error;
mod multipart;
pub mod routes;
pub mod schemas;
pub mod transport;

pub use client::Client;
pub use credentials::MilvueCredentials;
pub use error::{ClientError, ErrorKind};
pub use reqwest::Url;
pub use transport::{InlineResponse, Transport};
