//! API schemas for the Milvue inference API
//!
//! This module contains the request and response schemas used when talking to
//! the study endpoints.
//!
//! # Organization
//!
//! - [`request`] - Parameters of a result query
//! - [`response`] - Schemas for data received from the API
//!
//! Common types are re-exported at the module level for convenience.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
