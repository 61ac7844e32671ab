pub mod get;
pub mod report;
pub mod status;
pub mod wait;
