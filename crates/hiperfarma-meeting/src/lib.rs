pub mod config;
pub mod error;
pub mod meeting;
pub mod telemetry;
