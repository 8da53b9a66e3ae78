//! Core library for the leave desk service: the leave-request workflow
//! engine plus the configuration, telemetry, and error plumbing shared with
//! the API binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
