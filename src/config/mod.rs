//! Shared service configuration observable by presentation collaborators.

pub mod service;

pub use service::{ConfigChanged, ConfigValues, ServiceConfig, DEFAULT_MAX_VISIBLE};
