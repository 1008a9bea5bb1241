//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by the notification scheduler.
///
/// The taxonomy is deliberately narrow: the core is purely in-memory, so most
/// anomalous inputs (unknown ids, non-positive display caps) are defined
/// behavior rather than errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `submit` was called before any presentation subscriber attached.
    /// A notification shown to nobody is silently lost, so this surfaces as a
    /// wiring error instead.
    #[error(
        "no state-changed subscriber attached: \
         subscribe a renderer to the scheduler before submitting notifications"
    )]
    NoAnchor,
    /// Configuration input could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
