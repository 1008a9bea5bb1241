//! Runtime adapters for spawning timer tasks.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;

use std::future::Future;

/// Abstraction for spawning one-shot timer futures on an async runtime.
///
/// The scheduler never blocks its callers: auto-close and fade-removal timers
/// run as background futures handed to the spawner.
pub trait Spawn {
    /// Spawn a future to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
