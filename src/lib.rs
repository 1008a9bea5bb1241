//! # Toast Scheduler
//!
//! A capacity-capped scheduler for transient (toast/snackbar) notifications.
//!
//! Host code submits notification requests at any rate; the scheduler caps how
//! many are visible at once, queues overflow FIFO, and retires each displayed
//! notification through a timed lifecycle:
//!
//! ```text
//! submitted -> pending queue -> Visible -> FadingOut -> Hidden -> erased
//! ```
//!
//! Presentation is external. The scheduler publishes a "state changed" event
//! after every mutation, carrying an ordered snapshot of the displayed set;
//! renderers subscribe and repaint from the snapshot. Submitting with no
//! subscriber attached is a wiring error and fails loudly, because silently
//! dropping a notification is worse than a visible failure.
//!
//! ## Core Guarantees
//!
//! - **Capacity invariant**: the count of non-`Hidden` displayed notifications
//!   never exceeds `max_visible` (a value `<= 0` means unbounded). A fading
//!   notification still occupies its slot until fully hidden, so queued
//!   notifications are not admitted while the outgoing one still holds
//!   presentation space.
//! - **FIFO fairness**: queued notifications are admitted in arrival order.
//! - **Fixed fade**: the fade-out duration is a fixed constant, independent of
//!   the per-notification display timeout.
//! - **Batched eviction**: hidden notifications are erased together once no
//!   sibling is still mid-fade, avoiding layout churn.
//! - **Idempotent close**: closing an unknown or already-closing notification
//!   is a silent no-op, so a late auto-close timer racing a user-initiated
//!   close cannot double-transition.
//!
//! ## Example
//!
//! ```rust,ignore
//! use toast_scheduler::config::ServiceConfig;
//! use toast_scheduler::core::{NotificationRequest, NotificationScheduler, SchedulerEvent};
//! use toast_scheduler::runtime::TokioSpawner;
//!
//! let config = ServiceConfig::default();
//! let scheduler = NotificationScheduler::new(config, TokioSpawner::current());
//!
//! // A renderer must subscribe before anything can be shown.
//! let mut renderer = scheduler.subscribe();
//!
//! let id = scheduler.submit(
//!     NotificationRequest::new().message("Saved").timeout_ms(3000),
//! )?;
//!
//! while let Some(SchedulerEvent::StateChanged(displayed)) = renderer.recv().await {
//!     // repaint `displayed` in order
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Scheduling core: admission, lifecycle state machine, and event fan-out.
pub mod core;
/// Shared service configuration observable by presentation collaborators.
pub mod config;
/// Runtime adapters for spawning timer tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;
