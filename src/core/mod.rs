//! Scheduling core: admission, lifecycle state machine, and event fan-out.

pub mod error;
pub mod instance;
pub mod scheduler;
pub mod settings;
pub mod signal;

pub use error::{AppResult, SchedulerError};
pub use instance::{DisplayState, DisplayedNotification, NotificationId};
pub use scheduler::{NotificationScheduler, SchedulerEvent, FADE_DURATION_MS};
pub use settings::{
    CloseMethod, NotificationRequest, NotificationSettings, DEFAULT_CLOSE_METHOD,
    DEFAULT_TIMEOUT_MS,
};
pub use signal::{Publisher, Subscription};
