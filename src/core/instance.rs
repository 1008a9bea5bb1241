//! Scheduler-owned notification instances and render snapshots.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::core::settings::NotificationSettings;

/// Unique identity of a notification instance, generated at submission and
/// stable for the instance's lifetime. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display lifecycle state of a notification occupying presentation space.
///
/// The only legal transitions are `Visible -> FadingOut -> Hidden`; a hidden
/// instance is erased from the displayed collection once no sibling is still
/// fading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    /// On screen, holding a display slot.
    Visible,
    /// Fading out; still holds its display slot until fully hidden.
    FadingOut,
    /// Fully faded; awaiting batched erasure.
    Hidden,
}

/// A live notification owned by the scheduler. `state` is the only mutable
/// field after construction.
#[derive(Debug)]
pub(crate) struct NotificationInstance {
    pub id: NotificationId,
    pub arrival_ms: u128,
    pub settings: NotificationSettings,
    pub state: DisplayState,
}

impl NotificationInstance {
    /// Flatten into the record handed to renderers.
    pub fn snapshot(&self) -> DisplayedNotification {
        let request = self.settings.request();
        DisplayedNotification {
            id: self.id,
            state: self.state,
            message: request.message.clone(),
            heading: request.heading.clone(),
            css_class: request.css_class.clone(),
            arrival_ms: self.arrival_ms,
        }
    }
}

/// Renderer-facing view of one displayed notification.
///
/// Carried by state-changed events in admission order (FIFO admission, not
/// arrival order when capacity reordered the two).
#[derive(Debug, Clone, Serialize)]
pub struct DisplayedNotification {
    /// Identity to pass back to `close` for close-button notifications.
    pub id: NotificationId,
    /// Current lifecycle state, for CSS class selection by the renderer.
    pub state: DisplayState,
    /// Body text, if any.
    pub message: Option<String>,
    /// Heading text, if any.
    pub heading: Option<String>,
    /// Renderer CSS class passthrough.
    pub css_class: Option<String>,
    /// Submission timestamp in milliseconds since the Unix epoch.
    pub arrival_ms: u128,
}
