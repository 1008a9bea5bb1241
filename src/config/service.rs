//! Shared, runtime-mutable scheduler service configuration.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::error::SchedulerError;
use crate::core::settings::{CloseMethod, DEFAULT_CLOSE_METHOD, DEFAULT_TIMEOUT_MS};
use crate::core::signal::{Publisher, Subscription};

/// Default cap on simultaneously displayed notifications.
pub const DEFAULT_MAX_VISIBLE: i32 = 5;

/// Raised to subscribers whenever a configuration value actually changes.
/// Writes that leave the value unchanged do not raise it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChanged;

/// Plain configuration values, serializable for host config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValues {
    /// Cap on simultaneously displayed notifications; `<= 0` means unbounded.
    pub max_visible: i32,
    /// Fallback auto-close delay in milliseconds for requests that carry no
    /// timeout of their own.
    pub default_timeout_ms: u32,
    /// Fallback close method for requests that carry none of their own.
    pub default_close_method: CloseMethod,
}

impl Default for ConfigValues {
    fn default() -> Self {
        Self {
            max_visible: DEFAULT_MAX_VISIBLE,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            default_close_method: DEFAULT_CLOSE_METHOD,
        }
    }
}

impl ConfigValues {
    /// Parse configuration values from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        serde_json::from_str(input).map_err(|e| SchedulerError::InvalidConfig(e.to_string()))
    }
}

struct Shared {
    values: RwLock<ConfigValues>,
    changes: Publisher<ConfigChanged>,
}

/// Shared configuration handle. Clones observe the same values, and the
/// scheduler always reads current values at decision time rather than a
/// snapshot from submission time.
#[derive(Clone)]
pub struct ServiceConfig {
    shared: Arc<Shared>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(ConfigValues::default())
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("values", &self.values())
            .finish_non_exhaustive()
    }
}

impl ServiceConfig {
    /// Create a handle over the given initial values.
    #[must_use]
    pub fn new(values: ConfigValues) -> Self {
        Self {
            shared: Arc::new(Shared {
                values: RwLock::new(values),
                changes: Publisher::new(),
            }),
        }
    }

    /// Snapshot of the current values.
    #[must_use]
    pub fn values(&self) -> ConfigValues {
        self.shared.values.read().clone()
    }

    /// Current display cap; `<= 0` means unbounded.
    #[must_use]
    pub fn max_visible(&self) -> i32 {
        self.shared.values.read().max_visible
    }

    /// Current fallback auto-close delay in milliseconds.
    #[must_use]
    pub fn default_timeout_ms(&self) -> u32 {
        self.shared.values.read().default_timeout_ms
    }

    /// Current fallback close method.
    #[must_use]
    pub fn default_close_method(&self) -> CloseMethod {
        self.shared.values.read().default_close_method
    }

    /// Set the display cap.
    pub fn set_max_visible(&self, max_visible: i32) {
        self.update(|values| {
            if values.max_visible == max_visible {
                false
            } else {
                values.max_visible = max_visible;
                true
            }
        });
    }

    /// Set the fallback auto-close delay.
    pub fn set_default_timeout_ms(&self, default_timeout_ms: u32) {
        self.update(|values| {
            if values.default_timeout_ms == default_timeout_ms {
                false
            } else {
                values.default_timeout_ms = default_timeout_ms;
                true
            }
        });
    }

    /// Set the fallback close method.
    pub fn set_default_close_method(&self, default_close_method: CloseMethod) {
        self.update(|values| {
            if values.default_close_method == default_close_method {
                false
            } else {
                values.default_close_method = default_close_method;
                true
            }
        });
    }

    /// Subscribe to change notifications. Presentation collaborators use this
    /// to repaint on reconfiguration; the scheduler itself only reads current
    /// values at decision time.
    pub fn subscribe_changes(&self) -> Subscription<ConfigChanged> {
        self.shared.changes.subscribe()
    }

    /// Apply a mutation under the write lock and raise the change
    /// notification after the lock is released, only if a value changed.
    fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut ConfigValues) -> bool,
    {
        let changed = {
            let mut values = self.shared.values.write();
            apply(&mut values)
        };
        if changed {
            tracing::debug!("service configuration changed");
            self.shared.changes.publish(ConfigChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_notify_only_on_actual_change() {
        let config = ServiceConfig::default();
        let mut changes = config.subscribe_changes();

        config.set_max_visible(DEFAULT_MAX_VISIBLE);
        assert_eq!(changes.try_recv(), None);

        config.set_max_visible(2);
        assert_eq!(changes.try_recv(), Some(ConfigChanged));
        assert_eq!(config.max_visible(), 2);
    }

    #[test]
    fn test_clones_share_values() {
        let config = ServiceConfig::default();
        let other = config.clone();
        other.set_default_timeout_ms(1500);
        assert_eq!(config.default_timeout_ms(), 1500);
    }

    #[test]
    fn test_from_json_str_round_trip() {
        let parsed = ConfigValues::from_json_str(
            r#"{"max_visible":3,"default_timeout_ms":2000,"default_close_method":"close_button"}"#,
        )
        .unwrap();
        assert_eq!(parsed.max_visible, 3);
        assert_eq!(parsed.default_timeout_ms, 2000);
        assert_eq!(parsed.default_close_method, CloseMethod::CloseButton);
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        let err = ConfigValues::from_json_str("not json").unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidConfig(_)));
    }
}
