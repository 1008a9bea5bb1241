//! Per-notification request settings and lazy default resolution.

use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;

/// Built-in fallback auto-close delay applied when a request carries no
/// timeout and no configuration handle is attached.
pub const DEFAULT_TIMEOUT_MS: u32 = 5000;

/// Built-in fallback close method applied under the same conditions.
pub const DEFAULT_CLOSE_METHOD: CloseMethod = CloseMethod::Timeout;

/// How a notification leaves the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseMethod {
    /// Auto-close after the applied timeout elapses.
    Timeout,
    /// Stay visible until the host or user explicitly closes it.
    CloseButton,
}

/// Caller-supplied notification request. Immutable once submitted.
///
/// Every field is optional; unset behavioural fields resolve against the
/// shared [`ServiceConfig`] at read time, not at submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Body text.
    pub message: Option<String>,
    /// Heading text shown above the body.
    pub heading: Option<String>,
    /// CSS class passed through to the renderer untouched.
    pub css_class: Option<String>,
    /// Per-notification override of the configured close method.
    pub close_method: Option<CloseMethod>,
    /// Per-notification override of the configured auto-close delay.
    pub timeout_ms: Option<u32>,
}

impl NotificationRequest {
    /// An empty request; all behaviour falls back to configuration defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body text.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the heading text.
    #[must_use]
    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Set the renderer CSS class.
    #[must_use]
    pub fn css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    /// Override the configured close method.
    #[must_use]
    pub const fn close_method(mut self, close_method: CloseMethod) -> Self {
        self.close_method = Some(close_method);
        self
    }

    /// Override the configured auto-close delay.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// A request bound to the shared service configuration for default
/// resolution.
///
/// The applied accessors are pure and evaluated each time they are read, so a
/// configuration change between submission and display is reflected in the
/// value the scheduler acts on. A missing configuration handle falls back to
/// the hardcoded defaults rather than failing.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    request: NotificationRequest,
    config: Option<ServiceConfig>,
}

impl NotificationSettings {
    /// Bind a request to the configuration it resolves defaults against.
    #[must_use]
    pub const fn new(request: NotificationRequest, config: Option<ServiceConfig>) -> Self {
        Self { request, config }
    }

    /// The underlying caller-supplied request.
    #[must_use]
    pub const fn request(&self) -> &NotificationRequest {
        &self.request
    }

    /// Effective auto-close delay: the request override if present, else the
    /// current configuration default, else [`DEFAULT_TIMEOUT_MS`].
    #[must_use]
    pub fn applied_timeout(&self) -> u32 {
        self.request.timeout_ms.unwrap_or_else(|| {
            self.config
                .as_ref()
                .map_or(DEFAULT_TIMEOUT_MS, ServiceConfig::default_timeout_ms)
        })
    }

    /// Effective close method, resolved the same way as the timeout.
    #[must_use]
    pub fn applied_close_method(&self) -> CloseMethod {
        self.request.close_method.unwrap_or_else(|| {
            self.config
                .as_ref()
                .map_or(DEFAULT_CLOSE_METHOD, ServiceConfig::default_close_method)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValues, ServiceConfig};

    #[test]
    fn test_hardcoded_fallbacks_without_config() {
        let settings = NotificationSettings::new(NotificationRequest::new(), None);
        assert_eq!(settings.applied_timeout(), DEFAULT_TIMEOUT_MS);
        assert_eq!(settings.applied_close_method(), DEFAULT_CLOSE_METHOD);
    }

    #[test]
    fn test_request_override_wins_over_config() {
        let config = ServiceConfig::new(ConfigValues {
            default_timeout_ms: 9000,
            default_close_method: CloseMethod::CloseButton,
            ..ConfigValues::default()
        });
        let request = NotificationRequest::new()
            .timeout_ms(1234)
            .close_method(CloseMethod::Timeout);
        let settings = NotificationSettings::new(request, Some(config));
        assert_eq!(settings.applied_timeout(), 1234);
        assert_eq!(settings.applied_close_method(), CloseMethod::Timeout);
    }

    #[test]
    fn test_config_default_read_at_access_time() {
        let config = ServiceConfig::default();
        let settings =
            NotificationSettings::new(NotificationRequest::new(), Some(config.clone()));
        assert_eq!(settings.applied_timeout(), DEFAULT_TIMEOUT_MS);

        // Changing the shared default after binding is visible immediately.
        config.set_default_timeout_ms(750);
        assert_eq!(settings.applied_timeout(), 750);
    }
}
