//! Notification admission and lifecycle scheduling.
//!
//! The scheduler owns two containers: a FIFO pending queue for notifications
//! awaiting a free display slot, and the displayed collection of notifications
//! currently occupying presentation space. Each container sits behind its own
//! `parking_lot::Mutex`; whenever both are touched in one operation the
//! pending lock is taken first and the displayed lock nested inside it. The
//! close/remove paths take only the displayed lock, and the remove path
//! releases it before re-entering the flush, so the ordering can never invert.
//!
//! State-changed events are published after all locks are released, so
//! presentation callbacks never execute while holding scheduler locks.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::ServiceConfig;
use crate::core::error::SchedulerError;
use crate::core::instance::{
    DisplayState, DisplayedNotification, NotificationId, NotificationInstance,
};
use crate::core::settings::{CloseMethod, NotificationRequest, NotificationSettings};
use crate::core::signal::{Publisher, Subscription};
use crate::runtime::Spawn;
use crate::util::clock::now_ms;

/// Fixed fade-out duration in milliseconds.
///
/// Deliberately independent of the per-notification display timeout: the
/// timing contract is `applied_timeout` visible, then this constant fading,
/// then removal.
pub const FADE_DURATION_MS: u64 = 500;

/// Event published to presentation subscribers.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// The pending queue or displayed collection changed. Carries the
    /// displayed set in admission order for the renderer to repaint.
    StateChanged(Vec<DisplayedNotification>),
}

struct Inner<S> {
    config: ServiceConfig,
    /// Outer lock region. Taken before `displayed` whenever both are needed.
    pending: Mutex<VecDeque<NotificationInstance>>,
    /// Inner lock region.
    displayed: Mutex<Vec<NotificationInstance>>,
    changes: Publisher<SchedulerEvent>,
    spawner: S,
}

/// Capacity-capped scheduler driving transient notifications through the
/// `Visible -> FadingOut -> Hidden -> erased` lifecycle.
///
/// Cheap to clone; clones share the same queues and subscribers. Timer
/// futures hold only a weak reference to the shared state, so dropping the
/// last scheduler handle turns any still-pending timer fires into no-ops.
pub struct NotificationScheduler<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for NotificationScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> NotificationScheduler<S> {
    /// Create a scheduler over the shared service configuration.
    pub fn new(config: ServiceConfig, spawner: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                pending: Mutex::new(VecDeque::new()),
                displayed: Mutex::new(Vec::new()),
                changes: Publisher::new(),
                spawner,
            }),
        }
    }

    /// Subscribe to state-changed events. At least one live subscription must
    /// exist before [`submit`](Self::submit) is called.
    pub fn subscribe(&self) -> Subscription<SchedulerEvent> {
        self.inner.changes.subscribe()
    }

    /// The shared configuration handle this scheduler reads at decision time.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// Number of notifications awaiting a free display slot.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Snapshot of the displayed collection in admission order.
    #[must_use]
    pub fn displayed(&self) -> Vec<DisplayedNotification> {
        self.inner
            .displayed
            .lock()
            .iter()
            .map(NotificationInstance::snapshot)
            .collect()
    }
}

impl<S: Spawn + Send + Sync + 'static> NotificationScheduler<S> {
    /// Submit a notification request.
    ///
    /// Wraps the request into an instance with a fresh identity and current
    /// timestamp, appends it to the pending queue tail, and flushes pending
    /// notifications into the displayed set up to the configured cap. The
    /// generated id is returned so hosts can close
    /// [`CloseMethod::CloseButton`] notifications explicitly; renderers learn
    /// of display changes through the state-changed event instead.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NoAnchor`] when no state-changed subscriber is
    /// attached: the notification would be silently lost, which is treated as
    /// a wiring error.
    pub fn submit(&self, request: NotificationRequest) -> Result<NotificationId, SchedulerError> {
        if self.inner.changes.subscriber_count() == 0 {
            return Err(SchedulerError::NoAnchor);
        }

        let instance = NotificationInstance {
            id: NotificationId::generate(),
            arrival_ms: now_ms(),
            settings: NotificationSettings::new(request, Some(self.inner.config.clone())),
            state: DisplayState::Visible,
        };
        let id = instance.id;
        tracing::debug!(%id, "notification submitted");

        let (snapshot, timers) = {
            let mut pending = self.inner.pending.lock();
            pending.push_back(instance);
            let mut displayed = self.inner.displayed.lock();
            self.flush_locked(&mut pending, &mut displayed)
        };
        self.arm_close_timers(timers);
        self.publish(snapshot);
        Ok(id)
    }

    /// Begin closing a displayed notification.
    ///
    /// Transitions the instance to `FadingOut`, publishes the change, and
    /// schedules the fixed-duration fade timer whose fire calls
    /// [`remove`](Self::remove). Idempotent: unknown ids, or instances already
    /// fading or hidden, are ignored silently, so an auto-close timer racing a
    /// user-initiated close cannot double-transition.
    pub fn close(&self, id: NotificationId) {
        let snapshot = {
            let mut displayed = self.inner.displayed.lock();
            let Some(instance) = displayed
                .iter_mut()
                .find(|i| i.id == id && i.state == DisplayState::Visible)
            else {
                return;
            };
            instance.state = DisplayState::FadingOut;
            displayed
                .iter()
                .map(NotificationInstance::snapshot)
                .collect::<Vec<_>>()
        };
        tracing::debug!(%id, "notification fading out");

        let weak = Arc::downgrade(&self.inner);
        self.inner.spawner.spawn(async move {
            tokio::time::sleep(Duration::from_millis(FADE_DURATION_MS)).await;
            if let Some(inner) = weak.upgrade() {
                Self { inner }.remove(id);
            }
        });
        self.publish(snapshot);
    }

    /// Finish removing a notification once its fade has elapsed.
    ///
    /// Transitions the instance to `Hidden`, then applies the removal-batching
    /// rule: hidden instances are erased from the displayed collection only
    /// when no sibling is still fading, so notifications finishing in quick
    /// succession leave the screen together instead of reflowing one by one.
    /// Afterwards the pending queue is flushed into any freed capacity.
    /// Unknown or not-fading ids are ignored silently.
    pub fn remove(&self, id: NotificationId) {
        let snapshot = {
            let mut displayed = self.inner.displayed.lock();
            let Some(instance) = displayed
                .iter_mut()
                .find(|i| i.id == id && i.state == DisplayState::FadingOut)
            else {
                return;
            };
            instance.state = DisplayState::Hidden;

            if !displayed.iter().any(|i| i.state == DisplayState::FadingOut) {
                displayed.retain(|i| i.state != DisplayState::Hidden);
            }
            displayed
                .iter()
                .map(NotificationInstance::snapshot)
                .collect::<Vec<_>>()
        };
        tracing::debug!(%id, "notification hidden");
        self.publish(snapshot);
        self.flush();
    }

    /// Re-publish the displayed set whenever the shared configuration
    /// changes, so renderers repaint on reconfiguration. Call once after
    /// construction; the watcher stops when either the scheduler or the
    /// configuration handle is dropped.
    pub fn watch_config(&self) {
        let mut changes = self.inner.config.subscribe_changes();
        let weak = Arc::downgrade(&self.inner);
        self.inner.spawner.spawn(async move {
            while changes.recv().await.is_some() {
                let Some(inner) = weak.upgrade() else { break };
                let snapshot = inner
                    .displayed
                    .lock()
                    .iter()
                    .map(NotificationInstance::snapshot)
                    .collect();
                inner.changes.publish(SchedulerEvent::StateChanged(snapshot));
            }
        });
    }

    /// Flush pending notifications into freed display capacity.
    fn flush(&self) {
        let (snapshot, timers) = {
            let mut pending = self.inner.pending.lock();
            let mut displayed = self.inner.displayed.lock();
            self.flush_locked(&mut pending, &mut displayed)
        };
        self.arm_close_timers(timers);
        self.publish(snapshot);
    }

    /// Admission loop. Caller holds both locks in pending-then-displayed
    /// order; timer arming and event publication happen after they drop.
    fn flush_locked(
        &self,
        pending: &mut VecDeque<NotificationInstance>,
        displayed: &mut Vec<NotificationInstance>,
    ) -> (Vec<DisplayedNotification>, Vec<(NotificationId, u64)>) {
        // Capacity is keyed to occupied presentation space: a FadingOut
        // instance still counts against the cap until fully hidden.
        let cap = usize::try_from(self.inner.config.max_visible()).ok().filter(|&c| c > 0);
        let mut timers = Vec::new();

        loop {
            if let Some(cap) = cap {
                let occupied = displayed
                    .iter()
                    .filter(|i| i.state != DisplayState::Hidden)
                    .count();
                if occupied >= cap {
                    break;
                }
            }
            let Some(mut instance) = pending.pop_front() else {
                break;
            };
            instance.state = DisplayState::Visible;
            if instance.settings.applied_close_method() != CloseMethod::CloseButton {
                timers.push((instance.id, u64::from(instance.settings.applied_timeout())));
            }
            tracing::debug!(id = %instance.id, "notification admitted");
            displayed.push(instance);
        }

        let snapshot = displayed
            .iter()
            .map(NotificationInstance::snapshot)
            .collect();
        (snapshot, timers)
    }

    /// Arm one-shot auto-close timers for freshly admitted notifications.
    /// Fires resolve by identity, so a fire after the instance is gone is a
    /// no-op rather than requiring cancellation.
    fn arm_close_timers(&self, timers: Vec<(NotificationId, u64)>) {
        for (id, timeout_ms) in timers {
            let weak = Arc::downgrade(&self.inner);
            self.inner.spawner.spawn(async move {
                tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                if let Some(inner) = weak.upgrade() {
                    Self { inner }.close(id);
                }
            });
        }
    }

    fn publish(&self, displayed: Vec<DisplayedNotification>) {
        self.inner
            .changes
            .publish(SchedulerEvent::StateChanged(displayed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValues;

    /// Spawner that drops timer futures: admission logic can then be tested
    /// synchronously without a runtime.
    #[derive(Clone)]
    struct NullSpawner;

    impl Spawn for NullSpawner {
        fn spawn<F>(&self, _fut: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
        }
    }

    fn scheduler(max_visible: i32) -> NotificationScheduler<NullSpawner> {
        let config = ServiceConfig::new(ConfigValues {
            max_visible,
            ..ConfigValues::default()
        });
        NotificationScheduler::new(config, NullSpawner)
    }

    #[test]
    fn test_submit_without_subscriber_fails_loudly() {
        let sched = scheduler(2);
        let err = sched.submit(NotificationRequest::new()).unwrap_err();
        assert!(matches!(err, SchedulerError::NoAnchor));
        assert_eq!(sched.pending_len(), 0);
        assert!(sched.displayed().is_empty());
    }

    #[test]
    fn test_cap_queues_overflow_fifo() {
        let sched = scheduler(2);
        let _sub = sched.subscribe();

        let first = sched.submit(NotificationRequest::new().message("a")).unwrap();
        let second = sched.submit(NotificationRequest::new().message("b")).unwrap();
        let _third = sched.submit(NotificationRequest::new().message("c")).unwrap();

        let displayed = sched.displayed();
        assert_eq!(displayed.len(), 2);
        assert_eq!(displayed[0].id, first);
        assert_eq!(displayed[1].id, second);
        assert_eq!(sched.pending_len(), 1);
    }

    #[test]
    fn test_nonpositive_cap_means_unbounded() {
        let sched = scheduler(0);
        let _sub = sched.subscribe();
        for _ in 0..5 {
            sched.submit(NotificationRequest::new()).unwrap();
        }
        assert_eq!(sched.displayed().len(), 5);
        assert_eq!(sched.pending_len(), 0);
    }

    #[test]
    fn test_fading_instance_still_occupies_slot() {
        let sched = scheduler(1);
        let _sub = sched.subscribe();
        let first = sched.submit(NotificationRequest::new()).unwrap();
        sched.submit(NotificationRequest::new()).unwrap();

        sched.close(first);
        // Still mid-fade: the queued notification must not be admitted yet.
        assert_eq!(sched.displayed().len(), 1);
        assert_eq!(sched.displayed()[0].state, DisplayState::FadingOut);
        assert_eq!(sched.pending_len(), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_ignores_unknown_ids() {
        let sched = scheduler(2);
        let mut sub = sched.subscribe();
        let id = sched.submit(NotificationRequest::new()).unwrap();
        while sub.try_recv().is_some() {}

        sched.close(id);
        assert_eq!(sched.displayed()[0].state, DisplayState::FadingOut);
        assert!(sub.try_recv().is_some());

        // Second close and a close on an erased/unknown id publish nothing.
        sched.close(id);
        assert!(sub.try_recv().is_none());
        sched.remove(id);
        sched.close(id);
        assert!(sched.displayed().is_empty() || sched.displayed()[0].state == DisplayState::Hidden);
    }

    #[test]
    fn test_remove_erases_and_admits_queued() {
        let sched = scheduler(2);
        let _sub = sched.subscribe();
        let first = sched.submit(NotificationRequest::new()).unwrap();
        let second = sched.submit(NotificationRequest::new()).unwrap();
        let third = sched.submit(NotificationRequest::new()).unwrap();

        sched.close(first);
        sched.remove(first);

        let displayed = sched.displayed();
        assert_eq!(displayed.len(), 2);
        assert_eq!(displayed[0].id, second);
        assert_eq!(displayed[1].id, third);
        assert_eq!(sched.pending_len(), 0);
    }

    #[test]
    fn test_hidden_instances_wait_for_fading_siblings() {
        let sched = scheduler(0);
        let _sub = sched.subscribe();
        let x = sched.submit(NotificationRequest::new()).unwrap();
        let y = sched.submit(NotificationRequest::new()).unwrap();
        let z = sched.submit(NotificationRequest::new()).unwrap();

        sched.close(x);
        sched.close(y);
        sched.close(z);

        sched.remove(x);
        sched.remove(y);
        // z is still fading: x and y stay in the collection as Hidden.
        let displayed = sched.displayed();
        assert_eq!(displayed.len(), 3);
        assert_eq!(displayed[0].state, DisplayState::Hidden);
        assert_eq!(displayed[1].state, DisplayState::Hidden);
        assert_eq!(displayed[2].state, DisplayState::FadingOut);

        sched.remove(z);
        assert!(sched.displayed().is_empty());
    }
}
