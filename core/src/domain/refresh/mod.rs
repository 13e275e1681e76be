//! Publish/subscribe channel that lets one part of the client ask an open list
//! view to reload, keyed by a stable screen identifier.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(Cow<'static, str>);

impl ScreenId {
    pub const HISTORY_ALL: ScreenId = ScreenId(Cow::Borrowed("history/all"));
    pub const HISTORY_DAY: ScreenId = ScreenId(Cow::Borrowed("history/day"));
    pub const HISTORY_WEEK: ScreenId = ScreenId(Cow::Borrowed("history/week"));
    pub const HISTORY_MONTH: ScreenId = ScreenId(Cow::Borrowed("history/month"));
    pub const PROFILE: ScreenId = ScreenId(Cow::Borrowed("profile"));

    pub const HISTORY_SCREENS: [ScreenId; 4] = [
        Self::HISTORY_ALL,
        Self::HISTORY_DAY,
        Self::HISTORY_WEEK,
        Self::HISTORY_MONTH,
    ];

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshReason {
    Requested,
    EntryEdited,
    EntryDeleted,
    SessionChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSignal {
    pub screen: ScreenId,
    pub reason: RefreshReason,
}

type Subscribers = HashMap<ScreenId, Vec<(u64, mpsc::UnboundedSender<RefreshSignal>)>>;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    subscribers: Subscribers,
}

#[derive(Debug, Clone, Default)]
pub struct RefreshBus {
    registry: Arc<Mutex<Registry>>,
}

impl RefreshBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, screen: ScreenId) -> RefreshSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .subscribers
            .entry(screen.clone())
            .or_default()
            .push((id, sender));

        RefreshSubscription {
            id,
            screen,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Signals every live subscriber of `screen` and returns how many were reached.
    pub fn publish(&self, screen: &ScreenId, reason: RefreshReason) -> usize {
        let mut registry = lock(&self.registry);
        let Some(subscribers) = registry.subscribers.get_mut(screen) else {
            return 0;
        };

        let signal = RefreshSignal {
            screen: screen.clone(),
            reason,
        };
        subscribers.retain(|(_, sender)| sender.send(signal.clone()).is_ok());
        let reached = subscribers.len();
        if subscribers.is_empty() {
            registry.subscribers.remove(screen);
        }
        reached
    }

    pub fn subscriber_count(&self, screen: &ScreenId) -> usize {
        lock(&self.registry)
            .subscribers
            .get(screen)
            .map_or(0, Vec::len)
    }
}

/// Live registration on a [`RefreshBus`]; dropping it unsubscribes.
#[derive(Debug)]
pub struct RefreshSubscription {
    id: u64,
    screen: ScreenId,
    receiver: mpsc::UnboundedReceiver<RefreshSignal>,
    registry: Weak<Mutex<Registry>>,
}

impl RefreshSubscription {
    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }

    /// Waits for the next signal. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<RefreshSignal> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RefreshSignal> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for RefreshSubscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(subscribers) = registry.subscribers.get_mut(&self.screen) {
            subscribers.retain(|(id, _)| *id != self.id);
            if subscribers.is_empty() {
                registry.subscribers.remove(&self.screen);
            }
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_only_matching_screen() {
        let bus = RefreshBus::new();
        let mut day = bus.subscribe(ScreenId::HISTORY_DAY);
        let mut week = bus.subscribe(ScreenId::HISTORY_WEEK);

        assert_eq!(bus.publish(&ScreenId::HISTORY_DAY, RefreshReason::EntryEdited), 1);

        assert_eq!(
            day.try_recv(),
            Some(RefreshSignal {
                screen: ScreenId::HISTORY_DAY,
                reason: RefreshReason::EntryEdited,
            })
        );
        assert_eq!(week.try_recv(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = RefreshBus::new();
        let first = bus.subscribe(ScreenId::HISTORY_ALL);
        let second = bus.subscribe(ScreenId::HISTORY_ALL);
        assert_eq!(bus.subscriber_count(&ScreenId::HISTORY_ALL), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(&ScreenId::HISTORY_ALL), 1);

        drop(second);
        assert_eq!(bus.subscriber_count(&ScreenId::HISTORY_ALL), 0);
        assert_eq!(bus.publish(&ScreenId::HISTORY_ALL, RefreshReason::Requested), 0);
    }

    #[test]
    fn test_owned_and_const_ids_are_equal() {
        let bus = RefreshBus::new();
        let _sub = bus.subscribe(ScreenId::new("history/month"));
        assert_eq!(bus.subscriber_count(&ScreenId::HISTORY_MONTH), 1);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = RefreshBus::new();
        let mut sub = bus.subscribe(ScreenId::PROFILE);
        drop(bus);
        assert_eq!(sub.try_recv(), None);
        drop(sub);
    }

    #[tokio::test]
    async fn test_recv_ends_when_bus_is_dropped() {
        let bus = RefreshBus::new();
        let mut sub = bus.subscribe(ScreenId::HISTORY_ALL);
        bus.publish(&ScreenId::HISTORY_ALL, RefreshReason::SessionChanged);
        drop(bus);

        assert_eq!(
            sub.recv().await.map(|signal| signal.reason),
            Some(RefreshReason::SessionChanged)
        );
        assert_eq!(sub.recv().await, None);
    }
}
