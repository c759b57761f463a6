//! Subscription registry.
//!
//! Records every subscription the manager has sent, in order, and decides
//! which of them a new connection replays.

use crate::domain::Subscription;
use crate::infrastructure::config::stream::{ReplayPolicy, UnsubscribePolicy};

#[derive(Debug, Clone)]
pub struct SubscriptionRegistry {
    /// Subscriptions supplied when the manager was created.
    initial: Vec<Subscription>,
    /// Everything subscribed since, append-only unless pruned.
    entries: Vec<Subscription>,
    replay: ReplayPolicy,
    unsubscribe: UnsubscribePolicy,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new(
        initial: Vec<Subscription>,
        replay: ReplayPolicy,
        unsubscribe: UnsubscribePolicy,
    ) -> Self {
        Self {
            entries: initial.clone(),
            initial,
            replay,
            unsubscribe,
        }
    }

    /// Append a subscription. Duplicates are kept.
    pub fn record(&mut self, subscription: Subscription) {
        self.entries.push(subscription);
    }

    /// Apply the unsubscribe policy; returns how many entries were removed.
    pub fn forget(&mut self, subscription: &Subscription) -> usize {
        if self.unsubscribe == UnsubscribePolicy::Retain {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|entry| entry != subscription);
        before - self.entries.len()
    }

    /// Subscriptions to send, in order, after a connection authenticates.
    #[must_use]
    pub fn replay_set(&self) -> Vec<Subscription> {
        match self.replay {
            ReplayPolicy::Static => self.initial.clone(),
            ReplayPolicy::Live => self.entries.clone(),
        }
    }

    /// True when subscriptions recorded after creation are part of the
    /// replay set.
    #[must_use]
    pub fn replays_recorded(&self) -> bool {
        self.replay == ReplayPolicy::Live
    }

    /// True when unsubscribing removes entries.
    #[must_use]
    pub fn prunes(&self) -> bool {
        self.unsubscribe == UnsubscribePolicy::Prune
    }

    #[must_use]
    pub fn contains(&self, subscription: &Subscription) -> bool {
        self.entries.contains(subscription)
    }

    /// Every recorded subscription, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[Subscription] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
