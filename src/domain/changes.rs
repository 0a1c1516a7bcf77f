//! Universe membership change notifications.

use std::collections::HashSet;

/// Symbols that entered and left the universe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SecurityChanges {
    pub fn none() -> Self {
        Self::default()
    }

    /// Membership difference going from `previous` to `next`.
    ///
    /// `added` follows `next` order and `removed` follows `previous` order.
    pub fn between(previous: &[String], next: &[String]) -> Self {
        let prev_set: HashSet<&str> = previous.iter().map(String::as_str).collect();
        let next_set: HashSet<&str> = next.iter().map(String::as_str).collect();

        let mut added = Vec::new();
        for symbol in next {
            if !prev_set.contains(symbol.as_str()) && !added.contains(symbol) {
                added.push(symbol.clone());
            }
        }
        let removed = previous
            .iter()
            .filter(|s| !next_set.contains(s.as_str()))
            .cloned()
            .collect();

        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Fold a later notification into this one.
    ///
    /// A symbol added then removed (or removed then re-added) cancels out.
    pub fn merge(&mut self, later: SecurityChanges) {
        for symbol in later.added {
            if let Some(pos) = self.removed.iter().position(|s| *s == symbol) {
                self.removed.remove(pos);
            } else if !self.added.contains(&symbol) {
                self.added.push(symbol);
            }
        }
        for symbol in later.removed {
            if let Some(pos) = self.added.iter().position(|s| *s == symbol) {
                self.added.remove(pos);
            } else if !self.removed.contains(&symbol) {
                self.removed.push(symbol);
            }
        }
    }
}

/// Edge-triggered "universe changed" flag with a single consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChangeFlag {
    #[default]
    Idle,
    Pending(SecurityChanges),
}

impl ChangeFlag {
    /// Record a membership change. Empty notifications are ignored.
    pub fn notify(&mut self, changes: SecurityChanges) {
        if changes.is_empty() {
            return;
        }
        match self {
            ChangeFlag::Idle => *self = ChangeFlag::Pending(changes),
            ChangeFlag::Pending(pending) => pending.merge(changes),
        }
    }

    /// Consume the pending changes, returning the flag to `Idle`.
    pub fn take(&mut self) -> Option<SecurityChanges> {
        match std::mem::take(self) {
            ChangeFlag::Idle => None,
            ChangeFlag::Pending(changes) => Some(changes),
        }
    }
}
