//! Host-facing rotation strategy.
//!
//! The host calls [`RotationStrategy::on_securities_changed`] whenever the
//! universe membership changes and [`RotationStrategy::on_data`] every cycle.
//! Ranking only runs on the first cycle after a change.

use crate::domain::changes::{ChangeFlag, SecurityChanges};
use crate::domain::selection::{rebalance, select_top, PortfolioAction, DEFAULT_SELECTION_SIZE};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RotationStrategy {
    k: usize,
    flag: ChangeFlag,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_SIZE)
    }
}

impl RotationStrategy {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            flag: ChangeFlag::Idle,
        }
    }

    pub fn selection_size(&self) -> usize {
        self.k
    }

    pub fn on_securities_changed(&mut self, changes: SecurityChanges) {
        self.flag.notify(changes);
    }

    /// Rebalance against `snapshot` if the universe changed since the last
    /// rebalance; otherwise do nothing.
    pub fn on_data(&mut self, snapshot: &[(String, f64)], held: &[String]) -> Vec<PortfolioAction> {
        let Some(changes) = self.flag.take() else {
            return Vec::new();
        };

        let selection = select_top(snapshot, self.k);
        debug!(
            added = changes.added.len(),
            removed = changes.removed.len(),
            selected = selection.len(),
            "rebalancing after universe change"
        );
        rebalance(&selection, held, self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(prices: &[(&str, f64)]) -> Vec<(String, f64)> {
        prices.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn added(symbols: &[&str]) -> SecurityChanges {
        SecurityChanges {
            added: symbols.iter().map(|s| s.to_string()).collect(),
            removed: vec![],
        }
    }

    #[test]
    fn no_change_no_actions() {
        let mut strategy = RotationStrategy::default();
        let snap = snapshot(&[("A", 10.0)]);
        assert!(strategy.on_data(&snap, &[]).is_empty());
    }

    #[test]
    fn change_triggers_one_rebalance() {
        let mut strategy = RotationStrategy::new(2);
        strategy.on_securities_changed(added(&["A", "B", "C"]));

        let snap = snapshot(&[("A", 10.0), ("B", 30.0), ("C", 20.0)]);
        let held = vec!["A".to_string()];
        let actions = strategy.on_data(&snap, &held);

        let symbols: Vec<&str> = actions.iter().map(PortfolioAction::symbol).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
        assert!(matches!(actions[0], PortfolioAction::Liquidate { .. }));

        assert!(strategy.on_data(&snap, &held).is_empty());
    }

    #[test]
    fn empty_change_does_not_arm() {
        let mut strategy = RotationStrategy::default();
        strategy.on_securities_changed(SecurityChanges::none());
        let snap = snapshot(&[("A", 10.0)]);
        assert!(strategy.on_data(&snap, &[]).is_empty());
    }

    #[test]
    fn default_selection_size_is_ten() {
        assert_eq!(RotationStrategy::default().selection_size(), 10);
    }
}
