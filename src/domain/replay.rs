//! Day-by-day universe replay.
//!
//! Drives a [`UniverseResolver`] the way a host scheduler does: one query per
//! calendar day at midnight, diffing each resolved universe against the
//! current one and handing membership changes to a [`RotationStrategy`].

use crate::domain::changes::SecurityChanges;
use crate::domain::error::FeedError;
use crate::domain::rotation::RotationStrategy;
use crate::domain::selection::{PortfolioAction, DEFAULT_SELECTION_SIZE};
use crate::domain::universe::{UniverseResolver, UniverseResult};
use crate::ports::feed_port::FeedPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub selection_size: usize,
}

impl ReplayConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            selection_size: DEFAULT_SELECTION_SIZE,
        }
    }
}

/// A day on which the universe changed or the portfolio was rebalanced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayDay {
    pub date: NaiveDate,
    pub changes: SecurityChanges,
    pub actions: Vec<PortfolioAction>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub days: Vec<ReplayDay>,
    pub resolved_days: usize,
    pub unchanged_days: usize,
    pub universe: Vec<String>,
    pub held: Vec<String>,
}

/// Replay `[start_date, end_date]` inclusive.
///
/// Without a price source only membership changes are recorded. Any feed or
/// price error aborts the replay.
pub fn run_replay<F: FeedPort>(
    resolver: &mut UniverseResolver<F>,
    prices: Option<&dyn PricePort>,
    config: &ReplayConfig,
) -> Result<ReplayReport, FeedError> {
    let mut strategy = RotationStrategy::new(config.selection_size);
    let mut report = ReplayReport::default();

    for date in config.start_date.iter_days().take_while(|d| *d <= config.end_date) {
        let mut changes = SecurityChanges::none();

        match resolver.resolve_for_date(date)? {
            UniverseResult::Symbols(symbols) => {
                report.resolved_days += 1;
                changes = SecurityChanges::between(&report.universe, &symbols);
                if !changes.is_empty() {
                    debug!(
                        %date,
                        added = changes.added.len(),
                        removed = changes.removed.len(),
                        "universe changed"
                    );
                    strategy.on_securities_changed(changes.clone());
                    report.universe = symbols;
                }
            }
            UniverseResult::Unchanged => report.unchanged_days += 1,
        }

        let actions = match prices {
            Some(port) => {
                let snapshot = port.close_prices(&report.universe, date)?;
                let actions = strategy.on_data(&snapshot, &report.held);
                apply_actions(&mut report.held, &actions);
                actions
            }
            None => Vec::new(),
        };

        if !changes.is_empty() || !actions.is_empty() {
            report.days.push(ReplayDay {
                date,
                changes,
                actions,
            });
        }
    }

    info!(
        selection_size = strategy.selection_size(),
        resolved = report.resolved_days,
        unchanged = report.unchanged_days,
        change_days = report.days.len(),
        "replay finished"
    );
    Ok(report)
}

fn apply_actions(held: &mut Vec<String>, actions: &[PortfolioAction]) {
    for action in actions {
        match action {
            PortfolioAction::Liquidate { symbol } => held.retain(|s| s != symbol),
            PortfolioAction::SetHoldings { symbol, .. } => {
                if !held.contains(symbol) {
                    held.push(symbol.clone());
                }
            }
        }
    }
}
