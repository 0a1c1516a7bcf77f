//! Top-K price ranking and equal-weight rebalancing.

use std::cmp::Ordering;

/// Number of symbols held after each rebalance.
pub const DEFAULT_SELECTION_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioAction {
    SetHoldings { symbol: String, weight: f64 },
    Liquidate { symbol: String },
}

impl PortfolioAction {
    pub fn symbol(&self) -> &str {
        match self {
            PortfolioAction::SetHoldings { symbol, .. } | PortfolioAction::Liquidate { symbol } => {
                symbol
            }
        }
    }
}

/// The `k` highest-priced symbols in `snapshot`, highest first.
///
/// Equal prices keep snapshot order. NaN prices rank below every number.
pub fn select_top(snapshot: &[(String, f64)], k: usize) -> Vec<String> {
    let mut ranked: Vec<&(String, f64)> = snapshot.iter().collect();
    ranked.sort_by(|a, b| compare_desc(a.1, b.1));
    ranked
        .into_iter()
        .take(k)
        .map(|(symbol, _)| symbol.clone())
        .collect()
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Actions moving `held` to an equal-weight book of `selection`.
///
/// Each selected symbol targets `1/k` of the portfolio, even when fewer than
/// `k` were selected. Liquidations come first, in `held` order.
pub fn rebalance(selection: &[String], held: &[String], k: usize) -> Vec<PortfolioAction> {
    let weight = if k == 0 { 0.0 } else { 1.0 / k as f64 };

    let liquidations = held
        .iter()
        .filter(|symbol| !selection.contains(*symbol))
        .map(|symbol| PortfolioAction::Liquidate {
            symbol: symbol.clone(),
        });
    let targets = selection.iter().map(|symbol| PortfolioAction::SetHoldings {
        symbol: symbol.clone(),
        weight,
    });

    liquidations.chain(targets).collect()
}
