//! Portfolio value types.
//!
//! A `Portfolio` is an ordered collection of holdings, unique by ticker.
//! Market value and current weight are derived fields, recomputed from
//! quantity × price whenever the collection is built; they are never
//! caller-supplied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classification::{classify, AssetClass, ClassificationRuleset};
use crate::error::PortfolioError;
use crate::types::Money;
use crate::PortfolioResult;

/// A raw portfolio row as entered or uploaded by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub quantity: Decimal,
    pub unit_price: Money,
}

/// A classified, valued portfolio row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub asset_class: AssetClass,
    /// quantity × unit_price
    pub market_value: Money,
    /// market_value / portfolio total (0 when the total is 0)
    pub current_weight: Decimal,
}

/// Ordered collection of holdings, unique by ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    /// Build a portfolio from raw positions, classifying each ticker and
    /// computing market values and current weights.
    ///
    /// Tickers are normalized to upper case. Duplicate tickers and
    /// negative quantities or prices are rejected; merging duplicates is
    /// the caller's explicit decision, never done silently here.
    pub fn from_positions(
        positions: &[Position],
        ruleset: &ClassificationRuleset,
    ) -> PortfolioResult<Portfolio> {
        let mut holdings: Vec<Holding> = Vec::with_capacity(positions.len());

        for (i, pos) in positions.iter().enumerate() {
            let ticker = pos.ticker.trim().to_uppercase();
            if ticker.is_empty() {
                return Err(PortfolioError::InvalidInput {
                    field: format!("positions[{}].ticker", i),
                    reason: "Ticker must not be empty".into(),
                });
            }
            if pos.quantity < Decimal::ZERO {
                return Err(PortfolioError::InvalidInput {
                    field: format!("positions[{}].quantity", i),
                    reason: format!("Quantity must be non-negative, got {}", pos.quantity),
                });
            }
            if pos.unit_price < Decimal::ZERO {
                return Err(PortfolioError::InvalidInput {
                    field: format!("positions[{}].unit_price", i),
                    reason: format!("Unit price must be non-negative, got {}", pos.unit_price),
                });
            }
            if holdings.iter().any(|h| h.ticker == ticker) {
                return Err(PortfolioError::InvalidInput {
                    field: format!("positions[{}].ticker", i),
                    reason: format!("Duplicate ticker '{}'", ticker),
                });
            }

            holdings.push(Holding {
                asset_class: classify(&ticker, ruleset),
                ticker,
                quantity: pos.quantity,
                unit_price: pos.unit_price,
                market_value: pos.quantity * pos.unit_price,
                current_weight: Decimal::ZERO,
            });
        }

        let mut portfolio = Portfolio { holdings };
        portfolio.recompute_weights();
        Ok(portfolio)
    }

    /// Recompute market values and current weights from quantity × price.
    /// Idempotent; a zero-value portfolio gets all-zero weights.
    pub fn with_current_allocation(mut self) -> Portfolio {
        self.recompute_weights();
        self
    }

    fn recompute_weights(&mut self) {
        for h in &mut self.holdings {
            h.market_value = h.quantity * h.unit_price;
        }
        let total = self.total_value();
        for h in &mut self.holdings {
            h.current_weight = if total.is_zero() {
                Decimal::ZERO
            } else {
                h.market_value / total
            };
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn total_value(&self) -> Money {
        self.holdings.iter().map(|h| h.market_value).sum()
    }

    /// Market value of a ticker, zero when not held.
    pub fn value_of(&self, ticker: &str) -> Money {
        let ticker = ticker.trim().to_uppercase();
        self.holdings
            .iter()
            .find(|h| h.ticker == ticker)
            .map(|h| h.market_value)
            .unwrap_or(Decimal::ZERO)
    }

    /// Tickers eligible as optimization input: quantity and price both
    /// strictly positive. Zero rows stay in the value table but carry no
    /// information for a return-based optimizer.
    pub fn optimizable_tickers(&self) -> Vec<String> {
        self.holdings
            .iter()
            .filter(|h| h.quantity > Decimal::ZERO && h.unit_price > Decimal::ZERO)
            .map(|h| h.ticker.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
