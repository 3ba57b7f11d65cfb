//! Current-allocation computation: the engine operation behind the
//! "Carteira Atual" table — classified holdings with market values,
//! per-asset weights, and a per-class breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::classification::{AssetClass, ClassificationRuleset};
use crate::portfolio::holdings::{Holding, Portfolio, Position};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::PortfolioResult;

/// Input for current-allocation computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    /// Raw portfolio rows (ticker, quantity, unit price).
    pub positions: Vec<Position>,
    /// Classification symbol sets; defaults apply when omitted.
    #[serde(default)]
    pub ruleset: ClassificationRuleset,
}

/// Aggregate weight of one asset class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassAllocation {
    pub asset_class: AssetClass,
    pub market_value: Money,
    pub weight: Decimal,
}

/// Output of current-allocation computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutput {
    pub holdings: Vec<Holding>,
    pub total_value: Money,
    pub class_allocation: Vec<ClassAllocation>,
}

/// Classify and value a raw portfolio table.
///
/// Zero-quantity or zero-price rows are kept in the table (weight 0) but
/// flagged, since they carry no information for return-based optimizers.
pub fn current_allocation(
    input: &AllocationInput,
) -> PortfolioResult<ComputationOutput<AllocationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let portfolio = Portfolio::from_positions(&input.positions, &input.ruleset)?;

    for h in portfolio.holdings() {
        if h.market_value.is_zero() {
            warnings.push(format!(
                "{} has zero market value and is excluded from optimization input",
                h.ticker
            ));
        }
    }

    let total = portfolio.total_value();
    if total.is_zero() && !portfolio.is_empty() {
        warnings.push("Portfolio total value is zero; all weights set to 0".into());
    }

    let output = AllocationOutput {
        class_allocation: class_allocation(&portfolio),
        total_value: total,
        holdings: portfolio.holdings().to_vec(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Current Allocation (market value weights)",
        &serde_json::json!({
            "n_positions": input.positions.len(),
            "fixed_income_symbols": input.ruleset.fixed_income_symbols.len(),
            "foreign_symbols": input.ruleset.foreign_symbols.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Aggregate current weights by asset class, in class order.
pub fn class_allocation(portfolio: &Portfolio) -> Vec<ClassAllocation> {
    let mut by_class: BTreeMap<AssetClass, (Money, Decimal)> = BTreeMap::new();
    for h in portfolio.holdings() {
        let entry = by_class
            .entry(h.asset_class)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += h.market_value;
        entry.1 += h.current_weight;
    }
    by_class
        .into_iter()
        .map(|(asset_class, (market_value, weight))| ClassAllocation {
            asset_class,
            market_value,
            weight,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
