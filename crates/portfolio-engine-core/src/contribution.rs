//! Contribution allocator: waterfall distribution of a new cash inflow
//! across under-weighted assets.
//!
//! Each ticker's ideal value is its target weight applied to the
//! post-contribution total; the gap to its current value is its deficit.
//! Deficit-positive tickers are ranked (valuation score descending when
//! scores are supplied, ticker ascending otherwise) and the contribution
//! is poured down the list until it runs out. Capital that exceeds the
//! aggregate deficit is reported as unallocated, never silently dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::classification::ClassificationRuleset;
use crate::error::PortfolioError;
use crate::portfolio::holdings::{Portfolio, Position};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::PortfolioResult;

/// Input for contribution allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionInput {
    pub positions: Vec<Position>,
    /// Target weight per ticker; the union of these tickers and the
    /// portfolio's is considered, missing side treated as 0.
    pub target_weights: BTreeMap<String, Decimal>,
    /// New cash inflow; must be strictly positive.
    pub contribution: Money,
    /// Optional valuation scores, higher = more undervalued = allocated
    /// first. Tickers without a score rank below scored ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation_scores: Option<BTreeMap<String, Decimal>>,
    #[serde(default)]
    pub ruleset: ClassificationRuleset,
}

/// One allocation of contribution capital to a ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSuggestion {
    pub ticker: String,
    pub amount_allocated: Money,
}

/// Output of contribution allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionPlan {
    pub suggestions: Vec<AllocationSuggestion>,
    pub total_allocated: Money,
    /// Contribution capital left over after every deficit is met.
    pub unallocated: Money,
}

/// Distribute a new contribution across under-weighted tickers.
pub fn allocate_contribution(
    input: &ContributionInput,
) -> PortfolioResult<ComputationOutput<ContributionPlan>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.contribution <= Decimal::ZERO {
        return Err(PortfolioError::InvalidInput {
            field: "contribution".into(),
            reason: format!("Must be positive, got {}", input.contribution),
        });
    }

    let portfolio = Portfolio::from_positions(&input.positions, &input.ruleset)?;
    let total_after = portfolio.total_value() + input.contribution;

    let targets: BTreeMap<String, Decimal> = input
        .target_weights
        .iter()
        .map(|(t, w)| (t.trim().to_uppercase(), *w))
        .collect();
    let scores: BTreeMap<String, Decimal> = input
        .valuation_scores
        .as_ref()
        .map(|s| {
            s.iter()
                .map(|(t, v)| (t.trim().to_uppercase(), *v))
                .collect()
        })
        .unwrap_or_default();

    // Outer union of portfolio and target tickers; BTreeMap keeps the
    // walk deterministic (ascending ticker) before any score ranking.
    let mut deficits: BTreeMap<String, Money> = BTreeMap::new();
    for h in portfolio.holdings() {
        let target = targets.get(&h.ticker).copied().unwrap_or(Decimal::ZERO);
        let deficit = target * total_after - h.market_value;
        if deficit > Decimal::ZERO {
            deficits.insert(h.ticker.clone(), deficit);
        }
    }
    for (ticker, target) in &targets {
        if portfolio.holdings().iter().any(|h| &h.ticker == ticker) {
            continue;
        }
        let deficit = *target * total_after;
        if deficit > Decimal::ZERO {
            deficits.insert(ticker.clone(), deficit);
        }
    }

    let mut ranked: Vec<(String, Money)> = deficits.into_iter().collect();
    if !scores.is_empty() {
        // Stable sort preserves the ascending-ticker order among ties.
        ranked.sort_by(|a, b| {
            let sa = scores.get(&a.0).copied().unwrap_or(Decimal::ZERO);
            let sb = scores.get(&b.0).copied().unwrap_or(Decimal::ZERO);
            sb.cmp(&sa)
        });
    }

    let mut suggestions: Vec<AllocationSuggestion> = Vec::new();
    let mut remaining = input.contribution;
    for (ticker, deficit) in ranked {
        if remaining <= Decimal::ZERO {
            break;
        }
        let amount = if remaining < deficit { remaining } else { deficit };
        remaining -= amount;
        suggestions.push(AllocationSuggestion {
            ticker,
            amount_allocated: amount,
        });
    }

    let total_allocated = input.contribution - remaining;
    if remaining > Decimal::ZERO {
        warnings.push(format!(
            "Aggregate deficit below contribution; {} left unallocated",
            remaining
        ));
    }

    let output = ContributionPlan {
        suggestions,
        total_allocated,
        unallocated: remaining,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Contribution Waterfall Allocation",
        &serde_json::json!({
            "n_positions": input.positions.len(),
            "n_targets": input.target_weights.len(),
            "contribution": input.contribution.to_string(),
            "score_ranked": input.valuation_scores.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
