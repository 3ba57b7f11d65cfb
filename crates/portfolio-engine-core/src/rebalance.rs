//! Rebalance advisor: buy/sell actions that move current weights toward
//! a target weight vector.
//!
//! Drift within the dead zone (±0.001) produces no action, preventing
//! churn from rounding noise. Holdings above target emit a Sell only
//! when sales are allowed; with sales disabled they intentionally stay
//! overweight and no action is emitted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::classification::ClassificationRuleset;
use crate::portfolio::holdings::{Portfolio, Position};
use crate::types::{with_metadata, ComputationOutput, Money, REBALANCE_DEAD_ZONE};
use crate::PortfolioResult;

/// Direction of a rebalancing trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Buy,
    Sell,
}

/// A single rebalancing instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub ticker: String,
    pub kind: ActionKind,
    /// Trade size in currency, always positive.
    pub amount: Money,
}

/// Input for rebalance suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceInput {
    pub positions: Vec<Position>,
    /// Target weight per ticker; tickers absent here are treated as
    /// target 0.
    pub target_weights: BTreeMap<String, Decimal>,
    pub allow_sales: bool,
    #[serde(default)]
    pub ruleset: ClassificationRuleset,
}

/// Output of rebalance suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalancePlan {
    /// Buys first, then sells.
    pub actions: Vec<Action>,
    pub total_value: Money,
    pub total_buys: Money,
    pub total_sells: Money,
}

/// Compare current weights to target weights and emit trade actions.
pub fn suggest_rebalance(
    input: &RebalanceInput,
) -> PortfolioResult<ComputationOutput<RebalancePlan>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let portfolio = Portfolio::from_positions(&input.positions, &input.ruleset)?;
    let total_value = portfolio.total_value();

    let targets: BTreeMap<String, Decimal> = input
        .target_weights
        .iter()
        .map(|(t, w)| (t.trim().to_uppercase(), *w))
        .collect();

    let mut buys: Vec<Action> = Vec::new();
    let mut sells: Vec<Action> = Vec::new();

    for h in portfolio.holdings() {
        let target = targets.get(&h.ticker).copied().unwrap_or(Decimal::ZERO);
        let diff = target - h.current_weight;

        if diff > REBALANCE_DEAD_ZONE {
            buys.push(Action {
                ticker: h.ticker.clone(),
                kind: ActionKind::Buy,
                amount: diff * total_value,
            });
        } else if diff < -REBALANCE_DEAD_ZONE && input.allow_sales {
            sells.push(Action {
                ticker: h.ticker.clone(),
                kind: ActionKind::Sell,
                amount: diff.abs() * total_value,
            });
        }
        // Within the dead zone, or overweight with sales disabled: no action.
    }

    if !input.allow_sales {
        let overweight = portfolio
            .holdings()
            .iter()
            .filter(|h| {
                targets.get(&h.ticker).copied().unwrap_or(Decimal::ZERO) - h.current_weight
                    < -REBALANCE_DEAD_ZONE
            })
            .count();
        if overweight > 0 {
            warnings.push(format!(
                "{} holding(s) remain above target because sales are disabled",
                overweight
            ));
        }
    }

    let total_buys: Money = buys.iter().map(|a| a.amount).sum();
    let total_sells: Money = sells.iter().map(|a| a.amount).sum();

    let mut actions = buys;
    actions.extend(sells);

    let output = RebalancePlan {
        actions,
        total_value,
        total_buys,
        total_sells,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rebalance Suggestion (dead-zone threshold)",
        &serde_json::json!({
            "n_positions": input.positions.len(),
            "n_targets": input.target_weights.len(),
            "allow_sales": input.allow_sales,
            "dead_zone": REBALANCE_DEAD_ZONE.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn pos(ticker: &str, quantity: Decimal, price: Decimal) -> Position {
        Position {
            ticker: ticker.into(),
            quantity,
            unit_price: price,
        }
    }

    fn input(
        positions: Vec<Position>,
        targets: &[(&str, Decimal)],
        allow_sales: bool,
    ) -> RebalanceInput {
        RebalanceInput {
            positions,
            target_weights: targets
                .iter()
                .map(|(t, w)| (t.to_string(), *w))
                .collect(),
            allow_sales,
            ruleset: ClassificationRuleset::default(),
        }
    }

    fn fifty_fifty() -> Vec<Position> {
        vec![pos("A", dec!(100), dec!(10)), pos("B", dec!(50), dec!(20))]
    }

    // ------------------------------------------------------------------
    // 1. 70/30 target on a 50/50 portfolio with sales enabled
    // ------------------------------------------------------------------
    #[test]
    fn test_buy_and_sell_amounts() {
        let out = suggest_rebalance(&input(
            fifty_fifty(),
            &[("A", dec!(0.7)), ("B", dec!(0.3))],
            true,
        ))
        .unwrap();
        let plan = &out.result;

        assert_eq!(plan.total_value, dec!(2000));
        assert_eq!(plan.actions.len(), 2);

        let buy = &plan.actions[0];
        assert_eq!(buy.ticker, "A");
        assert_eq!(buy.kind, ActionKind::Buy);
        assert_eq!(buy.amount, dec!(400));

        let sell = &plan.actions[1];
        assert_eq!(sell.ticker, "B");
        assert_eq!(sell.kind, ActionKind::Sell);
        assert_eq!(sell.amount, dec!(400));
    }

    // ------------------------------------------------------------------
    // 2. Sales disabled: overweight holding stays put, warning raised
    // ------------------------------------------------------------------
    #[test]
    fn test_no_sales_suppresses_sells() {
        let out = suggest_rebalance(&input(
            fifty_fifty(),
            &[("A", dec!(0.7)), ("B", dec!(0.3))],
            false,
        ))
        .unwrap();
        let plan = &out.result;

        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].kind, ActionKind::Buy);
        assert_eq!(plan.total_sells, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("above target")));
    }

    // ------------------------------------------------------------------
    // 3. Dead zone: drift within ±0.001 emits nothing
    // ------------------------------------------------------------------
    #[test]
    fn test_dead_zone() {
        let out = suggest_rebalance(&input(
            fifty_fifty(),
            &[("A", dec!(0.5005)), ("B", dec!(0.4995))],
            true,
        ))
        .unwrap();
        assert!(out.result.actions.is_empty());
    }

    // ------------------------------------------------------------------
    // 4. Holding absent from targets is treated as target zero
    // ------------------------------------------------------------------
    #[test]
    fn test_missing_target_means_zero() {
        let out = suggest_rebalance(&input(fifty_fifty(), &[("A", dec!(1.0))], true)).unwrap();
        let plan = &out.result;

        let sell_b = plan
            .actions
            .iter()
            .find(|a| a.ticker == "B")
            .expect("B should be sold down to zero");
        assert_eq!(sell_b.kind, ActionKind::Sell);
        assert_eq!(sell_b.amount, dec!(1000));
    }

    // ------------------------------------------------------------------
    // 5. Buys come before sells in the action list
    // ------------------------------------------------------------------
    #[test]
    fn test_actions_grouped_by_kind() {
        let out = suggest_rebalance(&input(
            vec![
                pos("OVER", dec!(100), dec!(10)), // 1000 = 50%
                pos("UNDER", dec!(50), dec!(20)), // 1000 = 50%
            ],
            &[("OVER", dec!(0.2)), ("UNDER", dec!(0.8))],
            true,
        ))
        .unwrap();
        let kinds: Vec<ActionKind> = out.result.actions.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Buy, ActionKind::Sell]);
    }

    // ------------------------------------------------------------------
    // 6. Target tickers are matched case-insensitively
    // ------------------------------------------------------------------
    #[test]
    fn test_case_insensitive_targets() {
        let out = suggest_rebalance(&input(
            fifty_fifty(),
            &[("a", dec!(0.7)), ("b", dec!(0.3))],
            true,
        ))
        .unwrap();
        assert_eq!(out.result.actions.len(), 2);
    }

    // ------------------------------------------------------------------
    // 7. Zero-value portfolio produces no actions
    // ------------------------------------------------------------------
    #[test]
    fn test_zero_value_portfolio() {
        let out = suggest_rebalance(&input(
            vec![pos("A", dec!(0), dec!(10))],
            &[("A", dec!(1.0))],
            true,
        ))
        .unwrap();
        // Weight diff over a zero-value book sizes every trade at 0.
        for a in &out.result.actions {
            assert_eq!(a.amount, Decimal::ZERO);
        }
    }

    // ------------------------------------------------------------------
    // 8. Invalid positions propagate as errors
    // ------------------------------------------------------------------
    #[test]
    fn test_invalid_positions_error() {
        assert!(suggest_rebalance(&input(
            vec![pos("A", dec!(-1), dec!(10))],
            &[("A", dec!(1.0))],
            true,
        ))
        .is_err());
    }
}
