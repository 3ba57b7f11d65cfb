//! Macro-scenario heuristic allocator.
//!
//! Maps a discrete macroeconomic scenario to a fixed target allocation
//! across asset classes. The table is deliberately coarse; it exists to
//! give the rebalance and contribution engines a class-level target when
//! no return history is available.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::classification::AssetClass;

/// Macroeconomic scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroScenario {
    Expansionary,
    #[default]
    Neutral,
    Restrictive,
}

impl MacroScenario {
    /// Lenient label parser. Unrecognized input maps to Neutral rather
    /// than erroring; both English and Portuguese labels are accepted.
    pub fn from_label(label: &str) -> MacroScenario {
        match label.trim().to_lowercase().as_str() {
            "expansionary" | "expansion" | "expansionista" => MacroScenario::Expansionary,
            "restrictive" | "restritivo" => MacroScenario::Restrictive,
            _ => MacroScenario::Neutral,
        }
    }
}

/// Target weight for one asset class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTarget {
    pub asset_class: AssetClass,
    pub weight: Decimal,
}

/// Fixed class-level target allocation per scenario. Each row sums to
/// exactly 1.
pub fn macro_targets(scenario: MacroScenario) -> Vec<ClassTarget> {
    let (equity, fii, foreign, fixed_income) = match scenario {
        MacroScenario::Expansionary => (dec!(0.60), dec!(0.20), dec!(0.15), dec!(0.05)),
        MacroScenario::Neutral => (dec!(0.40), dec!(0.25), dec!(0.20), dec!(0.15)),
        MacroScenario::Restrictive => (dec!(0.20), dec!(0.15), dec!(0.25), dec!(0.40)),
    };
    vec![
        ClassTarget {
            asset_class: AssetClass::Equity,
            weight: equity,
        },
        ClassTarget {
            asset_class: AssetClass::Fii,
            weight: fii,
        },
        ClassTarget {
            asset_class: AssetClass::Foreign,
            weight: foreign,
        },
        ClassTarget {
            asset_class: AssetClass::FixedIncome,
            weight: fixed_income,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
