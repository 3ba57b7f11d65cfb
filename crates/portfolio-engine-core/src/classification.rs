//! Ticker to asset-class mapping.
//!
//! Classification is pattern-based for exchange-listed tickers (B3
//! conventions: "MXRF11" is a real-estate fund, "ITUB3" common stock,
//! "BPAC11" a unit) and set-based for fixed-income and foreign symbols.
//! The symbol sets are injectable configuration so they can be updated
//! without recompiling.

use serde::{Deserialize, Serialize};

/// Asset class of a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Real-estate investment fund (FII)
    Fii,
    /// Common/preferred stock
    Equity,
    /// Share unit (bundled certificate)
    EquityUnit,
    FixedIncome,
    Foreign,
    Other,
}

impl AssetClass {
    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::Fii => "FII",
            AssetClass::Equity => "Equity",
            AssetClass::EquityUnit => "Equity (Units)",
            AssetClass::FixedIncome => "Fixed Income",
            AssetClass::Foreign => "Foreign",
            AssetClass::Other => "Other",
        }
    }
}

/// Symbol sets consulted after the pattern rules fail to match.
///
/// Defaults cover the common Brazilian fixed-income instruments and the
/// foreign ETFs the engine was originally deployed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRuleset {
    pub fixed_income_symbols: Vec<String>,
    pub foreign_symbols: Vec<String>,
}

impl Default for ClassificationRuleset {
    fn default() -> Self {
        ClassificationRuleset {
            fixed_income_symbols: ["LCA", "LFT", "LTN", "DEBENTURES"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            foreign_symbols: ["IVV", "QQQM", "QUAL", "XLRE"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ClassificationRuleset {
    /// Build a ruleset from custom symbol sets. Symbols are stored
    /// upper-cased so lookups are case-insensitive.
    pub fn new(fixed_income: &[&str], foreign: &[&str]) -> Self {
        ClassificationRuleset {
            fixed_income_symbols: fixed_income.iter().map(|s| s.to_uppercase()).collect(),
            foreign_symbols: foreign.iter().map(|s| s.to_uppercase()).collect(),
        }
    }

    fn is_fixed_income(&self, ticker: &str) -> bool {
        self.fixed_income_symbols.iter().any(|s| s == ticker)
    }

    fn is_foreign(&self, ticker: &str) -> bool {
        self.foreign_symbols.iter().any(|s| s == ticker)
    }
}

/// Classify a ticker. Case-insensitive, first matching rule wins:
///
/// 1. 5-6 chars, contains a digit, ends in "F11" → FII
/// 2. 5 chars, contains a digit, ends in "3"     → Equity
/// 3. 6 chars, contains a digit, ends in "11"    → Equity unit
/// 4. member of the fixed-income symbol set      → Fixed income
/// 5. member of the foreign symbol set           → Foreign
/// 6. anything else                              → Other
///
/// The FII rule runs before the unit rule: a 6-char "F11" suffix
/// ("MXRF11") is a real-estate fund, never a unit.
pub fn classify(ticker: &str, ruleset: &ClassificationRuleset) -> AssetClass {
    let ticker = ticker.trim().to_uppercase();
    let has_digit = ticker.chars().any(|c| c.is_ascii_digit());
    let len = ticker.len();

    if has_digit && (len == 5 || len == 6) && ticker.ends_with("F11") {
        AssetClass::Fii
    } else if has_digit && len == 5 && ticker.ends_with('3') {
        AssetClass::Equity
    } else if has_digit && len == 6 && ticker.ends_with("11") {
        AssetClass::EquityUnit
    } else if ruleset.is_fixed_income(&ticker) {
        AssetClass::FixedIncome
    } else if ruleset.is_foreign(&ticker) {
        AssetClass::Foreign
    } else {
        AssetClass::Other
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules() -> ClassificationRuleset {
        ClassificationRuleset::default()
    }

    // ------------------------------------------------------------------
    // 1. FII pattern
    // ------------------------------------------------------------------
    #[test]
    fn test_fii_pattern() {
        assert_eq!(classify("MXRF11", &rules()), AssetClass::Fii);
        assert_eq!(classify("VGHF11", &rules()), AssetClass::Fii);
    }

    // ------------------------------------------------------------------
    // 2. Equity pattern
    // ------------------------------------------------------------------
    #[test]
    fn test_equity_pattern() {
        assert_eq!(classify("ITUB3", &rules()), AssetClass::Equity);
        assert_eq!(classify("WEGE3", &rules()), AssetClass::Equity);
    }

    // ------------------------------------------------------------------
    // 3. Unit pattern
    // ------------------------------------------------------------------
    #[test]
    fn test_unit_pattern() {
        assert_eq!(classify("BPAC11", &rules()), AssetClass::EquityUnit);
        assert_eq!(classify("TAEE11", &rules()), AssetClass::EquityUnit);
    }

    // ------------------------------------------------------------------
    // 4. Fixed-income symbol set
    // ------------------------------------------------------------------
    #[test]
    fn test_fixed_income_set() {
        assert_eq!(classify("LFT", &rules()), AssetClass::FixedIncome);
        assert_eq!(classify("DEBENTURES", &rules()), AssetClass::FixedIncome);
    }

    // ------------------------------------------------------------------
    // 5. Foreign symbol set
    // ------------------------------------------------------------------
    #[test]
    fn test_foreign_set() {
        assert_eq!(classify("IVV", &rules()), AssetClass::Foreign);
        assert_eq!(classify("QQQM", &rules()), AssetClass::Foreign);
    }

    // ------------------------------------------------------------------
    // 6. Unmatched tickers fall through to Other
    // ------------------------------------------------------------------
    #[test]
    fn test_other_fallthrough() {
        assert_eq!(classify("XYZ9", &rules()), AssetClass::Other);
        assert_eq!(classify("BTC", &rules()), AssetClass::Other);
    }

    // ------------------------------------------------------------------
    // 7. Case-insensitive and whitespace-tolerant
    // ------------------------------------------------------------------
    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("mxrf11", &rules()), AssetClass::Fii);
        assert_eq!(classify(" itub3 ", &rules()), AssetClass::Equity);
        assert_eq!(classify("lft", &rules()), AssetClass::FixedIncome);
    }

    // ------------------------------------------------------------------
    // 8. FII rule wins over unit rule ordering
    // ------------------------------------------------------------------
    #[test]
    fn test_rule_order() {
        // "XPF11" is 5 chars ending in F11: FII, never equity or unit.
        assert_eq!(classify("XPF11", &rules()), AssetClass::Fii);
        // 6-char F11 tickers hit the FII rule before the unit rule.
        assert_eq!(classify("MXRF11", &rules()), AssetClass::Fii);
        // A 6-char "11" suffix without the F stays a unit.
        assert_eq!(classify("BPAC11", &rules()), AssetClass::EquityUnit);
        // A 5-char ticker ending in 3 never reaches the symbol sets.
        assert_eq!(classify("ABCD3", &rules()), AssetClass::Equity);
    }

    // ------------------------------------------------------------------
    // 9. Pattern rules require a digit in the ticker
    // ------------------------------------------------------------------
    #[test]
    fn test_pattern_requires_digit() {
        // Five letters, no digit: not an equity even though it "ends" oddly.
        assert_eq!(classify("ABCDE", &rules()), AssetClass::Other);
    }

    // ------------------------------------------------------------------
    // 10. Custom ruleset overrides the defaults
    // ------------------------------------------------------------------
    #[test]
    fn test_custom_ruleset() {
        let custom = ClassificationRuleset::new(&["cdb"], &["VOO"]);
        assert_eq!(classify("CDB", &custom), AssetClass::FixedIncome);
        assert_eq!(classify("VOO", &custom), AssetClass::Foreign);
        // Default members are gone in the custom set.
        assert_eq!(classify("LFT", &custom), AssetClass::Other);
    }

    // ------------------------------------------------------------------
    // 11. Determinism
    // ------------------------------------------------------------------
    #[test]
    fn test_deterministic() {
        let r = rules();
        for _ in 0..3 {
            assert_eq!(classify("MXRF11", &r), AssetClass::Fii);
        }
    }

    // ------------------------------------------------------------------
    // 12. Ruleset serde round-trip
    // ------------------------------------------------------------------
    #[test]
    fn test_ruleset_serde() {
        let r = rules();
        let json = serde_json::to_string(&r).unwrap();
        let back: ClassificationRuleset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fixed_income_symbols, r.fixed_income_symbols);
        assert_eq!(back.foreign_symbols, r.foreign_symbols);
    }
}
