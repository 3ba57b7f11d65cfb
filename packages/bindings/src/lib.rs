use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use portfolio_engine_core::classification::{classify, ClassificationRuleset};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ClassifyRequest {
    tickers: Vec<String>,
    #[serde(default)]
    ruleset: ClassificationRuleset,
}

#[napi]
pub fn classify_portfolio(input_json: String) -> NapiResult<String> {
    let input: ClassifyRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let classified: Vec<serde_json::Value> = input
        .tickers
        .iter()
        .map(|t| {
            serde_json::json!({
                "ticker": t.trim().to_uppercase(),
                "asset_class": classify(t, &input.ruleset),
            })
        })
        .collect();
    serde_json::to_string(&classified).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn current_allocation(input_json: String) -> NapiResult<String> {
    let input: portfolio_engine_core::portfolio::AllocationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        portfolio_engine_core::portfolio::current_allocation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

#[napi]
pub fn optimize_min_volatility(input_json: String) -> NapiResult<String> {
    let input: portfolio_engine_core::optimization::MinVolInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = portfolio_engine_core::optimization::optimize_min_volatility(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimize_hrp(input_json: String) -> NapiResult<String> {
    let series: portfolio_engine_core::optimization::ReturnSeries =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        portfolio_engine_core::optimization::optimize_hrp(&series).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimize_risk_parity(input_json: String) -> NapiResult<String> {
    let series: portfolio_engine_core::optimization::ReturnSeries =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = portfolio_engine_core::optimization::optimize_risk_parity(&series)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Macro scenario
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MacroRequest {
    scenario: String,
}

#[napi]
pub fn macro_targets(input_json: String) -> NapiResult<String> {
    let input: MacroRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let scenario =
        portfolio_engine_core::macro_scenario::MacroScenario::from_label(&input.scenario);
    let targets = portfolio_engine_core::macro_scenario::macro_targets(scenario);
    serde_json::to_string(&serde_json::json!({
        "scenario": scenario,
        "targets": targets,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[napi]
pub fn suggest_rebalance(input_json: String) -> NapiResult<String> {
    let input: portfolio_engine_core::rebalance::RebalanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        portfolio_engine_core::rebalance::suggest_rebalance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn allocate_contribution(input_json: String) -> NapiResult<String> {
    let input: portfolio_engine_core::contribution::ContributionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = portfolio_engine_core::contribution::allocate_contribution(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
