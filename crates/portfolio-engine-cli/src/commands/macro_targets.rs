use clap::Args;
use serde_json::Value;

use portfolio_engine_core::macro_scenario::{macro_targets, MacroScenario};

#[derive(Args)]
pub struct MacroTargetsArgs {
    /// Scenario label (expansionary, neutral, restrictive; lenient,
    /// unknown labels map to neutral)
    #[arg(long, default_value = "neutral")]
    pub scenario: String,
}

pub fn run_macro_targets(args: MacroTargetsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = MacroScenario::from_label(&args.scenario);
    let targets = macro_targets(scenario);
    Ok(serde_json::json!({
        "scenario": scenario,
        "targets": targets,
    }))
}
