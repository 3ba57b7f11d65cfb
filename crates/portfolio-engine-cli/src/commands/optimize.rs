use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use portfolio_engine_core::optimization::{
    optimize_hrp, optimize_min_volatility, optimize_risk_parity, MinVolInput, ReturnSeries,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OptimizeMethod {
    /// Markowitz minimum-volatility weights
    MinVol,
    /// Hierarchical Risk Parity
    Hrp,
    /// Equal risk contribution
    RiskParity,
}

#[derive(Args)]
pub struct OptimizeArgs {
    /// Weighting strategy
    #[arg(long, value_enum)]
    pub method: OptimizeMethod,
    /// JSON file with the return series (`assets`, `returns`)
    #[arg(long)]
    pub input: Option<String>,
    /// Per-asset weight cap for min-vol, in (0, 1]
    #[arg(long)]
    pub max_weight: Option<Decimal>,
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series: ReturnSeries = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for optimization".into());
    };

    match args.method {
        OptimizeMethod::MinVol => {
            let mv_input = MinVolInput {
                series,
                max_weight: args.max_weight,
            };
            let result = optimize_min_volatility(&mv_input)?;
            Ok(serde_json::to_value(result)?)
        }
        OptimizeMethod::Hrp => {
            if args.max_weight.is_some() {
                return Err("--max-weight only applies to --method min-vol".into());
            }
            let result = optimize_hrp(&series)?;
            Ok(serde_json::to_value(result)?)
        }
        OptimizeMethod::RiskParity => {
            if args.max_weight.is_some() {
                return Err("--max-weight only applies to --method min-vol".into());
            }
            let result = optimize_risk_parity(&series)?;
            Ok(serde_json::to_value(result)?)
        }
    }
}
