use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use portfolio_engine_core::classification::ClassificationRuleset;
use portfolio_engine_core::rebalance::{suggest_rebalance, RebalanceInput};

use crate::input;

#[derive(Args)]
pub struct RebalanceArgs {
    /// Portfolio file: CSV (`Ativo, Quantidade, PrecoUnitario`) or JSON
    #[arg(long)]
    pub input: Option<String>,
    /// JSON file mapping ticker to target weight
    #[arg(long)]
    pub targets: Option<String>,
    /// Allow sell actions for overweight holdings
    #[arg(long)]
    pub allow_sales: bool,
    /// Custom classification ruleset (JSON or YAML)
    #[arg(long)]
    pub ruleset: Option<String>,
}

pub fn run_rebalance(args: RebalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let reb_input: RebalanceInput = match (&args.input, &args.targets) {
        (Some(portfolio_path), Some(targets_path)) => {
            let ruleset = match args.ruleset {
                Some(ref path) => input::file::read_ruleset(path)?,
                None => ClassificationRuleset::default(),
            };
            let target_weights: BTreeMap<String, Decimal> =
                input::file::read_json(targets_path)?;
            RebalanceInput {
                positions: input::file::read_positions(portfolio_path)?,
                target_weights,
                allow_sales: args.allow_sales,
                ruleset,
            }
        }
        _ => {
            if let Some(data) = input::stdin::read_stdin()? {
                serde_json::from_value(data)?
            } else {
                return Err(
                    "--input and --targets files, or a full JSON input on stdin, \
                     required for rebalance"
                        .into(),
                );
            }
        }
    };

    let result = suggest_rebalance(&reb_input)?;
    Ok(serde_json::to_value(result)?)
}
