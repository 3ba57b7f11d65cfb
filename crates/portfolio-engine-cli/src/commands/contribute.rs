use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use portfolio_engine_core::classification::ClassificationRuleset;
use portfolio_engine_core::contribution::{allocate_contribution, ContributionInput};

use crate::input;

#[derive(Args)]
pub struct ContributeArgs {
    /// Portfolio file: CSV (`Ativo, Quantidade, PrecoUnitario`) or JSON
    #[arg(long)]
    pub input: Option<String>,
    /// JSON file mapping ticker to target weight
    #[arg(long)]
    pub targets: Option<String>,
    /// Contribution amount, must be positive
    #[arg(long)]
    pub amount: Option<Decimal>,
    /// Optional JSON file mapping ticker to valuation score
    #[arg(long)]
    pub scores: Option<String>,
    /// Custom classification ruleset (JSON or YAML)
    #[arg(long)]
    pub ruleset: Option<String>,
}

pub fn run_contribute(args: ContributeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let con_input: ContributionInput = match (&args.input, &args.targets, args.amount) {
        (Some(portfolio_path), Some(targets_path), Some(amount)) => {
            let ruleset = match args.ruleset {
                Some(ref path) => input::file::read_ruleset(path)?,
                None => ClassificationRuleset::default(),
            };
            let target_weights: BTreeMap<String, Decimal> =
                input::file::read_json(targets_path)?;
            let valuation_scores: Option<BTreeMap<String, Decimal>> = match args.scores {
                Some(ref path) => Some(input::file::read_json(path)?),
                None => None,
            };
            ContributionInput {
                positions: input::file::read_positions(portfolio_path)?,
                target_weights,
                contribution: amount,
                valuation_scores,
                ruleset,
            }
        }
        _ => {
            if let Some(data) = input::stdin::read_stdin()? {
                serde_json::from_value(data)?
            } else {
                return Err(
                    "--input, --targets and --amount, or a full JSON input on stdin, \
                     required for contribute"
                        .into(),
                );
            }
        }
    };

    let result = allocate_contribution(&con_input)?;
    Ok(serde_json::to_value(result)?)
}
