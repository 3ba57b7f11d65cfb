use clap::Args;
use serde_json::Value;

use portfolio_engine_core::classification::ClassificationRuleset;
use portfolio_engine_core::portfolio::{current_allocation, AllocationInput};

use crate::input;

#[derive(Args)]
pub struct AllocationArgs {
    /// Portfolio file: CSV (`Ativo, Quantidade, PrecoUnitario`) or JSON
    #[arg(long)]
    pub input: Option<String>,
    /// Custom classification ruleset (JSON or YAML)
    #[arg(long)]
    pub ruleset: Option<String>,
}

pub fn run_allocation(args: AllocationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ruleset = match args.ruleset {
        Some(ref path) => input::file::read_ruleset(path)?,
        None => ClassificationRuleset::default(),
    };

    let alloc_input: AllocationInput = if let Some(ref path) = args.input {
        AllocationInput {
            positions: input::file::read_positions(path)?,
            ruleset,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.csv|file.json> or stdin required for allocation".into());
    };

    let result = current_allocation(&alloc_input)?;
    Ok(serde_json::to_value(result)?)
}
