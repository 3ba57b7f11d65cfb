use clap::Args;
use serde_json::{json, Value};

use portfolio_engine_core::classification::{classify, ClassificationRuleset};

use crate::input;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Tickers to classify
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,
    /// JSON file holding an array of tickers
    #[arg(long)]
    pub input: Option<String>,
    /// Custom classification ruleset (JSON or YAML)
    #[arg(long)]
    pub ruleset: Option<String>,
}

pub fn run_classify(args: ClassifyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ruleset = match args.ruleset {
        Some(ref path) => input::file::read_ruleset(path)?,
        None => ClassificationRuleset::default(),
    };

    let tickers: Vec<String> = if !args.tickers.is_empty() {
        args.tickers
    } else if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--tickers, --input <file.json>, or stdin required for classify".into());
    };

    let classified: Vec<Value> = tickers
        .iter()
        .map(|t| {
            json!({
                "ticker": t.trim().to_uppercase(),
                "asset_class": classify(t, &ruleset),
            })
        })
        .collect();
    Ok(Value::Array(classified))
}
