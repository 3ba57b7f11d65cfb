use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use portfolio_engine_core::classification::ClassificationRuleset;
use portfolio_engine_core::portfolio::Position;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// One row of the portfolio CSV export. Portuguese headers are the
/// canonical form; English aliases are accepted.
#[derive(Deserialize)]
struct PositionRow {
    #[serde(rename = "Ativo", alias = "ticker")]
    ticker: String,
    #[serde(rename = "Quantidade", alias = "quantity")]
    quantity: Decimal,
    #[serde(rename = "PrecoUnitario", alias = "unit_price")]
    unit_price: Decimal,
}

/// Read portfolio positions from a file. `.csv` files use the
/// `Ativo, Quantidade, PrecoUnitario` header; anything else is parsed
/// as a JSON array of positions.
pub fn read_positions(path: &str) -> Result<Vec<Position>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    if canonical
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
    {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&canonical)
            .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
        let mut positions = Vec::new();
        for record in reader.deserialize::<PositionRow>() {
            let row =
                record.map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
            positions.push(Position {
                ticker: row.ticker,
                quantity: row.quantity,
                unit_price: row.unit_price,
            });
        }
        Ok(positions)
    } else {
        read_json(path)
    }
}

/// Read a classification ruleset from a JSON or YAML file, selected by
/// extension.
pub fn read_ruleset(path: &str) -> Result<ClassificationRuleset, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let is_yaml = canonical
        .extension()
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);
    let ruleset: ClassificationRuleset = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(ruleset)
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    // Basic existence check
    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
