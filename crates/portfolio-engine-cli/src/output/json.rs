use serde_json::Value;

/// Pretty-print a computation envelope (or any other JSON value) to
/// stdout. The default output format; pipes cleanly into jq.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
