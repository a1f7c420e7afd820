//! Shared CLI helpers

use argus_core::Value;

/// Parse a JSON literal into a checker value. Arrays become tables
/// keyed `1..=n`, objects become string-keyed tables.
pub fn parse_value_literal(literal: &str) -> Result<Value, String> {
    let json: serde_json::Value =
        serde_json::from_str(literal).map_err(|err| err.to_string())?;
    Ok(Value::from(json))
}
