use std::any::type_name;

use super::CoercionRule;
use crate::cell::CellContext;
use crate::error::Result;

/// Render a number the way spreadsheet tooling prints doubles
///
/// Shortest round-trip digits with a trailing `.0` on integral values. Magnitudes
/// below `1e-3` or from `1e7` up use an `E` exponent (`1.0E16`, `2.5E-7`).
pub fn number_to_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        return if text.contains('.') { text } else { format!("{text}.0") };
    }

    let text = format!("{value:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => text,
    }
}

/// Strings from any cell kind: numbers and booleans are rendered as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringRule;

impl CoercionRule for StringRule {
    type Output = String;

    fn type_name(&self) -> &str {
        type_name::<String>()
    }

    fn parse_from_numeric(&self, value: f64, _cell: &CellContext) -> Result<Option<String>> {
        Ok(Some(number_to_text(value)))
    }

    fn parse_from_boolean(&self, value: bool, _cell: &CellContext) -> Result<Option<String>> {
        Ok(Some(value.to_string()))
    }

    fn parse_from_text(&self, value: &str, _cell: &CellContext) -> Result<Option<String>> {
        Ok(Some(value.to_string()))
    }

    fn is_blank_formula_result(&self, value: &String) -> bool {
        value == "0.0"
    }
}
