use std::any::type_name;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{reject_number, CoercionRule};
use crate::cell::CellContext;
use crate::error::{ReaderError, Result};

/// 32-bit integers. Numerics truncate toward zero, saturating at the type bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerRule;

impl CoercionRule for IntegerRule {
    type Output = i32;

    fn type_name(&self) -> &str {
        type_name::<i32>()
    }

    fn parse_from_numeric(&self, value: f64, _cell: &CellContext) -> Result<Option<i32>> {
        Ok(Some(value as i32))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<i32>> {
        value.parse::<i32>().map(Some).map_err(|e| {
            ReaderError::incorrect_value_caused_by(value, self.type_name(), cell.coordinate(), e)
        })
    }
}

/// 64-bit integers. Numerics truncate toward zero, saturating at the type bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongRule;

impl CoercionRule for LongRule {
    type Output = i64;

    fn type_name(&self) -> &str {
        type_name::<i64>()
    }

    fn parse_from_numeric(&self, value: f64, _cell: &CellContext) -> Result<Option<i64>> {
        Ok(Some(value as i64))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<i64>> {
        value.parse::<i64>().map(Some).map_err(|e| {
            ReaderError::incorrect_value_caused_by(value, self.type_name(), cell.coordinate(), e)
        })
    }
}

#[derive(Debug, Error)]
#[error("'{0}' is not a number; non-finite values are spelled 'Infinity' or 'NaN'")]
struct NonFiniteSpellingError(String);

/// Parse a double, accepting `Infinity` and `NaN` (optionally signed) as the only
/// spellings of non-finite values
fn parse_double(value: &str) -> std::result::Result<f64, NonFiniteSpellingError> {
    let text = value.trim();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic())
        && unsigned != "Infinity"
        && unsigned != "NaN"
    {
        return Err(NonFiniteSpellingError(value.to_string()));
    }
    text.parse::<f64>()
        .map_err(|_| NonFiniteSpellingError(value.to_string()))
}

/// Doubles. Text accepts decimal and exponent forms plus `Infinity` and `NaN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleRule;

impl CoercionRule for DoubleRule {
    type Output = f64;

    fn type_name(&self) -> &str {
        type_name::<f64>()
    }

    fn parse_from_numeric(&self, value: f64, _cell: &CellContext) -> Result<Option<f64>> {
        Ok(Some(value))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<f64>> {
        parse_double(value).map(Some).map_err(|e| {
            ReaderError::incorrect_value_caused_by(value, self.type_name(), cell.coordinate(), e)
        })
    }
}

/// Arbitrary-precision decimals.
///
/// Spreadsheets have no decimal storage, so every path goes through [`DoubleRule`]
/// and the double is converted using its shortest decimal representation
/// (`0.1` stays `0.1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalRule {
    double: DoubleRule,
}

impl DecimalRule {
    fn to_decimal(&self, value: f64, cell: &CellContext) -> Result<Decimal> {
        Decimal::from_str(&value.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(value))
            .ok_or_else(|| reject_number(value, self.type_name(), cell))
    }
}

impl CoercionRule for DecimalRule {
    type Output = Decimal;

    fn type_name(&self) -> &str {
        type_name::<Decimal>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<Decimal>> {
        match self.double.parse_from_numeric(value, cell)? {
            Some(double) => self.to_decimal(double, cell).map(Some),
            None => Ok(None),
        }
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<Decimal>> {
        let double = match self.double.parse_from_text(value, cell) {
            Ok(double) => double,
            // Report the failure against Decimal, keeping the float parse error as the cause
            Err(ReaderError::IncorrectValueForType {
                source: Some(cause),
                ..
            }) => {
                return Err(ReaderError::IncorrectValueForType {
                    value: value.to_string(),
                    type_name: self.type_name().to_string(),
                    row: cell.coordinate().row,
                    column: cell.coordinate().column,
                    sheet: cell.coordinate().sheet.clone(),
                    source: Some(cause),
                })
            }
            Err(other) => return Err(other),
        };
        match double {
            Some(double) => self.to_decimal(double, cell).map(Some),
            None => Ok(None),
        }
    }
}
