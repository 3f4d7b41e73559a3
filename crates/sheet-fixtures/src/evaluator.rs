//! Formula evaluation seam
//!
//! The dispatcher resolves formula cells through a [`FormulaEvaluator`] exactly once
//! per read. The default [`CachedResultEvaluator`] trusts the result stored with the
//! formula by the last calculation; callers with a calculation engine plug it in
//! through the trait or a closure.

use sheet_fixtures_core::{CellValue, Worksheet};
use thiserror::Error;

/// Failure to produce a value for a formula cell
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The formula was never calculated
    #[error("Formula '{0}' has no calculated result")]
    NotCalculated(String),

    /// The evaluator could not compute the formula
    #[error("Unable to evaluate formula '{formula}': {reason}")]
    Failed { formula: String, reason: String },
}

/// Computes the value of a formula cell
pub trait FormulaEvaluator {
    /// Evaluate the formula held at (`row`, `col`)
    ///
    /// `formula` is the cell's full [`CellValue::Formula`] content.
    fn evaluate(
        &self,
        sheet: &Worksheet,
        row: u32,
        col: u16,
        formula: &CellValue,
    ) -> Result<CellValue, EvaluationError>;
}

impl<F> FormulaEvaluator for F
where
    F: Fn(&Worksheet, u32, u16, &CellValue) -> Result<CellValue, EvaluationError>,
{
    fn evaluate(
        &self,
        sheet: &Worksheet,
        row: u32,
        col: u16,
        formula: &CellValue,
    ) -> Result<CellValue, EvaluationError> {
        self(sheet, row, col, formula)
    }
}

/// Returns the result cached with the formula
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedResultEvaluator;

impl FormulaEvaluator for CachedResultEvaluator {
    fn evaluate(
        &self,
        _sheet: &Worksheet,
        _row: u32,
        _col: u16,
        formula: &CellValue,
    ) -> Result<CellValue, EvaluationError> {
        match formula {
            CellValue::Formula {
                cached_value: Some(value),
                ..
            } => Ok((**value).clone()),
            CellValue::Formula { text, .. } => Err(EvaluationError::NotCalculated(text.clone())),
            other => Ok(other.clone()),
        }
    }
}
