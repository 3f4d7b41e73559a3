//! Cell dispatcher
//!
//! Classifies a cell's content and hands it to the matching [`CoercionRule`]
//! operation. Formula cells take one extra pass: the evaluator resolves them to a
//! plain value, which is then classified like any other content. A formula that
//! resolves to an error or to another formula is never re-evaluated.

use log::debug;
use sheet_fixtures_core::{CellValue, Worksheet};

use crate::cell::CellContext;
use crate::error::{ReaderError, Result};
use crate::evaluator::{CachedResultEvaluator, FormulaEvaluator};
use crate::router::{rule_for, FromCell, TargetType, TypedValue};
use crate::rule::{CoercionRule, FixtureEnum, TypedEnumRule};

/// Coerce the cell at (`row`, `col`) with `rule`
///
/// Cells that were never written go through [`CoercionRule::parse_for_missing_cell`].
/// Error cells, and formulas the evaluator cannot reduce to a plain value, raise
/// [`ReaderError::UnexpectedValue`].
pub fn resolve<R, E>(
    sheet: &Worksheet,
    row: u32,
    col: u16,
    rule: &R,
    evaluator: &E,
) -> Result<Option<R::Output>>
where
    R: CoercionRule + ?Sized,
    E: FormulaEvaluator + ?Sized,
{
    let Some(data) = sheet.cell_at(row, col) else {
        return rule.parse_for_missing_cell();
    };
    let cell = CellContext::of(sheet, row, col);

    let result = match &data.value {
        formula @ CellValue::Formula { text, .. } => {
            debug!("Evaluating formula '{}' in cell {}", text, cell.coordinate());
            match evaluator.evaluate(sheet, row, col, formula) {
                Ok(CellValue::Number(value)) => rule
                    .parse_from_numeric(value, &cell)
                    .map(|parsed| parsed.filter(|v| !rule.is_blank_formula_result(v))),
                Ok(evaluated) => dispatch(&evaluated, rule, &cell),
                Err(e) => {
                    debug!("Formula in cell {} failed: {}", cell.coordinate(), e);
                    Err(ReaderError::unexpected_value(cell.coordinate()))
                }
            }
        }
        value => dispatch(value, rule, &cell),
    };

    if let Err(e) = &result {
        debug!("Unable to read cell {}: {}", cell.coordinate(), e);
    }
    result
}

/// Route a non-formula value to its rule operation
fn dispatch<R>(value: &CellValue, rule: &R, cell: &CellContext) -> Result<Option<R::Output>>
where
    R: CoercionRule + ?Sized,
{
    match value {
        CellValue::Empty => rule.parse_for_empty_cell(),
        CellValue::Number(n) => rule.parse_from_numeric(*n, cell),
        CellValue::Boolean(b) => rule.parse_from_boolean(*b, cell),
        CellValue::String(s) => rule.parse_from_text(s, cell),
        CellValue::Error(_) | CellValue::Formula { .. } => {
            Err(ReaderError::unexpected_value(cell.coordinate()))
        }
    }
}

/// Typed reads against one worksheet
///
/// ```
/// use sheet_fixtures::{CellReader, Worksheet};
///
/// let mut sheet = Worksheet::new("Data");
/// sheet.set_cell_value_at(0, 0, 1.9).unwrap();
/// sheet.set_cell_value_at(0, 1, "YES").unwrap();
///
/// let reader = CellReader::new(&sheet);
/// assert_eq!(reader.read::<i32>(0, 0).unwrap(), Some(1));
/// assert_eq!(reader.read::<bool>(0, 1).unwrap(), Some(true));
/// assert_eq!(reader.read::<String>(4, 4).unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct CellReader<'a, E = CachedResultEvaluator> {
    sheet: &'a Worksheet,
    evaluator: E,
}

impl<'a> CellReader<'a> {
    /// Reader resolving formulas to their cached results
    pub fn new(sheet: &'a Worksheet) -> Self {
        Self::with_evaluator(sheet, CachedResultEvaluator)
    }
}

impl<'a, E: FormulaEvaluator> CellReader<'a, E> {
    pub fn with_evaluator(sheet: &'a Worksheet, evaluator: E) -> Self {
        Self { sheet, evaluator }
    }

    pub fn sheet(&self) -> &'a Worksheet {
        self.sheet
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Coerce a cell with an explicit rule
    pub fn resolve<R: CoercionRule + ?Sized>(
        &self,
        row: u32,
        col: u16,
        rule: &R,
    ) -> Result<Option<R::Output>> {
        resolve(self.sheet, row, col, rule, &self.evaluator)
    }

    /// Read a cell as `T`
    pub fn read<T: FromCell>(&self, row: u32, col: u16) -> Result<Option<T>> {
        self.resolve(row, col, &T::rule())
    }

    /// Read a cell as a dynamically chosen target type
    pub fn read_as(&self, row: u32, col: u16, target: &TargetType) -> Result<Option<TypedValue>> {
        let rule = rule_for(target)?;
        self.resolve(row, col, &rule)
    }

    /// Read a cell as a member of `T`
    pub fn read_enum<T: FixtureEnum>(&self, row: u32, col: u16) -> Result<Option<T>> {
        self.resolve(row, col, &TypedEnumRule::<T>::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationError;
    use crate::router::ScalarType;
    use crate::rule::{BooleanRule, StringRule};
    use pretty_assertions::assert_eq;
    use sheet_fixtures_core::{CellError, NumberFormat};

    fn sheet() -> Worksheet {
        let mut sheet = Worksheet::new("Sheet name");
        sheet.set_cell_value_at(0, 0, CellValue::Empty).unwrap();
        sheet.set_cell_value_at(0, 1, 2.75).unwrap();
        sheet.set_cell_value_at(0, 2, true).unwrap();
        sheet.set_cell_value_at(0, 3, "0.0").unwrap();
        sheet
            .set_cell_value_at(0, 4, CellError::Div0)
            .unwrap();
        sheet
            .set_cell_formula_at(1, 0, "IF(A1,1,)", Some(CellValue::Number(0.0)))
            .unwrap();
        sheet
            .set_cell_formula_at(1, 1, "B1*2", Some(CellValue::Number(5.5)))
            .unwrap();
        sheet
            .set_cell_formula_at(1, 2, "1/0", Some(CellValue::Error(CellError::Div0)))
            .unwrap();
        sheet.set_cell_formula_at(1, 3, "D1", None).unwrap();
        sheet
            .set_cell_formula_at(1, 4, "\"0.0\"", Some(CellValue::string("0.0")))
            .unwrap();
        sheet
    }

    #[test]
    fn test_empty_and_missing_cells_are_none() {
        let sheet = sheet();
        let reader = CellReader::new(&sheet);
        for scalar in ScalarType::ALL {
            let target = TargetType::from(scalar);
            assert_eq!(reader.read_as(0, 0, &target).unwrap(), None);
            assert_eq!(reader.read_as(9, 9, &target).unwrap(), None);
        }
    }

    #[test]
    fn test_content_kinds() {
        let sheet = sheet();
        let reader = CellReader::new(&sheet);
        assert_eq!(reader.read::<f64>(0, 1).unwrap(), Some(2.75));
        assert_eq!(reader.read::<i64>(0, 1).unwrap(), Some(2));
        assert_eq!(reader.read::<bool>(0, 2).unwrap(), Some(true));
        assert_eq!(reader.read::<String>(0, 2).unwrap(), Some("true".into()));
        assert_eq!(reader.read::<String>(0, 3).unwrap(), Some("0.0".into()));
        assert!(reader.read::<bool>(0, 1).is_err());
    }

    #[test]
    fn test_error_cell() {
        let sheet = sheet();
        let err = CellReader::new(&sheet).read::<String>(0, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected value in cell (0, 4) of sheet 'Sheet name'"
        );
    }

    #[test]
    fn test_formula_results() {
        let sheet = sheet();
        let reader = CellReader::new(&sheet);
        assert_eq!(reader.read::<f64>(1, 1).unwrap(), Some(5.5));
        assert_eq!(reader.read::<String>(1, 1).unwrap(), Some("5.5".into()));
        assert!(matches!(
            reader.read::<f64>(1, 2),
            Err(ReaderError::UnexpectedValue { row: 1, column: 2, .. })
        ));
        assert!(matches!(
            reader.read::<f64>(1, 3),
            Err(ReaderError::UnexpectedValue { row: 1, column: 3, .. })
        ));
    }

    #[test]
    fn test_blank_formula_result() {
        let sheet = sheet();
        let reader = CellReader::new(&sheet);
        assert_eq!(reader.resolve(1, 0, &StringRule).unwrap(), None);
        assert_eq!(reader.resolve(1, 0, &BooleanRule).unwrap(), None);
        assert_eq!(
            reader.read_as(1, 0, &ScalarType::String.into()).unwrap(),
            None
        );
        // Only numeric results are affected
        assert_eq!(reader.read::<String>(1, 4).unwrap(), Some("0.0".into()));
        assert_eq!(reader.read::<f64>(1, 0).unwrap(), Some(0.0));
        assert_eq!(reader.read::<i32>(1, 0).unwrap(), Some(0));
    }

    #[test]
    fn test_custom_evaluator() {
        let sheet = sheet();
        let evaluator = |_: &Worksheet, _: u32, _: u16, formula: &CellValue| match formula
            .formula_text()
        {
            Some("=D1") => Ok(CellValue::string("YES")),
            Some("=B1*2") => Ok(CellValue::formula("=A1")),
            Some(text) => Err(EvaluationError::Failed {
                formula: text.to_string(),
                reason: "unsupported".into(),
            }),
            None => Ok(formula.clone()),
        };
        let reader = CellReader::with_evaluator(&sheet, evaluator);
        assert_eq!(reader.read::<bool>(1, 3).unwrap(), Some(true));
        assert!(matches!(
            reader.read::<String>(1, 1),
            Err(ReaderError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            reader.read::<String>(1, 0),
            Err(ReaderError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_date_formatted_formula() {
        let mut sheet = Worksheet::new("Data");
        sheet
            .set_cell_formula_at(0, 0, "DATE(2022,5,12)", Some(CellValue::Number(44693.0)))
            .unwrap();
        let reader = CellReader::new(&sheet);
        assert!(reader.read::<chrono::NaiveDate>(0, 0).is_err());

        sheet
            .set_number_format_at(0, 0, NumberFormat::date_short())
            .unwrap();
        let reader = CellReader::new(&sheet);
        assert_eq!(
            reader.read::<chrono::NaiveDate>(0, 0).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2022, 5, 12)
        );
    }

    #[test]
    fn test_unknown_target() {
        let sheet = sheet();
        assert!(matches!(
            CellReader::new(&sheet).read_as(0, 1, &TargetType::named("Money")),
            Err(ReaderError::InvalidType(_))
        ));
    }
}
