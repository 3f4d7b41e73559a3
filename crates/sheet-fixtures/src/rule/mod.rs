//! Per-type coercion rules
//!
//! A rule turns one classified cell value (numeric, boolean, text or empty) into a
//! value of its target type, or rejects it with
//! [`ReaderError::IncorrectValueForType`]. Rules hold no mutable state; the cell
//! dispatcher decides which of the four operations applies.

mod boolean;
mod enumeration;
mod numeric;
mod temporal;
mod text;

use std::fmt;

pub use boolean::BooleanRule;
pub use enumeration::{EnumRule, EnumType, EnumValue, FixtureEnum, TypedEnumRule};
pub use numeric::{DecimalRule, DoubleRule, IntegerRule, LongRule};
pub use temporal::{
    DateRule, LocalDateRule, LocalDateTimeRule, LocalTimeRule, OffsetDateTimeRule,
    ZonedDateTimeRule,
};
pub use text::{number_to_text, StringRule};

use crate::cell::CellContext;
use crate::error::{ReaderError, Result};

/// Conversion of a single cell's content into a target type
pub trait CoercionRule {
    /// The value produced by this rule
    type Output;

    /// Fully qualified name of the target type, as reported in errors
    fn type_name(&self) -> &str;

    /// Value for a cell holding nothing
    fn parse_for_empty_cell(&self) -> Result<Option<Self::Output>> {
        Ok(None)
    }

    /// Value for a cell that does not exist at all
    fn parse_for_missing_cell(&self) -> Result<Option<Self::Output>> {
        self.parse_for_empty_cell()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<Self::Output>>;

    fn parse_from_boolean(&self, value: bool, cell: &CellContext) -> Result<Option<Self::Output>> {
        Err(reject(value, self.type_name(), cell))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<Self::Output>>;

    /// Whether a value produced from a formula's numeric result stands for "no value".
    ///
    /// Formulas whose branches return nothing surface as `0`; rules with textual
    /// output recognize the rendered zero and the dispatcher turns it into `None`.
    fn is_blank_formula_result(&self, _value: &Self::Output) -> bool {
        false
    }
}

impl<R: CoercionRule + ?Sized> CoercionRule for &R {
    type Output = R::Output;

    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn parse_for_empty_cell(&self) -> Result<Option<Self::Output>> {
        (**self).parse_for_empty_cell()
    }

    fn parse_for_missing_cell(&self) -> Result<Option<Self::Output>> {
        (**self).parse_for_missing_cell()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<Self::Output>> {
        (**self).parse_from_numeric(value, cell)
    }

    fn parse_from_boolean(&self, value: bool, cell: &CellContext) -> Result<Option<Self::Output>> {
        (**self).parse_from_boolean(value, cell)
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<Self::Output>> {
        (**self).parse_from_text(value, cell)
    }

    fn is_blank_formula_result(&self, value: &Self::Output) -> bool {
        (**self).is_blank_formula_result(value)
    }
}

/// Rejection of a raw value for a target type
pub(crate) fn reject<V: fmt::Display>(value: V, type_name: &str, cell: &CellContext) -> ReaderError {
    ReaderError::incorrect_value(value, type_name, cell.coordinate())
}

/// Rejection of a numeric value, rendered the way spreadsheets print doubles
pub(crate) fn reject_number(value: f64, type_name: &str, cell: &CellContext) -> ReaderError {
    reject(number_to_text(value), type_name, cell)
}
