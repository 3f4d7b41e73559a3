//! # sheet-fixtures
//!
//! Typed test-fixture data read out of spreadsheet worksheets.
//!
//! A fixture worksheet starts with one or more title rows naming its columns,
//! followed by data rows naming a record in column 0. This crate turns such a sheet
//! into typed values:
//!
//! - [`HeaderMapBuilder`] maps dotted header keys (`group.leaf`) to column indices,
//!   following merged title cells to their anchor
//! - [`CellReader`] coerces single cells to integers, decimals, booleans, strings,
//!   dates and times, or enumerations, evaluating formulas through a
//!   [`FormulaEvaluator`]
//! - [`FixtureSheet`] combines both for record/key lookups
//!
//! ## Example
//!
//! ```rust
//! use sheet_fixtures::prelude::*;
//!
//! let mut sheet = Worksheet::new("Orders");
//! sheet.set_cell_value("B1", "price").unwrap();
//! sheet.merge("B1:C1").unwrap();
//! sheet.set_cell_value("B2", "net").unwrap();
//! sheet.set_cell_value("C2", "gross").unwrap();
//! sheet.set_cell_value("A3", "first").unwrap();
//! sheet.set_cell_value("B3", 10.5).unwrap();
//! sheet.set_cell_formula_at(2, 2, "B3*1.2", Some(CellValue::Number(12.6))).unwrap();
//!
//! let descriptor = HeaderDescriptor::new(0, 1, 1).unwrap();
//! let fixtures = FixtureSheet::new(&sheet, descriptor).unwrap();
//!
//! assert_eq!(fixtures.column("price.gross").unwrap(), 2);
//! assert_eq!(fixtures.value::<f64>("first", "price.net").unwrap(), Some(10.5));
//! assert_eq!(fixtures.value::<String>("first", "price.gross").unwrap(), Some("12.6".into()));
//! ```

pub mod cell;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod fixture;
pub mod header;
pub mod prelude;
pub mod router;
pub mod rule;

pub use cell::{CellContext, Coordinate};
pub use dispatch::{resolve, CellReader};
pub use error::{ReaderError, Result};
pub use evaluator::{CachedResultEvaluator, EvaluationError, FormulaEvaluator};
pub use fixture::FixtureSheet;
pub use header::{
    build_header_map, DuplicateHeaders, HeaderDescriptor, HeaderMapBuilder, HeaderResolver,
};
pub use router::{rule_for, FromCell, Rule, ScalarType, TargetType, TypedValue};
pub use rule::{CoercionRule, EnumType, EnumValue, FixtureEnum};

// Re-export the worksheet model
pub use sheet_fixtures_core::{
    CellAddress, CellData, CellError, CellRange, CellValue, DateSystem, NumberFormat,
    Worksheet,
};
