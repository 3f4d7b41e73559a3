//! # sheet-fixtures-core
//!
//! Worksheet model consumed by the sheet-fixtures reader.
//!
//! This crate provides:
//! - [`CellValue`] - Cell contents (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and merge regions
//! - [`NumberFormat`] - Display formats, including date-format detection
//! - [`DateSystem`] - Excel serial date conversion
//! - [`Worksheet`] - Sparse cell storage with merged regions
//!
//! ## Example
//!
//! ```rust
//! use sheet_fixtures_core::{CellValue, NumberFormat, Worksheet};
//!
//! let mut sheet = Worksheet::new("Fixtures");
//! sheet.set_cell_value("A1", "name").unwrap();
//! sheet.set_cell_value_at(1, 1, 44693.0).unwrap();
//! sheet.set_number_format_at(1, 1, NumberFormat::date_short()).unwrap();
//! sheet.merge("B1:C1").unwrap();
//!
//! assert_eq!(sheet.get_value_at(1, 1), CellValue::Number(44693.0));
//! assert!(sheet.is_date_formatted(1, 1));
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod number_format;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue};
pub use date::DateSystem;
pub use error::{Error, Result};
pub use number_format::NumberFormat;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
