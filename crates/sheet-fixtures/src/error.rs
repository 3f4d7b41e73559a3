//! Error types for sheet-fixtures
//!
//! Every variant renders as a structured, single-line message naming the cell
//! (row, column, sheet) it concerns, so a failed fixture load points straight at
//! the offending cell.

use std::fmt;

use thiserror::Error;

use crate::cell::Coordinate;

/// Result type alias using [`ReaderError`]
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Boxed parse failure carried as the source of an [`ReaderError::IncorrectValueForType`]
pub type ParseCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while reading fixture values out of a worksheet
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A cell's content cannot be coerced to the requested type
    #[error(
        "Incorrect value '{value}' for type '{type_name}' in cell ({row}, {column}) of sheet '{sheet}'"
    )]
    IncorrectValueForType {
        value: String,
        type_name: String,
        row: u32,
        column: u16,
        sheet: String,
        #[source]
        source: Option<ParseCause>,
    },

    /// The requested target type has no registered rule and is not an enumeration
    #[error("Unable to find a single cell value parser for type '{0}'")]
    InvalidType(String),

    /// The cell holds an error, or its formula could not be resolved to a value
    #[error("Unexpected value in cell ({row}, {column}) of sheet '{sheet}'")]
    UnexpectedValue { row: u32, column: u16, sheet: String },

    /// The fixture file does not exist
    #[error("File '{0}' not found")]
    FileNotFound(String),

    /// The fixture file exists but could not be opened as a workbook
    #[error("Unable to open file '{path}'")]
    UnableToOpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The title-row span yields no candidate reference row
    #[error("No title row found between rows {first} and {last} of sheet '{sheet}'")]
    NoTitleRow { first: u32, last: u32, sheet: String },

    /// Two columns compute the same header key
    #[error("Header '{key}' is defined by both column {first} and column {second}")]
    DuplicateHeader { key: String, first: u16, second: u16 },

    /// No data row carries this record name in column 0
    #[error("Unknown record '{0}'")]
    UnknownRecord(String),

    /// No column carries this header key
    #[error("Unknown header '{0}'")]
    UnknownHeader(String),

    /// Error from the worksheet model
    #[error(transparent)]
    Core(#[from] sheet_fixtures_core::Error),
}

impl ReaderError {
    /// Build an [`ReaderError::IncorrectValueForType`] for a raw value at a coordinate
    pub fn incorrect_value<V: fmt::Display>(
        value: V,
        type_name: impl Into<String>,
        at: &Coordinate,
    ) -> Self {
        ReaderError::IncorrectValueForType {
            value: value.to_string(),
            type_name: type_name.into(),
            row: at.row,
            column: at.column,
            sheet: at.sheet.clone(),
            source: None,
        }
    }

    /// Same as [`ReaderError::incorrect_value`], chaining the parse failure that caused it
    pub fn incorrect_value_caused_by<V, E>(
        value: V,
        type_name: impl Into<String>,
        at: &Coordinate,
        cause: E,
    ) -> Self
    where
        V: fmt::Display,
        E: std::error::Error + Send + Sync + 'static,
    {
        ReaderError::IncorrectValueForType {
            value: value.to_string(),
            type_name: type_name.into(),
            row: at.row,
            column: at.column,
            sheet: at.sheet.clone(),
            source: Some(Box::new(cause)),
        }
    }

    /// Build an [`ReaderError::UnexpectedValue`] for a coordinate
    pub fn unexpected_value(at: &Coordinate) -> Self {
        ReaderError::UnexpectedValue {
            row: at.row,
            column: at.column,
            sheet: at.sheet.clone(),
        }
    }
}
