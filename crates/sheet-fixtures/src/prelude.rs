//! Prelude module - common imports for sheet-fixtures users
//!
//! ```rust
//! use sheet_fixtures::prelude::*;
//! ```

pub use crate::{
    // Cell model
    CellValue,
    DateSystem,
    NumberFormat,
    Worksheet,

    // Reading
    CellReader,
    CoercionRule,
    FixtureEnum,
    FixtureSheet,
    FromCell,
    TargetType,
    TypedValue,

    // Headers
    DuplicateHeaders,
    HeaderDescriptor,

    // Error types
    ReaderError,
    Result,
};
