//! Cell coordinates and the per-cell context handed to coercion rules

use std::fmt;

use chrono::NaiveDateTime;
use sheet_fixtures_core::{DateSystem, Worksheet};

/// Identifies a cell for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub row: u32,
    pub column: u16,
    pub sheet: String,
}

impl Coordinate {
    pub fn new(row: u32, column: u16, sheet: impl Into<String>) -> Self {
        Self {
            row,
            column,
            sheet: sheet.into(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) of sheet '{}'", self.row, self.column, self.sheet)
    }
}

/// What a rule may know about the cell it is coercing besides the raw value
///
/// Numeric cells are ambiguous between plain numbers and dates; the display format
/// captured here is the only disambiguator.
#[derive(Debug, Clone)]
pub struct CellContext {
    coordinate: Coordinate,
    date_formatted: bool,
    date_system: DateSystem,
}

impl CellContext {
    /// Context for a General-formatted cell in a 1900-based workbook
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            date_formatted: false,
            date_system: DateSystem::default(),
        }
    }

    /// Context of the cell at (`row`, `col`) as the worksheet describes it
    pub fn of(sheet: &Worksheet, row: u32, col: u16) -> Self {
        Self {
            coordinate: Coordinate::new(row, col, sheet.name()),
            date_formatted: sheet.is_date_formatted(row, col),
            date_system: sheet.date_system(),
        }
    }

    pub fn with_date_format(mut self, date_formatted: bool) -> Self {
        self.date_formatted = date_formatted;
        self
    }

    pub fn with_date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Whether the cell's display format renders numbers as dates or times
    pub fn is_date_formatted(&self) -> bool {
        self.date_formatted
    }

    /// Resolve a serial number to a date-time using the workbook's date system
    pub fn date_time(&self, serial: f64) -> Option<NaiveDateTime> {
        self.date_system.serial_to_datetime(serial)
    }
}
