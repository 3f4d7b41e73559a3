//! Stored cell data

use super::CellValue;
use crate::number_format::NumberFormat;

/// Complete data for a single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Display format applied to the cell
    pub number_format: NumberFormat,
}

impl CellData {
    /// Create a new cell with a value and the General format
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            number_format: NumberFormat::General,
        }
    }

    /// Whether the display format renders the numeric value as a date or time
    pub fn is_date_formatted(&self) -> bool {
        self.number_format.is_date_format()
    }
}
