//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellValue};
use crate::date::DateSystem;
use crate::error::{Error, Result};
use crate::number_format::NumberFormat;
use crate::{MAX_COLS, MAX_ROWS};

/// A single sheet: sparse cell storage plus merge regions
///
/// Rows and cells are only stored once written to. Row iteration is ordered by
/// column index.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cells keyed by row, then column
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    /// Merged regions, in insertion order
    merged_regions: Vec<CellRange>,
    /// Base date for serial date numbers
    date_system: DateSystem,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    pub fn set_date_system(&mut self, date_system: DateSystem) {
        self.date_system = date_system;
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|cells| cells.get(&col))
    }

    /// Get cell value by indices, `Empty` when the cell does not exist
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Whether the cell's display format renders numbers as dates or times
    pub fn is_date_formatted(&self, row: u32, col: u16) -> bool {
        self.cell_at(row, col)
            .is_some_and(CellData::is_date_formatted)
    }

    /// Whether any cell has been written in the row
    pub fn has_row(&self, row: u32) -> bool {
        self.rows.contains_key(&row)
    }

    /// Iterate the stored cells of a row in column order
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> + '_ {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(col, data)| (*col, data)))
    }

    /// Number of stored cells in a row
    pub fn physical_cell_count(&self, row: u32) -> usize {
        self.rows.get(&row).map_or(0, BTreeMap::len)
    }

    /// Indices of all rows holding at least one cell, ascending
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Total number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices, keeping any existing format
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.entry(row, col)?.value = value.into();
        Ok(())
    }

    /// Set a formula along with the result of its last calculation
    pub fn set_cell_formula_at(
        &mut self,
        row: u32,
        col: u16,
        formula: &str,
        cached_value: Option<CellValue>,
    ) -> Result<()> {
        let text = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.entry(row, col)?.value = CellValue::Formula {
            text,
            cached_value: cached_value.map(Box::new),
        };
        Ok(())
    }

    /// Set the display format of a cell
    pub fn set_number_format_at(&mut self, row: u32, col: u16, format: NumberFormat) -> Result<()> {
        self.entry(row, col)?.number_format = format;
        Ok(())
    }

    fn entry(&mut self, row: u32, col: u16) -> Result<&mut CellData> {
        self.validate_cell_position(row, col)?;
        Ok(self.rows.entry(row).or_default().entry(col).or_default())
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// Merge a range of cells. Overlapping an existing region is rejected.
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.merged_regions.iter().any(|existing| existing.overlaps(range)) {
            return Err(Error::MergedCellConflict(range.to_a1_string()));
        }
        self.validate_cell_position(range.last_row(), range.last_col())?;
        self.merged_regions.push(*range);
        Ok(())
    }

    /// Merge a range given in A1 notation
    pub fn merge(&mut self, range: &str) -> Result<()> {
        let range = CellRange::parse(range)?;
        self.merge_cells(&range)
    }

    /// First merged region containing the cell, if any
    pub fn merged_region_at(&self, row: u32, col: u16) -> Option<&CellRange> {
        self.merged_regions
            .iter()
            .find(|region| region.contains(row, col))
    }
}
