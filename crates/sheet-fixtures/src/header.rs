//! Header resolution
//!
//! A fixture worksheet starts with a block of header rows:
//!
//! ```text
//! first_title_row ─┐
//!                  ├─ title rows: their text forms the column keys
//! last_title_row  ─┘
//!                  ── comment rows, ignored
//! last_header_row
//!                  ── data rows, one record each, named in column 0
//! ```
//!
//! Title rows stack: a group header merged across several columns above a row of
//! leaf headers gives each leaf column the key `group.leaf`.

use std::collections::{HashMap, VecDeque};
use std::ops::RangeInclusive;

use log::{trace, warn};
use sheet_fixtures_core::{CellData, CellValue, Error as CoreError, Worksheet};

use crate::error::{ReaderError, Result};

/// Separator between title fragments in a header key
pub const KEY_SEPARATOR: char = '.';

/// Vertical layout of a worksheet's header block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderDescriptor {
    first_title_row: u32,
    last_title_row: u32,
    last_header_row: u32,
}

impl HeaderDescriptor {
    /// Rows must satisfy `first_title_row <= last_title_row <= last_header_row`
    pub fn new(first_title_row: u32, last_title_row: u32, last_header_row: u32) -> Result<Self> {
        if first_title_row > last_title_row || last_title_row > last_header_row {
            return Err(CoreError::InvalidRange(format!(
                "header rows {}..{}..{} are not ordered",
                first_title_row, last_title_row, last_header_row
            ))
            .into());
        }
        Ok(Self {
            first_title_row,
            last_title_row,
            last_header_row,
        })
    }

    /// A single title row with no comment rows
    pub fn single_row(row: u32) -> Self {
        Self {
            first_title_row: row,
            last_title_row: row,
            last_header_row: row,
        }
    }

    pub fn first_title_row(&self) -> u32 {
        self.first_title_row
    }

    pub fn last_title_row(&self) -> u32 {
        self.last_title_row
    }

    pub fn last_header_row(&self) -> u32 {
        self.last_header_row
    }

    /// Rows contributing to header keys, top to bottom
    pub fn title_rows(&self) -> RangeInclusive<u32> {
        self.first_title_row..=self.last_title_row
    }

    /// First row holding record data
    pub fn first_data_row(&self) -> u32 {
        self.last_header_row.saturating_add(1)
    }
}

impl Default for HeaderDescriptor {
    fn default() -> Self {
        Self::single_row(0)
    }
}

/// Reads title fragments, following merged regions to their anchor cell
#[derive(Debug, Clone, Copy)]
pub struct HeaderResolver<'a> {
    sheet: &'a Worksheet,
}

impl<'a> HeaderResolver<'a> {
    pub fn new(sheet: &'a Worksheet) -> Self {
        Self { sheet }
    }

    /// The cell holding the title shown at (`row`, `col`)
    ///
    /// Inside a merged region only the top-left cell carries content, so the first
    /// region containing the position redirects the lookup there.
    pub fn resolve_header_cell(&self, row: u32, col: u16) -> Option<&'a CellData> {
        match self.sheet.merged_region_at(row, col) {
            Some(region) => {
                let (anchor_row, anchor_col) = (region.first_row(), region.first_col());
                trace!(
                    "Header cell ({}, {}) resolved to merge anchor ({}, {})",
                    row,
                    col,
                    anchor_row,
                    anchor_col
                );
                self.sheet.cell_at(anchor_row, anchor_col)
            }
            None => self.sheet.cell_at(row, col),
        }
    }

    /// Title text of a resolved cell, or `None` when it is blank
    pub fn fragment(cell: &CellData) -> Option<String> {
        let text = match cell.value.effective_value() {
            CellValue::Empty | CellValue::Error(_) | CellValue::Formula { .. } => return None,
            CellValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Dotted key of a column across the given title rows (top to bottom)
    pub fn compute_header_key(&self, col: u16, title_rows: &[u32]) -> String {
        let mut fragments = VecDeque::with_capacity(title_rows.len());
        for &row in title_rows.iter().rev() {
            if let Some(fragment) = self.resolve_header_cell(row, col).and_then(Self::fragment) {
                fragments.push_front(fragment);
            }
        }
        let mut key = String::new();
        for (i, fragment) in fragments.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(fragment);
        }
        key
    }
}

/// What to do when two columns compute the same header key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicateHeaders {
    /// The later column replaces the earlier one, with a warning
    #[default]
    Overwrite,
    /// Fail with [`ReaderError::DuplicateHeader`]
    Reject,
}

/// Builds the header key to column index table of a worksheet
#[derive(Debug, Clone, Default)]
pub struct HeaderMapBuilder {
    descriptor: HeaderDescriptor,
    duplicates: DuplicateHeaders,
}

impl HeaderMapBuilder {
    pub fn new(descriptor: HeaderDescriptor) -> Self {
        Self {
            descriptor,
            duplicates: DuplicateHeaders::default(),
        }
    }

    /// Set the duplicate key policy
    pub fn duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn descriptor(&self) -> &HeaderDescriptor {
        &self.descriptor
    }

    /// Title row whose cells enumerate the columns
    ///
    /// The row with the most stored cells wins, the bottom-most one on ties: group
    /// headers above it are merged across several columns and hold fewer cells.
    pub fn reference_row(&self, sheet: &Worksheet) -> Result<u32> {
        self.descriptor
            .title_rows()
            .filter(|&row| sheet.has_row(row))
            .max_by_key(|&row| sheet.physical_cell_count(row))
            .ok_or_else(|| ReaderError::NoTitleRow {
                first: self.descriptor.first_title_row,
                last: self.descriptor.last_title_row,
                sheet: sheet.name().to_string(),
            })
    }

    /// Map every header key to its column
    ///
    /// Column 0 holds record names and is skipped. Keys are trimmed; columns whose
    /// key is blank are left out.
    pub fn build(&self, sheet: &Worksheet) -> Result<HashMap<String, u16>> {
        let reference_row = self.reference_row(sheet)?;
        let title_rows: Vec<u32> = self.descriptor.title_rows().collect();
        let resolver = HeaderResolver::new(sheet);

        let mut headers = HashMap::new();
        for (col, _) in sheet.row_cells(reference_row).filter(|(col, _)| *col > 0) {
            let key = resolver.compute_header_key(col, &title_rows);
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            if let Some(&first) = headers.get(key) {
                match self.duplicates {
                    DuplicateHeaders::Reject => {
                        return Err(ReaderError::DuplicateHeader {
                            key: key.to_string(),
                            first,
                            second: col,
                        })
                    }
                    DuplicateHeaders::Overwrite => warn!(
                        "Header '{}' of sheet '{}' defined by columns {} and {}, keeping column {}",
                        key,
                        sheet.name(),
                        first,
                        col,
                        col
                    ),
                }
            }
            headers.insert(key.to_string(), col);
        }
        Ok(headers)
    }
}

/// Header map of a worksheet with the default duplicate policy
pub fn build_header_map(
    sheet: &Worksheet,
    descriptor: &HeaderDescriptor,
) -> Result<HashMap<String, u16>> {
    HeaderMapBuilder::new(*descriptor).build(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet_with_rows(rows: &[&[&str]]) -> Worksheet {
        let mut sheet = Worksheet::new("Data");
        for (r, cells) in rows.iter().enumerate() {
            for (c, text) in cells.iter().enumerate() {
                if !text.is_empty() {
                    sheet.set_cell_value_at(r as u32, c as u16, *text).unwrap();
                }
            }
        }
        sheet
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(HeaderDescriptor::new(0, 1, 2).is_ok());
        assert!(HeaderDescriptor::new(1, 1, 1).is_ok());
        assert!(matches!(
            HeaderDescriptor::new(2, 1, 3),
            Err(ReaderError::Core(CoreError::InvalidRange(_)))
        ));
        assert!(HeaderDescriptor::new(0, 3, 2).is_err());

        let descriptor = HeaderDescriptor::new(1, 2, 4).unwrap();
        assert_eq!(descriptor.title_rows().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(descriptor.first_data_row(), 5);
    }

    #[test]
    fn test_stacked_key_skips_blank_fragments() {
        let sheet = sheet_with_rows(&[&["", "A"], &["", "", "B"]]);
        let resolver = HeaderResolver::new(&sheet);
        assert_eq!(resolver.compute_header_key(1, &[0, 1]), "A");
        assert_eq!(resolver.compute_header_key(2, &[0, 1]), "B");

        let sheet = sheet_with_rows(&[&["", "A"], &["", "B"]]);
        let resolver = HeaderResolver::new(&sheet);
        assert_eq!(resolver.compute_header_key(1, &[0, 1]), "A.B");
        assert_eq!(resolver.compute_header_key(5, &[0, 1]), "");
    }

    #[test]
    fn test_merge_resolution() {
        let mut sheet = sheet_with_rows(&[&["", "Group"], &["", "", ""]]);
        sheet.merge("B1:B2").unwrap();
        let resolver = HeaderResolver::new(&sheet);

        let top = resolver.resolve_header_cell(0, 1).unwrap();
        let bottom = resolver.resolve_header_cell(1, 1).unwrap();
        assert_eq!(top, bottom);
        assert_eq!(top.value, CellValue::from("Group"));
    }

    #[test]
    fn test_whitespace_fragment_is_blank() {
        let sheet = sheet_with_rows(&[&["", "  "], &["", "leaf"]]);
        let resolver = HeaderResolver::new(&sheet);
        assert_eq!(resolver.compute_header_key(1, &[0, 1]), "leaf");
    }

    #[test]
    fn test_non_text_fragments() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell_value_at(0, 1, 2022.0).unwrap();
        sheet.set_cell_value_at(0, 2, true).unwrap();
        sheet
            .set_cell_formula_at(0, 3, "\"x\"&\"y\"", Some(CellValue::string("xy")))
            .unwrap();
        sheet.set_cell_formula_at(0, 4, "A1", None).unwrap();
        let resolver = HeaderResolver::new(&sheet);
        assert_eq!(resolver.compute_header_key(1, &[0]), "2022");
        assert_eq!(resolver.compute_header_key(2, &[0]), "TRUE");
        assert_eq!(resolver.compute_header_key(3, &[0]), "xy");
        assert_eq!(resolver.compute_header_key(4, &[0]), "");
    }

    #[test]
    fn test_reference_row_prefers_bottom_on_ties() {
        let sheet = sheet_with_rows(&[&["", "a", "b"], &["", "c", "d"]]);
        let builder = HeaderMapBuilder::new(HeaderDescriptor::new(0, 1, 1).unwrap());
        assert_eq!(builder.reference_row(&sheet).unwrap(), 1);
    }

    #[test]
    fn test_no_title_row() {
        let sheet = sheet_with_rows(&[&[], &[], &["x", "y"]]);
        let err = build_header_map(&sheet, &HeaderDescriptor::new(0, 1, 1).unwrap()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No title row found between rows 0 and 1 of sheet 'Data'"
        );
    }

    #[test]
    fn test_duplicate_policies() {
        let sheet = sheet_with_rows(&[&["", "x", "x "]]);
        let map = build_header_map(&sheet, &HeaderDescriptor::default()).unwrap();
        assert_eq!(map, HashMap::from([("x".to_string(), 2)]));

        let err = HeaderMapBuilder::new(HeaderDescriptor::default())
            .duplicate_headers(DuplicateHeaders::Reject)
            .build(&sheet)
            .unwrap_err();
        assert!(matches!(
            err,
            ReaderError::DuplicateHeader { ref key, first: 1, second: 2 } if key == "x"
        ));
    }
}
