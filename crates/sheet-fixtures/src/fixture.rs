//! Record-oriented access to a fixture worksheet
//!
//! Every data row is a record named by its column-0 cell; every titled column is a
//! field addressed by its header key.

use std::collections::HashMap;

use ahash::AHashMap;
use log::warn;
use sheet_fixtures_core::Worksheet;

use crate::dispatch::CellReader;
use crate::error::{ReaderError, Result};
use crate::evaluator::{CachedResultEvaluator, FormulaEvaluator};
use crate::header::{HeaderDescriptor, HeaderMapBuilder};
use crate::router::{FromCell, TargetType, TypedValue};
use crate::rule::FixtureEnum;

/// A worksheet indexed by record name and header key
///
/// ```
/// use sheet_fixtures::{FixtureSheet, HeaderDescriptor, Worksheet};
///
/// let mut sheet = Worksheet::new("People");
/// for (col, title) in ["name", "age", "active"].into_iter().enumerate() {
///     sheet.set_cell_value_at(0, col as u16, title).unwrap();
/// }
/// sheet.set_cell_value_at(1, 0, "alice").unwrap();
/// sheet.set_cell_value_at(1, 1, 31.0).unwrap();
/// sheet.set_cell_value_at(1, 2, "Y").unwrap();
///
/// let fixtures = FixtureSheet::new(&sheet, HeaderDescriptor::single_row(0)).unwrap();
/// assert_eq!(fixtures.value::<i32>("alice", "age").unwrap(), Some(31));
/// assert_eq!(fixtures.value::<bool>("alice", "active").unwrap(), Some(true));
/// ```
#[derive(Debug)]
pub struct FixtureSheet<'a, E = CachedResultEvaluator> {
    reader: CellReader<'a, E>,
    descriptor: HeaderDescriptor,
    headers: HashMap<String, u16>,
    records: Vec<(String, u32)>,
    record_rows: AHashMap<String, u32>,
}

impl<'a> FixtureSheet<'a> {
    /// Index a worksheet, resolving formulas to their cached results
    pub fn new(sheet: &'a Worksheet, descriptor: HeaderDescriptor) -> Result<Self> {
        Self::with_evaluator(sheet, descriptor, CachedResultEvaluator)
    }
}

impl<'a, E: FormulaEvaluator> FixtureSheet<'a, E> {
    pub fn with_evaluator(
        sheet: &'a Worksheet,
        descriptor: HeaderDescriptor,
        evaluator: E,
    ) -> Result<Self> {
        Self::with_builder(sheet, &HeaderMapBuilder::new(descriptor), evaluator)
    }

    /// Index a worksheet with a configured header map builder
    pub fn with_builder(
        sheet: &'a Worksheet,
        builder: &HeaderMapBuilder,
        evaluator: E,
    ) -> Result<Self> {
        let headers = builder.build(sheet)?;
        let descriptor = *builder.descriptor();
        let reader = CellReader::with_evaluator(sheet, evaluator);

        let mut records = Vec::new();
        let mut record_rows = AHashMap::new();
        for row in sheet
            .row_indices()
            .filter(|&row| row >= descriptor.first_data_row())
        {
            let name = match reader.read::<String>(row, 0) {
                Ok(Some(name)) => name,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        "Skipping row {} of sheet '{}': unreadable record name: {}",
                        row,
                        sheet.name(),
                        e
                    );
                    continue;
                }
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(first) = record_rows.get(name) {
                warn!(
                    "Record '{}' of sheet '{}' repeated in row {}, keeping row {}",
                    name,
                    sheet.name(),
                    row,
                    first
                );
                continue;
            }
            record_rows.insert(name.to_string(), row);
            records.push((name.to_string(), row));
        }

        Ok(Self {
            reader,
            descriptor,
            headers,
            records,
            record_rows,
        })
    }

    pub fn sheet(&self) -> &'a Worksheet {
        self.reader.sheet()
    }

    pub fn descriptor(&self) -> &HeaderDescriptor {
        &self.descriptor
    }

    pub fn reader(&self) -> &CellReader<'a, E> {
        &self.reader
    }

    /// Record names in row order
    pub fn record_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|(name, _)| name.as_str())
    }

    /// Row of a record
    pub fn record_row(&self, record: &str) -> Result<u32> {
        self.record_rows
            .get(record)
            .copied()
            .ok_or_else(|| ReaderError::UnknownRecord(record.to_string()))
    }

    /// Header key to column index table
    pub fn header_map(&self) -> &HashMap<String, u16> {
        &self.headers
    }

    /// Column of a header key
    pub fn column(&self, key: &str) -> Result<u16> {
        self.headers
            .get(key)
            .copied()
            .ok_or_else(|| ReaderError::UnknownHeader(key.to_string()))
    }

    fn locate(&self, record: &str, key: &str) -> Result<(u32, u16)> {
        Ok((self.record_row(record)?, self.column(key)?))
    }

    /// Read a field as `T`
    pub fn value<T: FromCell>(&self, record: &str, key: &str) -> Result<Option<T>> {
        let (row, col) = self.locate(record, key)?;
        self.reader.read(row, col)
    }

    /// Read a field as a dynamically chosen target type
    pub fn value_of(
        &self,
        record: &str,
        key: &str,
        target: &TargetType,
    ) -> Result<Option<TypedValue>> {
        let (row, col) = self.locate(record, key)?;
        self.reader.read_as(row, col, target)
    }

    /// Read a field as a member of `T`
    pub fn enum_value<T: FixtureEnum>(&self, record: &str, key: &str) -> Result<Option<T>> {
        let (row, col) = self.locate(record, key)?;
        self.reader.read_enum(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheet_fixtures_core::{CellError, CellValue};

    fn people() -> Worksheet {
        let mut sheet = Worksheet::new("People");
        for (col, title) in ["name", "age", "active"].into_iter().enumerate() {
            sheet.set_cell_value_at(0, col as u16, title).unwrap();
        }
        sheet.set_cell_value_at(1, 0, "comment row").unwrap();
        sheet.set_cell_value_at(2, 0, "alice").unwrap();
        sheet.set_cell_value_at(2, 1, 31.0).unwrap();
        sheet.set_cell_value_at(3, 0, "bob").unwrap();
        sheet.set_cell_value_at(3, 2, "NO").unwrap();
        sheet.set_cell_value_at(4, 0, "alice").unwrap();
        sheet.set_cell_value_at(4, 1, 99.0).unwrap();
        sheet.set_cell_value_at(5, 1, 7.0).unwrap();
        sheet
    }

    #[test]
    fn test_records_follow_header_block() {
        let sheet = people();
        let fixtures = FixtureSheet::new(&sheet, HeaderDescriptor::new(0, 0, 1).unwrap()).unwrap();
        assert_eq!(fixtures.record_names().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(fixtures.record_row("alice").unwrap(), 2);
    }

    #[test]
    fn test_values() {
        let sheet = people();
        let fixtures = FixtureSheet::new(&sheet, HeaderDescriptor::new(0, 0, 1).unwrap()).unwrap();
        assert_eq!(fixtures.value::<i64>("alice", "age").unwrap(), Some(31));
        assert_eq!(fixtures.value::<bool>("alice", "active").unwrap(), None);
        assert_eq!(fixtures.value::<bool>("bob", "active").unwrap(), Some(false));
        assert_eq!(
            fixtures
                .value_of("alice", "age", &TargetType::named("Double"))
                .unwrap(),
            Some(TypedValue::Double(31.0))
        );
    }

    #[test]
    fn test_unknown_lookups() {
        let sheet = people();
        let fixtures = FixtureSheet::new(&sheet, HeaderDescriptor::new(0, 0, 1).unwrap()).unwrap();
        assert!(matches!(
            fixtures.value::<i32>("carol", "age"),
            Err(ReaderError::UnknownRecord(name)) if name == "carol"
        ));
        assert!(matches!(
            fixtures.value::<i32>("alice", "name"),
            Err(ReaderError::UnknownHeader(key)) if key == "name"
        ));
    }

    #[test]
    fn test_formula_record_name() {
        let mut sheet = people();
        sheet
            .set_cell_formula_at(6, 0, "\"car\"&\"ol\"", Some(CellValue::string("carol")))
            .unwrap();
        let fixtures = FixtureSheet::new(&sheet, HeaderDescriptor::new(0, 0, 1).unwrap()).unwrap();
        assert_eq!(fixtures.record_row("carol").unwrap(), 6);
    }

    #[test]
    fn test_unreadable_record_names_are_skipped() {
        let mut sheet = people();
        sheet.set_cell_value_at(6, 0, CellError::Ref).unwrap();
        sheet.set_cell_value_at(6, 1, 12.0).unwrap();
        sheet.set_cell_formula_at(7, 0, "B8&\"x\"", None).unwrap();
        sheet.set_cell_value_at(8, 0, "dave").unwrap();
        let fixtures = FixtureSheet::new(&sheet, HeaderDescriptor::new(0, 0, 1).unwrap()).unwrap();
        assert_eq!(
            fixtures.record_names().collect::<Vec<_>>(),
            vec!["alice", "bob", "dave"]
        );
        assert_eq!(fixtures.record_row("dave").unwrap(), 8);
    }
}
