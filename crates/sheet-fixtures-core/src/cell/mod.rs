//! Cell-related types
//!
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] / [`CellRange`] - Cell locations and rectangular blocks
//! - [`CellData`] - Value plus display format

mod address;
mod data;
mod value;

pub use address::{CellAddress, CellRange};
pub use data::CellData;
pub use value::{CellError, CellValue};
