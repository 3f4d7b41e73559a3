use std::any::type_name;

use ahash::AHashMap;
use once_cell::sync::Lazy;

use super::{reject, reject_number, CoercionRule};
use crate::cell::CellContext;
use crate::error::Result;

/// Text tokens accepted as booleans. Matching is case-sensitive.
static BOOLEAN_TOKENS: Lazy<AHashMap<&'static str, bool>> = Lazy::new(|| {
    [
        ("YES", true),
        ("NO", false),
        ("Y", true),
        ("N", false),
        ("Yes", true),
        ("No", false),
        ("true", true),
        ("false", false),
    ]
    .into_iter()
    .collect()
});

/// Booleans from boolean cells or yes/no style tokens.
///
/// A numeric `0` is read as "no value": conditional formulas whose taken branch
/// returns nothing evaluate to zero. Any other number is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanRule;

impl BooleanRule {
    /// Look up a token in the boolean table
    pub fn token(value: &str) -> Option<bool> {
        BOOLEAN_TOKENS.get(value).copied()
    }
}

impl CoercionRule for BooleanRule {
    type Output = bool;

    fn type_name(&self) -> &str {
        type_name::<bool>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<bool>> {
        if value == 0.0 {
            Ok(None)
        } else {
            Err(reject_number(value, self.type_name(), cell))
        }
    }

    fn parse_from_boolean(&self, value: bool, _cell: &CellContext) -> Result<Option<bool>> {
        Ok(Some(value))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<bool>> {
        match Self::token(value) {
            Some(flag) => Ok(Some(flag)),
            None => Err(reject(value, self.type_name(), cell)),
        }
    }
}
