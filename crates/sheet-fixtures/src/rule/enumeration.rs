//! Enumeration rules
//!
//! Enumerations have no numeric or boolean representation; only the exact member
//! name is accepted.

use std::marker::PhantomData;

use super::{reject, reject_number, CoercionRule};
use crate::cell::CellContext;
use crate::error::Result;

/// A closed set of named values readable from fixture cells
///
/// ```
/// use sheet_fixtures::FixtureEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Status {
///     Active,
///     Retired,
/// }
///
/// impl FixtureEnum for Status {
///     const NAME: &'static str = "Status";
///
///     fn variants() -> &'static [Self] {
///         &[Status::Active, Status::Retired]
///     }
///
///     fn variant_name(&self) -> &'static str {
///         match self {
///             Status::Active => "ACTIVE",
///             Status::Retired => "RETIRED",
///         }
///     }
/// }
/// ```
pub trait FixtureEnum: Sized + Clone + 'static {
    /// Name reported in errors
    const NAME: &'static str;

    /// Every member, in declaration order
    fn variants() -> &'static [Self];

    /// The text a cell must hold to select this member
    fn variant_name(&self) -> &'static str;
}

/// Runtime description of an enumeration: its name and member names in order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Describe a [`FixtureEnum`] type
    pub fn of<E: FixtureEnum>() -> Self {
        Self::new(E::NAME, E::variants().iter().map(FixtureEnum::variant_name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Position of the member with exactly this name
    pub fn ordinal(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }
}

/// A member of a runtime [`EnumType`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumValue {
    pub ordinal: usize,
    pub name: String,
}

/// Rule bound to a runtime [`EnumType`]
#[derive(Debug, Clone)]
pub struct EnumRule {
    enum_type: EnumType,
}

impl EnumRule {
    pub fn new(enum_type: EnumType) -> Self {
        Self { enum_type }
    }

    pub fn enum_type(&self) -> &EnumType {
        &self.enum_type
    }
}

impl CoercionRule for EnumRule {
    type Output = EnumValue;

    fn type_name(&self) -> &str {
        self.enum_type.name()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<EnumValue>> {
        Err(reject_number(value, self.type_name(), cell))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<EnumValue>> {
        match self.enum_type.ordinal(value) {
            Some(ordinal) => Ok(Some(EnumValue {
                ordinal,
                name: value.to_string(),
            })),
            None => Err(reject(value, self.type_name(), cell)),
        }
    }
}

/// Rule producing members of a statically known [`FixtureEnum`]
#[derive(Debug)]
pub struct TypedEnumRule<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> Default for TypedEnumRule<E> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Clone for TypedEnumRule<E> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<E: FixtureEnum> CoercionRule for TypedEnumRule<E> {
    type Output = E;

    fn type_name(&self) -> &str {
        E::NAME
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<E>> {
        Err(reject_number(value, self.type_name(), cell))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<E>> {
        E::variants()
            .iter()
            .find(|member| member.variant_name() == value)
            .cloned()
            .map(Some)
            .ok_or_else(|| reject(value, self.type_name(), cell))
    }
}
