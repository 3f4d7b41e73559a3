//! Target type to coercion rule routing
//!
//! Two entry points select a rule:
//! - statically, through [`FromCell`], for callers that know the Rust type they want;
//! - dynamically, through [`rule_for`], for callers holding a [`TargetType`] built
//!   from a type name or an enumeration description.
//!
//! The dynamic path looks names up in a registry built once on first use and shared
//! read-only afterwards. Every lookup constructs a fresh rule.

use std::any::type_name;
use std::fmt;
use std::sync::OnceLock;

use ahash::AHashMap;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::cell::CellContext;
use crate::error::{ReaderError, Result};
use crate::rule::{
    BooleanRule, CoercionRule, DateRule, DecimalRule, DoubleRule, EnumRule, EnumType, EnumValue,
    FixtureEnum, IntegerRule, LocalDateRule, LocalDateTimeRule, LocalTimeRule, LongRule,
    OffsetDateTimeRule, StringRule, ZonedDateTimeRule,
};

/// Global rule registry (lazily initialized)
static RULE_REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();

fn get_rule_registry() -> &'static RuleRegistry {
    RULE_REGISTRY.get_or_init(RuleRegistry::new)
}

/// The well-known scalar targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarType {
    Integer,
    Long,
    Double,
    Decimal,
    Boolean,
    String,
    Date,
    LocalDate,
    LocalTime,
    LocalDateTime,
    ZonedDateTime,
    OffsetDateTime,
}

impl ScalarType {
    pub const ALL: [ScalarType; 12] = [
        ScalarType::Integer,
        ScalarType::Long,
        ScalarType::Double,
        ScalarType::Decimal,
        ScalarType::Boolean,
        ScalarType::String,
        ScalarType::Date,
        ScalarType::LocalDate,
        ScalarType::LocalTime,
        ScalarType::LocalDateTime,
        ScalarType::ZonedDateTime,
        ScalarType::OffsetDateTime,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Integer => "Integer",
            ScalarType::Long => "Long",
            ScalarType::Double => "Double",
            ScalarType::Decimal => "Decimal",
            ScalarType::Boolean => "Boolean",
            ScalarType::String => "String",
            ScalarType::Date => "Date",
            ScalarType::LocalDate => "LocalDate",
            ScalarType::LocalTime => "LocalTime",
            ScalarType::LocalDateTime => "LocalDateTime",
            ScalarType::ZonedDateTime => "ZonedDateTime",
            ScalarType::OffsetDateTime => "OffsetDateTime",
        }
    }

    /// Look up a scalar by canonical name or Rust alias (`i32`, `NaiveDate`, ...)
    pub fn from_name(name: &str) -> Option<ScalarType> {
        get_rule_registry().get(name).map(|def| def.scalar)
    }

    /// A fresh rule for this scalar
    pub fn rule(self) -> Rule {
        match self {
            ScalarType::Integer => Rule::Integer(IntegerRule),
            ScalarType::Long => Rule::Long(LongRule),
            ScalarType::Double => Rule::Double(DoubleRule),
            ScalarType::Decimal => Rule::Decimal(DecimalRule::default()),
            ScalarType::Boolean => Rule::Boolean(BooleanRule),
            ScalarType::String => Rule::String(StringRule),
            ScalarType::Date => Rule::Date(DateRule),
            ScalarType::LocalDate => Rule::LocalDate(LocalDateRule),
            ScalarType::LocalTime => Rule::LocalTime(LocalTimeRule),
            ScalarType::LocalDateTime => Rule::LocalDateTime(LocalDateTimeRule),
            ScalarType::ZonedDateTime => Rule::ZonedDateTime(ZonedDateTimeRule),
            ScalarType::OffsetDateTime => Rule::OffsetDateTime(OffsetDateTimeRule),
        }
    }

    /// Rust spellings accepted besides the canonical name
    fn aliases(self) -> &'static [&'static str] {
        match self {
            ScalarType::Integer => &["i32"],
            ScalarType::Long => &["i64"],
            ScalarType::Double => &["f64"],
            ScalarType::Decimal => &["rust_decimal::Decimal"],
            ScalarType::Boolean => &["bool"],
            ScalarType::String => &["str", "&str"],
            ScalarType::Date => &["DateTime<Utc>"],
            ScalarType::LocalDate => &["NaiveDate"],
            ScalarType::LocalTime => &["NaiveTime"],
            ScalarType::LocalDateTime => &["NaiveDateTime"],
            ScalarType::ZonedDateTime => &["DateTime<Local>"],
            ScalarType::OffsetDateTime => &["DateTime<FixedOffset>"],
        }
    }

    /// Fully qualified name of the produced Rust type
    fn rust_type_name(self) -> &'static str {
        match self {
            ScalarType::Integer => type_name::<i32>(),
            ScalarType::Long => type_name::<i64>(),
            ScalarType::Double => type_name::<f64>(),
            ScalarType::Decimal => type_name::<Decimal>(),
            ScalarType::Boolean => type_name::<bool>(),
            ScalarType::String => type_name::<String>(),
            ScalarType::Date => type_name::<DateTime<Utc>>(),
            ScalarType::LocalDate => type_name::<NaiveDate>(),
            ScalarType::LocalTime => type_name::<NaiveTime>(),
            ScalarType::LocalDateTime => type_name::<NaiveDateTime>(),
            ScalarType::ZonedDateTime => type_name::<DateTime<Local>>(),
            ScalarType::OffsetDateTime => type_name::<DateTime<FixedOffset>>(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry entry
#[derive(Debug, Clone, Copy)]
struct RuleDef {
    scalar: ScalarType,
    constructor: fn(ScalarType) -> Rule,
}

/// Name to rule constructor table
struct RuleRegistry {
    rules: AHashMap<&'static str, RuleDef>,
}

impl RuleRegistry {
    fn new() -> Self {
        let mut registry = Self {
            rules: AHashMap::new(),
        };
        for scalar in ScalarType::ALL {
            registry.register(scalar);
        }
        registry
    }

    fn register(&mut self, scalar: ScalarType) {
        let def = RuleDef {
            scalar,
            constructor: ScalarType::rule,
        };
        self.rules.insert(scalar.name(), def);
        self.rules.insert(scalar.rust_type_name(), def);
        for alias in scalar.aliases() {
            self.rules.insert(*alias, def);
        }
    }

    fn get(&self, name: &str) -> Option<&RuleDef> {
        self.rules.get(name)
    }
}

/// A requested target type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetType {
    /// A scalar type by name, resolved through the registry
    Named(String),
    /// A closed set of named values
    Enum(EnumType),
}

impl TargetType {
    pub fn named(name: impl Into<String>) -> Self {
        TargetType::Named(name.into())
    }

    /// Target for a [`FixtureEnum`] type
    pub fn enumeration<E: FixtureEnum>() -> Self {
        TargetType::Enum(EnumType::of::<E>())
    }

    pub fn name(&self) -> &str {
        match self {
            TargetType::Named(name) => name,
            TargetType::Enum(ty) => ty.name(),
        }
    }
}

impl From<ScalarType> for TargetType {
    fn from(scalar: ScalarType) -> Self {
        TargetType::Named(scalar.name().to_string())
    }
}

impl From<EnumType> for TargetType {
    fn from(ty: EnumType) -> Self {
        TargetType::Enum(ty)
    }
}

/// Select the rule for a target type
pub fn rule_for(target: &TargetType) -> Result<Rule> {
    match target {
        TargetType::Enum(ty) => Ok(Rule::Enum(EnumRule::new(ty.clone()))),
        TargetType::Named(name) => get_rule_registry()
            .get(name)
            .map(|def| (def.constructor)(def.scalar))
            .ok_or_else(|| ReaderError::InvalidType(name.clone())),
    }
}

/// Generates the closed rule set and its value type, one variant per rule
macro_rules! rule_set {
    ($($variant:ident($rule:ty) => $value:ty),* $(,)?) => {
        /// Value produced by a dynamically selected [`Rule`]
        #[derive(Debug, Clone, PartialEq)]
        pub enum TypedValue {
            $($variant($value),)*
        }

        /// Any coercion rule, as selected by [`rule_for`]
        #[derive(Debug, Clone)]
        pub enum Rule {
            $($variant($rule),)*
        }

        impl CoercionRule for Rule {
            type Output = TypedValue;

            fn type_name(&self) -> &str {
                match self {
                    $(Rule::$variant(rule) => rule.type_name(),)*
                }
            }

            fn parse_for_empty_cell(&self) -> Result<Option<TypedValue>> {
                match self {
                    $(Rule::$variant(rule) => Ok(rule.parse_for_empty_cell()?.map(TypedValue::$variant)),)*
                }
            }

            fn parse_for_missing_cell(&self) -> Result<Option<TypedValue>> {
                match self {
                    $(Rule::$variant(rule) => Ok(rule.parse_for_missing_cell()?.map(TypedValue::$variant)),)*
                }
            }

            fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<TypedValue>> {
                match self {
                    $(Rule::$variant(rule) => Ok(rule.parse_from_numeric(value, cell)?.map(TypedValue::$variant)),)*
                }
            }

            fn parse_from_boolean(&self, value: bool, cell: &CellContext) -> Result<Option<TypedValue>> {
                match self {
                    $(Rule::$variant(rule) => Ok(rule.parse_from_boolean(value, cell)?.map(TypedValue::$variant)),)*
                }
            }

            fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<TypedValue>> {
                match self {
                    $(Rule::$variant(rule) => Ok(rule.parse_from_text(value, cell)?.map(TypedValue::$variant)),)*
                }
            }

            fn is_blank_formula_result(&self, value: &TypedValue) -> bool {
                match (self, value) {
                    $((Rule::$variant(rule), TypedValue::$variant(value)) => rule.is_blank_formula_result(value),)*
                    _ => false,
                }
            }
        }
    };
}

rule_set! {
    Integer(IntegerRule) => i32,
    Long(LongRule) => i64,
    Double(DoubleRule) => f64,
    Decimal(DecimalRule) => Decimal,
    Boolean(BooleanRule) => bool,
    String(StringRule) => String,
    Date(DateRule) => DateTime<Utc>,
    LocalDate(LocalDateRule) => NaiveDate,
    LocalTime(LocalTimeRule) => NaiveTime,
    LocalDateTime(LocalDateTimeRule) => NaiveDateTime,
    ZonedDateTime(ZonedDateTimeRule) => DateTime<Local>,
    OffsetDateTime(OffsetDateTimeRule) => DateTime<FixedOffset>,
    Enum(EnumRule) => EnumValue,
}

/// Types that can be read from a single cell
pub trait FromCell: Sized {
    /// Rule producing this type
    type Rule: CoercionRule<Output = Self> + Default;

    /// A fresh rule instance
    fn rule() -> Self::Rule {
        Self::Rule::default()
    }
}

macro_rules! impl_from_cell {
    ($($ty:ty => $rule:ty),* $(,)?) => {
        $(
            impl FromCell for $ty {
                type Rule = $rule;
            }
        )*
    };
}

impl_from_cell! {
    i32 => IntegerRule,
    i64 => LongRule,
    f64 => DoubleRule,
    Decimal => DecimalRule,
    bool => BooleanRule,
    String => StringRule,
    DateTime<Utc> => DateRule,
    NaiveDate => LocalDateRule,
    NaiveTime => LocalTimeRule,
    NaiveDateTime => LocalDateTimeRule,
    DateTime<Local> => ZonedDateTimeRule,
    DateTime<FixedOffset> => OffsetDateTimeRule,
}
