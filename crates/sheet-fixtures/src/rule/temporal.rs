//! Date and time rules
//!
//! Numeric cells only count as dates when their display format says so; the serial
//! number is then resolved through the workbook's date system. Text must be ISO-8601.

use std::any::type_name;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, ParseResult, TimeZone,
    Timelike, Utc,
};
use lazy_regex::regex_is_match;
use thiserror::Error;

use super::{reject, reject_number, CoercionRule};
use crate::cell::CellContext;
use crate::error::{ReaderError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Text that chrono might accept but that is not in fixed-width ISO-8601 form
#[derive(Debug, Error)]
#[error("'{value}' is not an ISO-8601 {expected}")]
struct IsoFormatError {
    value: String,
    expected: &'static str,
}

/// Chrono's numeric fields accept any width, so the shape is checked up front
fn check_shape(
    value: &str,
    matches: bool,
    expected: &'static str,
    type_name: &str,
    cell: &CellContext,
) -> Result<()> {
    if matches {
        return Ok(());
    }
    Err(ReaderError::incorrect_value_caused_by(
        value,
        type_name,
        cell.coordinate(),
        IsoFormatError {
            value: value.to_string(),
            expected,
        },
    ))
}

/// Chrono represents second 60 as a nanosecond overflow
fn reject_leap_second(
    time: NaiveTime,
    value: &str,
    type_name: &str,
    cell: &CellContext,
) -> Result<()> {
    if time.nanosecond() >= 1_000_000_000 {
        return Err(reject(value, type_name, cell));
    }
    Ok(())
}

/// Try each format in turn, returning the first success or the last failure
fn parse_with<T, const N: usize>(
    formats: &[&str; N],
    parse: impl Fn(&str) -> ParseResult<T>,
) -> ParseResult<T> {
    let (first, rest) = formats.split_first().map_or(("", &[][..]), |(f, r)| (*f, r));
    rest.iter()
        .fold(parse(first), |result, format| result.or_else(|_| parse(format)))
}

/// Resolve a date-formatted numeric cell to a local date-time
fn date_time_from_serial(value: f64, type_name: &str, cell: &CellContext) -> Result<NaiveDateTime> {
    if !cell.is_date_formatted() {
        return Err(reject_number(value, type_name, cell));
    }
    cell.date_time(value)
        .ok_or_else(|| reject_number(value, type_name, cell))
}

/// Parse `YYYY-MM-DD`
fn date_from_text(value: &str, type_name: &str, cell: &CellContext) -> Result<NaiveDate> {
    check_shape(
        value,
        regex_is_match!(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$", value),
        "date",
        type_name,
        cell,
    )?;
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| ReaderError::incorrect_value_caused_by(value, type_name, cell.coordinate(), e))
}

/// Parse `HH:MM[:SS[.fff]]`
fn time_from_text(value: &str, type_name: &str, cell: &CellContext) -> Result<NaiveTime> {
    check_shape(
        value,
        regex_is_match!(r"^[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]{1,9})?)?$", value),
        "time",
        type_name,
        cell,
    )?;
    let time = parse_with(&TIME_FORMATS, |format| NaiveTime::parse_from_str(value, format))
        .map_err(|e| {
            ReaderError::incorrect_value_caused_by(value, type_name, cell.coordinate(), e)
        })?;
    reject_leap_second(time, value, type_name, cell)?;
    Ok(time)
}

/// Parse `YYYY-MM-DDTHH:MM[:SS[.fff]]`
fn local_date_time_from_text(value: &str, type_name: &str, cell: &CellContext) -> Result<NaiveDateTime> {
    check_shape(
        value,
        regex_is_match!(
            r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]{1,9})?)?$",
            value
        ),
        "local date-time",
        type_name,
        cell,
    )?;
    let date_time = parse_with(&DATE_TIME_FORMATS, |format| {
        NaiveDateTime::parse_from_str(value, format)
    })
    .map_err(|e| ReaderError::incorrect_value_caused_by(value, type_name, cell.coordinate(), e))?;
    reject_leap_second(date_time.time(), value, type_name, cell)?;
    Ok(date_time)
}

/// RFC 3339 text with an explicit offset, leap seconds excluded
fn offset_date_time_from_text(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .filter(|dt| dt.time().nanosecond() < 1_000_000_000)
}

/// Place a wall-clock time in the system zone. Times skipped by a DST
/// transition are rejected; ambiguous ones take the earlier instant.
fn in_local_zone(
    value: NaiveDateTime,
    raw: &str,
    type_name: &str,
    cell: &CellContext,
) -> Result<DateTime<Local>> {
    Local
        .from_local_datetime(&value)
        .earliest()
        .ok_or_else(|| reject(raw, type_name, cell))
}

/// Local date-times (no zone)
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDateTimeRule;

impl CoercionRule for LocalDateTimeRule {
    type Output = NaiveDateTime;

    fn type_name(&self) -> &str {
        type_name::<NaiveDateTime>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<NaiveDateTime>> {
        date_time_from_serial(value, self.type_name(), cell).map(Some)
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<NaiveDateTime>> {
        local_date_time_from_text(value, self.type_name(), cell).map(Some)
    }
}

/// Calendar dates. Date-formatted numerics keep only their date component.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDateRule;

impl CoercionRule for LocalDateRule {
    type Output = NaiveDate;

    fn type_name(&self) -> &str {
        type_name::<NaiveDate>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<NaiveDate>> {
        date_time_from_serial(value, self.type_name(), cell).map(|dt| Some(dt.date()))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<NaiveDate>> {
        date_from_text(value, self.type_name(), cell).map(Some)
    }
}

/// Times of day. Date-formatted numerics keep only their time component.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimeRule;

impl CoercionRule for LocalTimeRule {
    type Output = NaiveTime;

    fn type_name(&self) -> &str {
        type_name::<NaiveTime>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<NaiveTime>> {
        date_time_from_serial(value, self.type_name(), cell).map(|dt| Some(dt.time()))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<NaiveTime>> {
        time_from_text(value, self.type_name(), cell).map(Some)
    }
}

/// Instants. Both numerics and text are read as wall-clock time in the system zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRule;

impl CoercionRule for DateRule {
    type Output = DateTime<Utc>;

    fn type_name(&self) -> &str {
        type_name::<DateTime<Utc>>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<DateTime<Utc>>> {
        let local = date_time_from_serial(value, self.type_name(), cell)?;
        in_local_zone(local, &super::number_to_text(value), self.type_name(), cell)
            .map(|dt| Some(dt.with_timezone(&Utc)))
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<DateTime<Utc>>> {
        let local = local_date_time_from_text(value, self.type_name(), cell)?;
        in_local_zone(local, value, self.type_name(), cell).map(|dt| Some(dt.with_timezone(&Utc)))
    }
}

/// Date-times in the system zone.
///
/// Text may carry an RFC 3339 offset, in which case the instant is converted to
/// the system zone; otherwise it is read as local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZonedDateTimeRule;

impl CoercionRule for ZonedDateTimeRule {
    type Output = DateTime<Local>;

    fn type_name(&self) -> &str {
        type_name::<DateTime<Local>>()
    }

    fn parse_from_numeric(&self, value: f64, cell: &CellContext) -> Result<Option<DateTime<Local>>> {
        let local = date_time_from_serial(value, self.type_name(), cell)?;
        in_local_zone(local, &super::number_to_text(value), self.type_name(), cell).map(Some)
    }

    fn parse_from_text(&self, value: &str, cell: &CellContext) -> Result<Option<DateTime<Local>>> {
        if let Some(with_offset) = offset_date_time_from_text(value) {
            return Ok(Some(with_offset.with_timezone(&Local)));
        }
        let local = local_date_time_from_text(value, self.type_name(), cell)?;
        in_local_zone(local, value, self.type_name(), cell).map(Some)
    }
}

/// Date-times with a fixed UTC offset.
///
/// Text without an offset and date-formatted numerics take the system zone's
/// offset at that moment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetDateTimeRule;

impl CoercionRule for OffsetDateTimeRule {
    type Output = DateTime<FixedOffset>;

    fn type_name(&self) -> &str {
        type_name::<DateTime<FixedOffset>>()
    }

    fn parse_from_numeric(
        &self,
        value: f64,
        cell: &CellContext,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        let local = date_time_from_serial(value, self.type_name(), cell)?;
        in_local_zone(local, &super::number_to_text(value), self.type_name(), cell)
            .map(|dt| Some(dt.fixed_offset()))
    }

    fn parse_from_text(
        &self,
        value: &str,
        cell: &CellContext,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        if let Some(with_offset) = offset_date_time_from_text(value) {
            return Ok(Some(with_offset));
        }
        let local = local_date_time_from_text(value, self.type_name(), cell)?;
        in_local_zone(local, value, self.type_name(), cell).map(|dt| Some(dt.fixed_offset()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Coordinate;
    use proptest::prelude::*;

    const SERIAL: f64 = 44693.0;

    fn ctx() -> CellContext {
        CellContext::new(Coordinate::new(0, 0, "Sheet name"))
    }

    fn date_ctx() -> CellContext {
        ctx().with_date_format(true)
    }

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 4, 16)
            .unwrap()
            .and_hms_milli_opt(11, 2, 25, 320)
            .unwrap()
    }

    #[test]
    fn test_local_date_time_text() {
        assert_eq!(
            LocalDateTimeRule
                .parse_from_text("2022-04-16T11:02:25.320", &ctx())
                .unwrap(),
            Some(sample())
        );
        assert_eq!(
            LocalDateTimeRule
                .parse_from_text("2022-04-16T11:02", &ctx())
                .unwrap(),
            Some(sample().date().and_hms_opt(11, 2, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_date_time_text() {
        for text in [
            "Sample string",
            "15/05/2022",
            "2022-05-15T17:05:65",
            "2022-05-15T17:05:60",
            "2022-05-15T17:65:15",
            "2022-05-15T32:05:15",
            "2022-05-32T17:05:15",
            "2022-13-15T17:05:15",
        ] {
            let err = DateRule.parse_from_text(text, &ctx()).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "Incorrect value '{}' for type '{}' in cell (0, 0) of sheet 'Sheet name'",
                    text,
                    type_name::<DateTime<Utc>>()
                )
            );
            assert!(LocalDateTimeRule.parse_from_text(text, &ctx()).is_err());
        }
    }

    #[test]
    fn test_non_padded_text_rejected() {
        for text in ["2022-4-6", "22-04-16", "2022-04-16T1:02", "22-04-16T1:2", "2022-04-16 11:02"] {
            assert!(LocalDateTimeRule.parse_from_text(text, &ctx()).is_err(), "{text}");
            assert!(DateRule.parse_from_text(text, &ctx()).is_err(), "{text}");
            assert!(ZonedDateTimeRule.parse_from_text(text, &ctx()).is_err(), "{text}");
            assert!(OffsetDateTimeRule.parse_from_text(text, &ctx()).is_err(), "{text}");
        }
        for text in ["2022-4-6", "22-04-16", "2022-04-6", "02022-04-16"] {
            let err = LocalDateRule.parse_from_text(text, &ctx()).unwrap_err();
            assert!(std::error::Error::source(&err).is_some(), "{text}");
        }
        for text in ["1:02", "11:2", "11:02:5", "11:02:05."] {
            assert!(LocalTimeRule.parse_from_text(text, &ctx()).is_err(), "{text}");
        }
    }

    #[test]
    fn test_leap_second_rejected() {
        assert!(LocalTimeRule.parse_from_text("23:59:60", &ctx()).is_err());
        assert!(LocalDateTimeRule
            .parse_from_text("2022-05-15T23:59:60", &ctx())
            .is_err());
        assert!(OffsetDateTimeRule
            .parse_from_text("2016-12-31T23:59:60Z", &ctx())
            .is_err());
        assert_eq!(
            LocalTimeRule.parse_from_text("23:59:59", &ctx()).unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59)
        );
    }

    #[test]
    fn test_numeric_requires_date_format() {
        let err = DateRule.parse_from_numeric(SERIAL, &ctx()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "Incorrect value '44693.0' for type '{}' in cell (0, 0) of sheet 'Sheet name'",
                type_name::<DateTime<Utc>>()
            )
        );
        assert!(LocalDateRule.parse_from_numeric(SERIAL, &ctx()).is_err());
        assert!(LocalTimeRule.parse_from_numeric(SERIAL, &ctx()).is_err());
        assert!(LocalDateTimeRule.parse_from_numeric(SERIAL, &ctx()).is_err());
        assert!(ZonedDateTimeRule.parse_from_numeric(SERIAL, &ctx()).is_err());
        assert!(OffsetDateTimeRule.parse_from_numeric(SERIAL, &ctx()).is_err());
    }

    #[test]
    fn test_date_formatted_numeric() {
        let serial = 44667.0 + (11.0 * 3600.0 + 2.0 * 60.0 + 25.32) / 86400.0;
        assert_eq!(
            LocalDateTimeRule.parse_from_numeric(serial, &date_ctx()).unwrap(),
            Some(sample())
        );
        assert_eq!(
            LocalDateRule.parse_from_numeric(serial, &date_ctx()).unwrap(),
            Some(sample().date())
        );
        assert_eq!(
            LocalTimeRule.parse_from_numeric(serial, &date_ctx()).unwrap(),
            Some(sample().time())
        );
        let expected = Local
            .from_local_datetime(&sample())
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            DateRule.parse_from_numeric(serial, &date_ctx()).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_negative_serial_rejected() {
        assert!(LocalDateTimeRule
            .parse_from_numeric(-1.0, &date_ctx())
            .is_err());
    }

    #[test]
    fn test_booleans_rejected() {
        assert!(DateRule.parse_from_boolean(true, &ctx()).is_err());
        assert!(LocalDateRule.parse_from_boolean(true, &ctx()).is_err());
        assert!(LocalTimeRule.parse_from_boolean(false, &ctx()).is_err());
        assert!(LocalDateTimeRule.parse_from_boolean(true, &ctx()).is_err());
    }

    #[test]
    fn test_date_text_matches_local_interpretation() {
        let expected = Local
            .from_local_datetime(&sample())
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            DateRule
                .parse_from_text("2022-04-16T11:02:25.320", &ctx())
                .unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_local_date_and_time_text() {
        assert_eq!(
            LocalDateRule.parse_from_text("2022-04-16", &ctx()).unwrap(),
            Some(sample().date())
        );
        assert!(LocalDateRule.parse_from_text("16/04/2022", &ctx()).is_err());
        assert_eq!(
            LocalTimeRule.parse_from_text("11:02:25.320", &ctx()).unwrap(),
            Some(sample().time())
        );
        assert_eq!(
            LocalTimeRule.parse_from_text("11:02", &ctx()).unwrap(),
            NaiveTime::from_hms_opt(11, 2, 0)
        );
        assert!(LocalTimeRule.parse_from_text("25:00", &ctx()).is_err());
    }

    #[test]
    fn test_offset_text() {
        let parsed = OffsetDateTimeRule
            .parse_from_text("2022-04-16T11:02:25+02:00", &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 7200);
        assert_eq!(parsed.naive_local(), sample().date().and_hms_opt(11, 2, 25).unwrap());

        let zoned = ZonedDateTimeRule
            .parse_from_text("2022-04-16T11:02:25+02:00", &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(zoned, parsed);
    }

    fn arb_date_time() -> impl Strategy<Value = NaiveDateTime> {
        (1900i32..2200, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, 0u32..1000).prop_map(
            |(y, mo, d, h, mi, s, ms)| {
                NaiveDate::from_ymd_opt(y, mo, d)
                    .unwrap()
                    .and_hms_milli_opt(h, mi, s, ms)
                    .unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_local_date_time_text_round_trip(value in arb_date_time()) {
            let text = value.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
            prop_assert_eq!(LocalDateTimeRule.parse_from_text(&text, &ctx()).unwrap(), Some(value));
        }

        #[test]
        fn prop_local_date_text_round_trip(value in arb_date_time()) {
            let text = value.date().format("%Y-%m-%d").to_string();
            prop_assert_eq!(LocalDateRule.parse_from_text(&text, &ctx()).unwrap(), Some(value.date()));
        }

        #[test]
        fn prop_local_time_text_round_trip(value in arb_date_time()) {
            let text = value.time().format("%H:%M:%S%.f").to_string();
            prop_assert_eq!(LocalTimeRule.parse_from_text(&text, &ctx()).unwrap(), Some(value.time()));
        }

        #[test]
        fn prop_plain_numbers_never_dates(value in -1.0e6f64..1.0e6) {
            prop_assert!(DateRule.parse_from_numeric(value, &ctx()).is_err());
            prop_assert!(LocalDateRule.parse_from_numeric(value, &ctx()).is_err());
            prop_assert!(LocalTimeRule.parse_from_numeric(value, &ctx()).is_err());
            prop_assert!(LocalDateTimeRule.parse_from_numeric(value, &ctx()).is_err());
        }
    }
}
