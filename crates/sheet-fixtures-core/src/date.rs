//! Excel serial date conversion
//!
//! Excel stores dates as serial numbers: whole days since a base date plus a
//! fractional day for the time of day. The 1900 date system keeps Lotus 1-2-3's
//! phantom 1900-02-29 as serial 60, so every serial from 61 onward is one day
//! ahead of the plain Gregorian count.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Which base date a workbook's serial numbers count from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateSystem {
    /// Serial 1 is 1900-01-01 (Windows default)
    #[default]
    Excel1900,
    /// Serial 0 is 1904-01-01 (legacy Mac workbooks)
    Excel1904,
}

impl DateSystem {
    /// Convert a serial number to a local date-time.
    ///
    /// Fractions of a day are rounded to the nearest millisecond. Returns `None` for
    /// negative or non-finite serials and for values beyond chrono's range. The
    /// phantom serial 60 of the 1900 system resolves to 1900-03-01.
    pub fn serial_to_datetime(self, serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() || serial < 0.0 {
            return None;
        }

        let mut days = serial.floor();
        let mut millis = ((serial - days) * MILLIS_PER_DAY).round();
        if millis >= MILLIS_PER_DAY {
            days += 1.0;
            millis -= MILLIS_PER_DAY;
        }
        if days > i32::MAX as f64 {
            return None;
        }
        let days = days as i64;

        let base = match self {
            DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
            // Serials below 61 predate the phantom leap day
            DateSystem::Excel1900 if days < 61 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
            DateSystem::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
        };

        base.and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::days(days))?
            .checked_add_signed(Duration::milliseconds(millis as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_1900_system_known_serials() {
        let sys = DateSystem::Excel1900;
        assert_eq!(sys.serial_to_datetime(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(sys.serial_to_datetime(59.0), Some(ymd(1900, 2, 28)));
        assert_eq!(sys.serial_to_datetime(60.0), Some(ymd(1900, 3, 1)));
        assert_eq!(sys.serial_to_datetime(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(sys.serial_to_datetime(44693.0), Some(ymd(2022, 5, 12)));
    }

    #[test]
    fn test_1904_system() {
        let sys = DateSystem::Excel1904;
        assert_eq!(sys.serial_to_datetime(0.0), Some(ymd(1904, 1, 1)));
        assert_eq!(sys.serial_to_datetime(1.0), Some(ymd(1904, 1, 2)));
    }

    #[test]
    fn test_time_fraction_rounds_to_millis() {
        let value = DateSystem::Excel1900
            .serial_to_datetime(44667.0 + (11.0 * 3600.0 + 2.0 * 60.0 + 25.32) / 86400.0)
            .unwrap();
        assert_eq!(
            value.time(),
            NaiveTime::from_hms_milli_opt(11, 2, 25, 320).unwrap()
        );
        assert_eq!(value.date(), NaiveDate::from_ymd_opt(2022, 4, 16).unwrap());
    }

    #[test]
    fn test_time_only_serial() {
        let value = DateSystem::Excel1900.serial_to_datetime(0.5).unwrap();
        assert_eq!(value.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_serials() {
        assert_eq!(DateSystem::Excel1900.serial_to_datetime(-1.0), None);
        assert_eq!(DateSystem::Excel1900.serial_to_datetime(f64::NAN), None);
        assert_eq!(DateSystem::Excel1900.serial_to_datetime(f64::INFINITY), None);
    }
}
