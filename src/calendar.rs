//! Calendar value and burst register conversion for the PCF2129 RTC.
//!
//! The PCF2129 keeps its time in seven consecutive BCD registers starting at
//! [`RegAddr::Seconds`](crate::RegAddr::Seconds):
//! - Seconds, Minutes, Hours, Days, Weekdays, Months, Years
//!
//! [`CalendarTime`] is the application-facing snapshot of those registers. The
//! weekday is not part of it: it is dropped when reading and written as zero.
//!
//! # Error Handling
//!
//! Conversions to and from chrono's `NaiveDateTime` report failures via
//! [`CalendarError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::Field;

/// First year representable by the two BCD year digits.
pub const EPOCH_YEAR: u16 = 2000;

/// A date and time as stored by the RTC.
///
/// The year is kept as an offset from [`EPOCH_YEAR`] in a single byte, matching
/// the chip's two-digit year register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    year: u8,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CalendarTime {
    /// Creates a calendar value.
    ///
    /// `year` may be absolute (2024) or already relative to the epoch (24): any
    /// value of at least [`EPOCH_YEAR`] has the epoch subtracted once. An offset
    /// outside 0..=99 (years 100 to 1999, or 2100 and later) becomes 0, so
    /// `new(1999, ..)` and `new(2100, ..)` both read back as year 2000.
    ///
    /// The other fields are not validated here; out-of-range values are
    /// clamped when the value is written to the device.
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let offset = if year >= EPOCH_YEAR {
            year - EPOCH_YEAR
        } else {
            year
        };
        Self {
            year: Field::Year.clamp(u8::try_from(offset).unwrap_or(u8::MAX)),
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Absolute year, e.g. 2024.
    #[must_use]
    pub fn year(&self) -> u16 {
        EPOCH_YEAR + u16::from(self.year)
    }

    /// Year as stored on the chip, relative to [`EPOCH_YEAR`].
    #[must_use]
    pub fn year_offset(&self) -> u8 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u8 {
        self.month
    }

    #[must_use]
    pub fn day(&self) -> u8 {
        self.day
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[must_use]
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Converts to a chrono `NaiveDateTime`.
    ///
    /// # Errors
    /// Returns [`CalendarError::InvalidDateTime`] if the fields do not form a
    /// real date and time (e.g. February 30th).
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, CalendarError> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .ok_or(CalendarError::InvalidDateTime)
    }
}

impl TryFrom<&NaiveDateTime> for CalendarTime {
    type Error = CalendarError;

    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        let year = datetime.year();
        if !(2000..=2099).contains(&year) {
            error!("Year {} is out of range! must be 2000-2099", year);
            return Err(CalendarError::YearOutOfRange);
        }
        let narrow = |v: u32| u8::try_from(v).map_err(|_| CalendarError::InvalidDateTime);
        Ok(CalendarTime::new(
            u16::try_from(year).map_err(|_| CalendarError::YearOutOfRange)?,
            narrow(datetime.month())?,
            narrow(datetime.day())?,
            narrow(datetime.hour())?,
            narrow(datetime.minute())?,
            narrow(datetime.second())?,
        ))
    }
}

/// Decodes the seven time-keeping registers, discarding the weekday.
impl From<[u8; 7]> for CalendarTime {
    fn from(data: [u8; 7]) -> Self {
        trace!("calendar registers={:?}", data);
        CalendarTime {
            second: Field::Seconds.decode(data[0]),
            minute: Field::Minutes.decode(data[1]),
            hour: Field::Hours.decode(data[2]),
            day: Field::Day.decode(data[3]),
            month: Field::Month.decode(data[5]),
            year: Field::Year.decode(data[6]),
        }
    }
}

/// Encodes the seven time-keeping registers with the weekday written as zero.
impl From<&CalendarTime> for [u8; 7] {
    fn from(ct: &CalendarTime) -> [u8; 7] {
        [
            Field::Seconds.encode(ct.second),
            Field::Minutes.encode(ct.minute),
            Field::Hours.encode(ct.hour),
            Field::Day.encode(ct.day),
            0x00,
            Field::Month.encode(ct.month),
            Field::Year.encode(ct.year),
        ]
    }
}

/// Errors that can occur during calendar conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarError {
    /// The fields do not form a valid date and time
    InvalidDateTime,
    /// The year is outside 2000-2099, the range of the two-digit year register
    YearOutOfRange,
}
