//! Calendar field table.
//!
//! Every time-keeping register is accessed through one row of this table: the
//! register address, the valid range, the bits that carry the value and the
//! bits that must be set on every write.

use crate::bcd::{bcd_to_dec, dec_to_bcd};
use crate::RegAddr;

/// Oscillator-stop flag, set on every write of the seconds register.
pub(crate) const SECONDS_OSF: u8 = 0x80;

/// One of the seven BCD time-keeping registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Seconds (0-59)
    Seconds,
    /// Minutes (0-59)
    Minutes,
    /// Hours (0-23)
    Hours,
    /// Day of month (1-31)
    Day,
    /// Day of week (0-6)
    Weekday,
    /// Month (1-12)
    Month,
    /// Year relative to 2000 (0-99)
    Year,
}

/// Register layout of a [`Field`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Register holding the field
    pub register: RegAddr,
    /// Smallest valid value, also the clamp target
    pub min: u8,
    /// Largest valid value
    pub max: u8,
    /// Bits carrying the BCD value
    pub value_mask: u8,
    /// Bits OR'd into every write
    pub mandatory_bits: u8,
}

impl Field {
    /// All fields in register order.
    pub const ALL: [Field; 7] = [
        Field::Seconds,
        Field::Minutes,
        Field::Hours,
        Field::Day,
        Field::Weekday,
        Field::Month,
        Field::Year,
    ];

    /// Returns the register layout for this field.
    #[must_use]
    pub const fn spec(self) -> FieldSpec {
        match self {
            Field::Seconds => FieldSpec {
                register: RegAddr::Seconds,
                min: 0,
                max: 59,
                value_mask: 0x7F,
                mandatory_bits: SECONDS_OSF,
            },
            Field::Minutes => FieldSpec {
                register: RegAddr::Minutes,
                min: 0,
                max: 59,
                value_mask: 0x7F,
                mandatory_bits: 0,
            },
            // 24-hour layout; bit 5 is AM/PM only in 12-hour mode
            Field::Hours => FieldSpec {
                register: RegAddr::Hours,
                min: 0,
                max: 23,
                value_mask: 0x3F,
                mandatory_bits: 0,
            },
            Field::Day => FieldSpec {
                register: RegAddr::Days,
                min: 1,
                max: 31,
                value_mask: 0x3F,
                mandatory_bits: 0,
            },
            Field::Weekday => FieldSpec {
                register: RegAddr::Weekdays,
                min: 0,
                max: 6,
                value_mask: 0x07,
                mandatory_bits: 0,
            },
            Field::Month => FieldSpec {
                register: RegAddr::Months,
                min: 1,
                max: 12,
                value_mask: 0x1F,
                mandatory_bits: 0,
            },
            Field::Year => FieldSpec {
                register: RegAddr::Years,
                min: 0,
                max: 99,
                value_mask: 0xFF,
                mandatory_bits: 0,
            },
        }
    }

    /// Replaces an out-of-range value with the field's minimum.
    #[must_use]
    pub const fn clamp(self, value: u8) -> u8 {
        let spec = self.spec();
        if value < spec.min || value > spec.max {
            spec.min
        } else {
            value
        }
    }

    /// Encodes a value into the register byte written to the device.
    #[must_use]
    pub const fn encode(self, value: u8) -> u8 {
        dec_to_bcd(self.clamp(value)) | self.spec().mandatory_bits
    }

    /// Decodes a register byte read from the device.
    #[must_use]
    pub const fn decode(self, raw: u8) -> u8 {
        bcd_to_dec(raw & self.spec().value_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_are_consecutive() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.spec().register as u8, RegAddr::Seconds as u8 + i as u8);
        }
    }

    #[test]
    fn test_clamp_out_of_range_to_minimum() {
        assert_eq!(Field::Seconds.clamp(75), 0);
        assert_eq!(Field::Minutes.clamp(60), 0);
        assert_eq!(Field::Hours.clamp(24), 0);
        assert_eq!(Field::Day.clamp(0), 1);
        assert_eq!(Field::Day.clamp(32), 1);
        assert_eq!(Field::Weekday.clamp(7), 0);
        assert_eq!(Field::Month.clamp(13), 1);
        assert_eq!(Field::Month.clamp(0), 1);
        assert_eq!(Field::Year.clamp(100), 0);
    }

    #[test]
    fn test_clamp_keeps_in_range_values() {
        assert_eq!(Field::Seconds.clamp(59), 59);
        assert_eq!(Field::Hours.clamp(23), 23);
        assert_eq!(Field::Day.clamp(31), 31);
        assert_eq!(Field::Weekday.clamp(6), 6);
        assert_eq!(Field::Month.clamp(12), 12);
        assert_eq!(Field::Year.clamp(99), 99);
    }

    #[test]
    fn test_seconds_encode_sets_osf() {
        assert_eq!(Field::Seconds.encode(45), 0xC5);
        assert_eq!(Field::Seconds.encode(0), 0x80);
        // clamped values still carry the flag
        assert_eq!(Field::Seconds.encode(75), 0x80);
        for value in 0..=255u8 {
            assert_ne!(Field::Seconds.encode(value) & SECONDS_OSF, 0);
        }
    }

    #[test]
    fn test_encode_other_fields() {
        assert_eq!(Field::Minutes.encode(30), 0x30);
        assert_eq!(Field::Hours.encode(23), 0x23);
        assert_eq!(Field::Day.encode(0), 0x01);
        assert_eq!(Field::Month.encode(13), 0x01);
        assert_eq!(Field::Year.encode(24), 0x24);
    }

    #[test]
    fn test_decode_strips_status_bits() {
        assert_eq!(Field::Seconds.decode(0xC5), 45);
        assert_eq!(Field::Minutes.decode(0x80 | 0x59), 59);
        assert_eq!(Field::Hours.decode(0xC0 | 0x21), 21);
        assert_eq!(Field::Day.decode(0xC0 | 0x31), 31);
        assert_eq!(Field::Weekday.decode(0xF8 | 0x05), 5);
        assert_eq!(Field::Month.decode(0xE0 | 0x12), 12);
        assert_eq!(Field::Year.decode(0x99), 99);
    }
}
