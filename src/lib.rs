//! A platform-agnostic driver for the NXP PCF2129 real-time clock.
//!
//! The driver talks to the chip over any `embedded-hal` 1.0 I2C bus. It reads
//! and writes the BCD time-keeping registers, converts them to a
//! [`CalendarTime`], and manipulates the few control bits an application
//! needs: 12/24-hour mode, watchdog and CLKOUT configuration, timestamp
//! capture, the battery-low flag and its interrupt.
//!
//! # Features
//!
//! - `async`: enables [`asynch::PCF2129`] on `embedded-hal-async`
//! - `log` / `defmt`: emit driver diagnostics through either logging framework
//!
//! # Example
//!
//! ```rust,ignore
//! use pcf2129::{CalendarTime, Config, PCF2129, DEFAULT_ADDRESS};
//!
//! let mut rtc = PCF2129::new(i2c, DEFAULT_ADDRESS);
//! rtc.probe()?;
//! rtc.configure(&Config::default())?;
//!
//! rtc.set_datetime(&CalendarTime::new(2024, 3, 14, 15, 30, 0))?;
//! let now = rtc.datetime()?;
//! ```
#![no_std]

// Logging shims: forward to `log` and/or `defmt` when enabled, otherwise
// expand to nothing.
cfg_if::cfg_if! {
    if #[cfg(any(feature = "log", feature = "defmt"))] {
        macro_rules! trace {
            ($($arg:tt)*) => {{
                #[cfg(feature = "log")]
                log::trace!($($arg)*);
                #[cfg(feature = "defmt")]
                defmt::trace!($($arg)*);
            }};
        }
        macro_rules! debug {
            ($($arg:tt)*) => {{
                #[cfg(feature = "log")]
                log::debug!($($arg)*);
                #[cfg(feature = "defmt")]
                defmt::debug!($($arg)*);
            }};
        }
        macro_rules! error {
            ($($arg:tt)*) => {{
                #[cfg(feature = "log")]
                log::error!($($arg)*);
                #[cfg(feature = "defmt")]
                defmt::error!($($arg)*);
            }};
        }
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {{}};
        }
        macro_rules! debug {
            ($($arg:tt)*) => {{}};
        }
        macro_rules! error {
            ($($arg:tt)*) => {{}};
        }
    }
}

pub mod bcd;
pub mod calendar;
pub mod field;
pub mod interrupt;
pub mod registers;

#[cfg(feature = "async")]
pub mod asynch;

use chrono::NaiveDateTime;
use embedded_hal::i2c::{ErrorKind, I2c};
use paste::paste;

pub use calendar::{CalendarError, CalendarTime, EPOCH_YEAR};
pub use field::{Field, FieldSpec};
pub use interrupt::PollFlag;
pub use registers::*;

/// Default 7-bit I2C address of the PCF2129.
pub const DEFAULT_ADDRESS: u8 = 0x51;

/// Initialization settings applied by [`PCF2129::configure`].
///
/// The [`Default`] is the low-power setup: 24-hour mode, watchdog off with
/// its slowest source clock, CLKOUT disabled, slowest temperature
/// compensation, timestamps off and no battery-low interrupt.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub time_representation: TimeRepresentation,
    pub watchdog_interrupt: WatchdogInterrupt,
    pub watchdog_source_clock: TimerSourceClock,
    pub clock_out_frequency: ClockOutFrequency,
    pub temperature_period: TemperatureMeasurementPeriod,
    pub timestamp_enabled: bool,
    pub battery_low_interrupt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_representation: TimeRepresentation::TwentyFourHour,
            watchdog_interrupt: WatchdogInterrupt::Permanent,
            watchdog_source_clock: TimerSourceClock::PerMinute,
            clock_out_frequency: ClockOutFrequency::Disabled,
            temperature_period: TemperatureMeasurementPeriod::Minutes4,
            timestamp_enabled: false,
            battery_low_interrupt: false,
        }
    }
}

impl Config {
    pub(crate) fn watchdog_control(&self) -> WatchdogControl {
        let mut value = WatchdogControl::default();
        value.set_watchdog_enable(false);
        value.set_interrupt_mode(self.watchdog_interrupt);
        value.set_source_clock(self.watchdog_source_clock);
        value
    }

    // OTPR clear; the caller sets it for the refresh write
    pub(crate) fn clock_out_control(&self) -> ClockOutControl {
        let mut value = ClockOutControl::default();
        value.set_temperature_period(self.temperature_period);
        value.set_frequency(self.clock_out_frequency);
        value
    }

    pub(crate) fn timestamp_control(&self) -> TimestampControl {
        let mut value = TimestampControl::default();
        value.set_disabled(!self.timestamp_enabled);
        value
    }
}

/// Errors returned by the PCF2129 driver.
#[derive(Debug)]
pub enum PCF2129Error<I2CE> {
    /// The underlying bus reported an error (NACK, arbitration loss, timeout, ...)
    I2c(I2CE),
    /// The device did not pass the presence check
    DeviceNotResponding,
    /// A calendar value could not be converted
    DateTime(CalendarError),
}

impl<I2CE> From<I2CE> for PCF2129Error<I2CE> {
    fn from(e: I2CE) -> Self {
        PCF2129Error::I2c(e)
    }
}

/// Returns true when a bus error means nothing answered at the address.
pub(crate) fn is_no_acknowledge<E: embedded_hal::i2c::Error>(e: &E) -> bool {
    matches!(e.kind(), ErrorKind::NoAcknowledge(_))
}

/// PCF2129 real-time clock driver.
///
/// Every accessor is a single bus transaction except the mode setters and
/// [`configure`](Self::configure), which read-modify-write control registers
/// on the device. No register contents are cached.
pub struct PCF2129<I2C: I2c> {
    i2c: I2C,
    address: u8,
    poll_flag: Option<&'static PollFlag>,
}

impl<I2C: I2c> PCF2129<I2C> {
    /// Creates a new driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (typically [`DEFAULT_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            poll_flag: None,
        }
    }

    /// Attaches the flag set by the INT line's interrupt handler.
    #[must_use]
    pub fn with_poll_flag(self, flag: &'static PollFlag) -> Self {
        Self {
            poll_flag: Some(flag),
            ..self
        }
    }

    /// Returns and clears a pending poll request from the interrupt handler.
    ///
    /// Always `false` when no [`PollFlag`] is attached.
    pub fn poll_requested(&self) -> bool {
        self.poll_flag.is_some_and(PollFlag::take)
    }

    /// Reads one register.
    pub fn read_register(&mut self, register: RegAddr) -> Result<u8, PCF2129Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[register as u8], &mut data)?;
        Ok(data[0])
    }

    /// Writes one register. The value is not read back.
    pub fn write_register(
        &mut self,
        register: RegAddr,
        value: u8,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        debug!("PCF2129: writing {:?}={}", register, value);
        self.i2c.write(self.address, &[register as u8, value])?;
        Ok(())
    }

    /// Checks whether a PCF2129 answers at the configured address.
    ///
    /// Reads control register 1 and expects EXT_TEST (bit 7) to be clear, as
    /// it is on any running device. This is a heuristic, not an identity
    /// check.
    ///
    /// # Returns
    /// * `Ok(true)` if the device responded with a plausible value
    /// * `Ok(false)` if the address was not acknowledged or EXT_TEST was set
    /// * `Err(PCF2129Error::I2c)` on any other bus error
    pub fn probe_device(&mut self) -> Result<bool, PCF2129Error<I2C::Error>> {
        let mut data = [0];
        match self
            .i2c
            .write_read(self.address, &[RegAddr::Control1 as u8], &mut data)
        {
            Ok(()) => Ok(!Control1::from(data[0]).ext_test()),
            Err(e) if is_no_acknowledge(&e) => {
                error!("PCF2129: no acknowledge at address {}", self.address);
                Ok(false)
            }
            Err(e) => Err(PCF2129Error::I2c(e)),
        }
    }

    /// Like [`probe_device`](Self::probe_device), but reports absence as an error.
    pub fn probe(&mut self) -> Result<(), PCF2129Error<I2C::Error>> {
        if self.probe_device()? {
            Ok(())
        } else {
            Err(PCF2129Error::DeviceNotResponding)
        }
    }

    /// Runs the initialization sequence.
    ///
    /// Writes the watchdog control, sets the hour mode, programs CLKOUT and
    /// triggers the OTP refresh, sets timestamp capture and finally the
    /// battery-low interrupt enable.
    pub fn configure(&mut self, config: &Config) -> Result<(), PCF2129Error<I2C::Error>> {
        let watchdog = config.watchdog_control();
        debug!("PCF2129: writing watchdog control: {:?}", watchdog);
        self.set_watchdog_control(watchdog)?;

        self.set_time_representation(config.time_representation)?;

        let mut clock_out = config.clock_out_control();
        debug!("PCF2129: writing clock out control: {:?}", clock_out);
        self.set_clock_out_control(clock_out)?;
        clock_out.set_otp_refresh(true);
        self.set_clock_out_control(clock_out)?;

        let timestamp = config.timestamp_control();
        debug!("PCF2129: writing timestamp control: {:?}", timestamp);
        self.set_timestamp_control(timestamp)?;

        let mut control = self.control_3()?;
        control.set_battery_low_interrupt_enable(config.battery_low_interrupt);
        debug!("PCF2129: writing control 3: {:?}", control);
        self.set_control_3(control)?;
        Ok(())
    }

    /// Reads one time-keeping field as a decimal value.
    pub fn field(&mut self, field: Field) -> Result<u8, PCF2129Error<I2C::Error>> {
        let raw = self.read_register(field.spec().register)?;
        Ok(field.decode(raw))
    }

    /// Writes one time-keeping field.
    ///
    /// Out-of-range values are clamped to the field's minimum; writing the
    /// seconds always sets the oscillator-stop flag bit.
    pub fn set_field(&mut self, field: Field, value: u8) -> Result<(), PCF2129Error<I2C::Error>> {
        self.write_register(field.spec().register, field.encode(value))
    }

    /// Reads all time-keeping registers in one burst.
    ///
    /// A single transaction keeps the fields consistent across a rollover.
    pub fn datetime(&mut self) -> Result<CalendarTime, PCF2129Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)?;
        Ok(data.into())
    }

    /// Writes all time-keeping registers in one burst.
    ///
    /// The weekday register is written as zero.
    pub fn set_datetime(&mut self, datetime: &CalendarTime) -> Result<(), PCF2129Error<I2C::Error>> {
        let data: [u8; 7] = datetime.into();
        debug!("PCF2129: writing datetime {:?} as {:?}", datetime, data);
        self.i2c.write(
            self.address,
            &[
                RegAddr::Seconds as u8,
                data[0],
                data[1],
                data[2],
                data[3],
                data[4],
                data[5],
                data[6],
            ],
        )?;
        Ok(())
    }

    /// Reads the current date and time as a chrono `NaiveDateTime`.
    pub fn naive_datetime(&mut self) -> Result<NaiveDateTime, PCF2129Error<I2C::Error>> {
        self.datetime()?
            .to_naive_datetime()
            .map_err(PCF2129Error::DateTime)
    }

    /// Sets the date and time from a chrono `NaiveDateTime` (years 2000-2099).
    pub fn set_naive_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        let datetime = CalendarTime::try_from(datetime).map_err(PCF2129Error::DateTime)?;
        self.set_datetime(&datetime)
    }

    /// Switches the hours register to 12-hour format.
    pub fn set_twelve_hour_mode(&mut self) -> Result<(), PCF2129Error<I2C::Error>> {
        self.set_time_representation(TimeRepresentation::TwelveHour)
    }

    /// Switches the hours register to 24-hour format.
    pub fn set_twenty_four_hour_mode(&mut self) -> Result<(), PCF2129Error<I2C::Error>> {
        self.set_time_representation(TimeRepresentation::TwentyFourHour)
    }

    /// Reads the hour format from control register 1.
    pub fn time_representation(&mut self) -> Result<TimeRepresentation, PCF2129Error<I2C::Error>> {
        Ok(self.control_1()?.time_representation())
    }

    fn set_time_representation(
        &mut self,
        time_representation: TimeRepresentation,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        let mut control = self.control_1()?;
        control.set_time_representation(time_representation);
        debug!("PCF2129: writing control 1: {:?}", control);
        self.set_control_1(control)
    }

    /// Returns whether the battery-low flag (BLF) is set.
    pub fn battery_low(&mut self) -> Result<bool, PCF2129Error<I2C::Error>> {
        Ok(self.control_3()?.battery_low_flag())
    }

    /// Returns whether the oscillator-stop flag is set in the seconds register.
    pub fn oscillator_stopped(&mut self) -> Result<bool, PCF2129Error<I2C::Error>> {
        let seconds = Seconds::from(self.read_register(RegAddr::Seconds)?);
        Ok(seconds.oscillator_stop_flag())
    }
}

// Typed access to the control and configuration registers
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> PCF2129<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, PCF2129Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), PCF2129Error<I2C::Error>> {
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control_1, RegAddr::Control1, Control1),
    (control_2, RegAddr::Control2, Control2),
    (control_3, RegAddr::Control3, Control3),
    (clock_out_control, RegAddr::ClockOutControl, ClockOutControl),
    (watchdog_control, RegAddr::WatchdogControl, WatchdogControl),
    (timestamp_control, RegAddr::TimestampControl, TimestampControl),
    (aging_offset, RegAddr::AgingOffset, AgingOffset)
);

// Decimal access to the time-keeping fields
macro_rules! impl_field_access {
    ($(($name:ident, $field:expr)),+) => {
        impl<I2C: I2c> PCF2129<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " field as a decimal value.")]
                    pub fn $name(&mut self) -> Result<u8, PCF2129Error<I2C::Error>> {
                        self.field($field)
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " field, clamping out-of-range values.")]
                    pub fn [<set_ $name>](&mut self, value: u8) -> Result<(), PCF2129Error<I2C::Error>> {
                        self.set_field($field, value)
                    }
                }
            )+
        }
    }
}

impl_field_access!(
    (seconds, Field::Seconds),
    (minutes, Field::Minutes),
    (hours, Field::Hours),
    (day, Field::Day),
    (weekday, Field::Weekday),
    (month, Field::Month),
    (year, Field::Year)
);
