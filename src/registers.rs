//! Register definitions and bitfield structures for the PCF2129 RTC.
//!
//! This module contains the register address map and bitfield definitions for
//! the control and configuration registers. The time-keeping registers are
//! plain BCD and are handled through [`Field`](crate::Field), except for
//! [`Seconds`] whose top bit doubles as the oscillator-stop flag.

use bitfield::bitfield;

/// Register addresses for the PCF2129 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Control register 1
    Control1 = 0x00,
    /// Control register 2
    Control2 = 0x01,
    /// Control register 3
    Control3 = 0x02,
    /// Seconds register (0-59) and oscillator-stop flag
    Seconds = 0x03,
    /// Minutes register (0-59)
    Minutes = 0x04,
    /// Hours register (0-23, or 1-12 + AM/PM)
    Hours = 0x05,
    /// Day of month register (1-31)
    Days = 0x06,
    /// Weekday register (0-6)
    Weekdays = 0x07,
    /// Month register (1-12)
    Months = 0x08,
    /// Year register (0-99)
    Years = 0x09,
    /// Second alarm register
    SecondAlarm = 0x0A,
    /// Minute alarm register
    MinuteAlarm = 0x0B,
    /// Hour alarm register
    HourAlarm = 0x0C,
    /// Day alarm register
    DayAlarm = 0x0D,
    /// Weekday alarm register
    WeekdayAlarm = 0x0E,
    /// CLKOUT control register
    ClockOutControl = 0x0F,
    /// Watchdog timer control register
    WatchdogControl = 0x10,
    /// Watchdog timer value register
    WatchdogValue = 0x11,
    /// Timestamp control register
    TimestampControl = 0x12,
    /// Timestamp seconds
    SecondTimestamp = 0x13,
    /// Timestamp minutes
    MinuteTimestamp = 0x14,
    /// Timestamp hours
    HourTimestamp = 0x15,
    /// Timestamp day
    DayTimestamp = 0x16,
    /// Timestamp month
    MonthTimestamp = 0x17,
    /// Timestamp year
    YearTimestamp = 0x18,
    /// Aging offset register
    AgingOffset = 0x19,
    /// Internal register
    Internal1 = 0x1A,
    /// Internal register
    Internal2 = 0x1B,
}

/// Hour format selected by control register 1, bit 2.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimeRepresentation::TwentyFourHour,
            1 => TimeRepresentation::TwelveHour,
            _ => panic!("Invalid value for TimeRepresentation: {}", v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Frequency driven on the CLKOUT pin (COF\[2:0\]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockOutFrequency {
    /// 32.768 kHz
    Hz32768 = 0b000,
    /// 16.384 kHz
    Hz16384 = 0b001,
    /// 8.192 kHz
    Hz8192 = 0b010,
    /// 4.096 kHz
    Hz4096 = 0b011,
    /// 2.048 kHz
    Hz2048 = 0b100,
    /// 1.024 kHz
    Hz1024 = 0b101,
    /// 1 Hz
    Hz1 = 0b110,
    /// CLKOUT disabled (high impedance)
    Disabled = 0b111,
}
impl From<u8> for ClockOutFrequency {
    /// Creates a `ClockOutFrequency` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value does not fit in three bits.
    fn from(v: u8) -> Self {
        match v {
            0b000 => ClockOutFrequency::Hz32768,
            0b001 => ClockOutFrequency::Hz16384,
            0b010 => ClockOutFrequency::Hz8192,
            0b011 => ClockOutFrequency::Hz4096,
            0b100 => ClockOutFrequency::Hz2048,
            0b101 => ClockOutFrequency::Hz1024,
            0b110 => ClockOutFrequency::Hz1,
            0b111 => ClockOutFrequency::Disabled,
            _ => panic!("Invalid value for ClockOutFrequency: {}", v),
        }
    }
}
impl From<ClockOutFrequency> for u8 {
    fn from(v: ClockOutFrequency) -> Self {
        v as u8
    }
}

/// Temperature measurement period (TCR\[1:0\]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureMeasurementPeriod {
    /// Every 4 minutes
    Minutes4 = 0b00,
    /// Every 2 minutes
    Minutes2 = 0b01,
    /// Every minute
    Minutes1 = 0b10,
    /// Every 30 seconds
    Seconds30 = 0b11,
}
impl From<u8> for TemperatureMeasurementPeriod {
    /// Creates a `TemperatureMeasurementPeriod` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value does not fit in two bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 => TemperatureMeasurementPeriod::Minutes4,
            0b01 => TemperatureMeasurementPeriod::Minutes2,
            0b10 => TemperatureMeasurementPeriod::Minutes1,
            0b11 => TemperatureMeasurementPeriod::Seconds30,
            _ => panic!("Invalid value for TemperatureMeasurementPeriod: {}", v),
        }
    }
}
impl From<TemperatureMeasurementPeriod> for u8 {
    fn from(v: TemperatureMeasurementPeriod) -> Self {
        v as u8
    }
}

/// Watchdog timer source clock (TF\[1:0\]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerSourceClock {
    /// 4.096 kHz
    Hz4096 = 0b00,
    /// 64 Hz
    Hz64 = 0b01,
    /// 1 Hz
    Hz1 = 0b10,
    /// 1/60 Hz
    PerMinute = 0b11,
}
impl From<u8> for TimerSourceClock {
    /// Creates a `TimerSourceClock` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value does not fit in two bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 => TimerSourceClock::Hz4096,
            0b01 => TimerSourceClock::Hz64,
            0b10 => TimerSourceClock::Hz1,
            0b11 => TimerSourceClock::PerMinute,
            _ => panic!("Invalid value for TimerSourceClock: {}", v),
        }
    }
}
impl From<TimerSourceClock> for u8 {
    fn from(v: TimerSourceClock) -> Self {
        v as u8
    }
}

/// Shape of the interrupt pulse generated by the watchdog timer (TI_TP).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogInterrupt {
    /// INT follows the timer flag until it is cleared
    Permanent = 0,
    /// INT generates a pulse
    Pulsed = 1,
}
impl From<u8> for WatchdogInterrupt {
    /// Creates a `WatchdogInterrupt` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => WatchdogInterrupt::Permanent,
            1 => WatchdogInterrupt::Pulsed,
            _ => panic!("Invalid value for WatchdogInterrupt: {}", v),
        }
    }
}
impl From<WatchdogInterrupt> for u8 {
    fn from(v: WatchdogInterrupt) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

// Control registers are logged as their raw bit pattern
macro_rules! defmt_register_bits {
    ($typ:ty) => {
        #[cfg(feature = "defmt")]
        impl defmt::Format for $typ {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{}({=u8:#b})", stringify!($typ), self.0);
            }
        }
    };
}

bitfield! {
    /// Control register 1.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control1(u8);
    impl Debug;
    /// External clock test mode; always clear on a working device
    pub ext_test, set_ext_test: 7;
    /// RTC clock stopped
    pub stop, set_stop: 5;
    /// Timestamp flag 1
    pub timestamp_flag1, set_timestamp_flag1: 4;
    /// Power-on reset override
    pub por_override, set_por_override: 3;
    /// 12/24 hour mode
    pub from into TimeRepresentation, time_representation, set_time_representation: 2, 2;
    /// Minute interrupt enable
    pub minute_interrupt, set_minute_interrupt: 1;
    /// Second interrupt enable
    pub second_interrupt, set_second_interrupt: 0;
}
from_register_u8!(Control1);
defmt_register_bits!(Control1);

bitfield! {
    /// Control register 2.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control2(u8);
    impl Debug;
    /// Minute or second interrupt flag
    pub minute_second_flag, set_minute_second_flag: 7;
    /// Watchdog timer flag
    pub watchdog_flag, set_watchdog_flag: 6;
    /// Timestamp flag 2
    pub timestamp_flag2, set_timestamp_flag2: 5;
    /// Alarm flag
    pub alarm_flag, set_alarm_flag: 4;
    /// Timestamp interrupt enable
    pub timestamp_interrupt_enable, set_timestamp_interrupt_enable: 2;
    /// Alarm interrupt enable
    pub alarm_interrupt_enable, set_alarm_interrupt_enable: 1;
}
from_register_u8!(Control2);
defmt_register_bits!(Control2);

bitfield! {
    /// Control register 3: power management and battery status.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control3(u8);
    impl Debug;
    /// Battery switch-over and low detection mode (PWRMNG\[2:0\])
    pub power_management, set_power_management: 7, 5;
    /// Timestamp on battery switch-over enable
    pub battery_timestamp_enable, set_battery_timestamp_enable: 4;
    /// Battery switch-over flag
    pub battery_switch_over_flag, set_battery_switch_over_flag: 3;
    /// Battery low flag
    pub battery_low_flag, set_battery_low_flag: 2;
    /// Battery switch-over interrupt enable
    pub battery_interrupt_enable, set_battery_interrupt_enable: 1;
    /// Battery low interrupt enable
    pub battery_low_interrupt_enable, set_battery_low_interrupt_enable: 0;
}
from_register_u8!(Control3);
defmt_register_bits!(Control3);

bitfield! {
    /// Seconds register: BCD seconds plus the oscillator-stop flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Oscillator stop flag
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        let seconds = 10 * self.ten_seconds() + self.seconds();
        defmt::write!(f, "Seconds({}s", seconds);
        if self.oscillator_stop_flag() {
            defmt::write!(f, ", OSF");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// CLKOUT control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct ClockOutControl(u8);
    impl Debug;
    /// Temperature measurement period
    pub from into TemperatureMeasurementPeriod, temperature_period, set_temperature_period: 7, 6;
    /// One-time-programmable refresh trigger
    pub otp_refresh, set_otp_refresh: 5;
    /// CLKOUT frequency selection
    pub from into ClockOutFrequency, frequency, set_frequency: 2, 0;
}
from_register_u8!(ClockOutControl);
defmt_register_bits!(ClockOutControl);

bitfield! {
    /// Watchdog timer control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct WatchdogControl(u8);
    impl Debug;
    /// Watchdog timer enable
    pub watchdog_enable, set_watchdog_enable: 7;
    /// Interrupt pulse mode
    pub from into WatchdogInterrupt, interrupt_mode, set_interrupt_mode: 5, 5;
    /// Timer source clock
    pub from into TimerSourceClock, source_clock, set_source_clock: 1, 0;
}
from_register_u8!(WatchdogControl);
defmt_register_bits!(WatchdogControl);

bitfield! {
    /// Timestamp control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TimestampControl(u8);
    impl Debug;
    /// Timestamp mode (TSM): keep the first event when set, the last when clear
    pub first_event, set_first_event: 7;
    /// Timestamp function disabled
    pub disabled, set_disabled: 6;
    /// 1/16 second timestamp
    pub sixteenth_seconds, set_sixteenth_seconds: 3, 0;
}
from_register_u8!(TimestampControl);
defmt_register_bits!(TimestampControl);

bitfield! {
    /// Aging offset register for crystal adjustment.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AgingOffset(u8);
    impl Debug;
    /// Aging offset step (0-15)
    pub offset, set_offset: 3, 0;
}
from_register_u8!(AgingOffset);

#[cfg(feature = "defmt")]
impl defmt::Format for AgingOffset {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AgingOffset({})", self.offset());
    }
}
