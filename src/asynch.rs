//! Async implementation of the PCF2129 driver.
//!
//! This module provides an async interface to the PCF2129 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use pcf2129::asynch::PCF2129;
//!
//! // Initialize device
//! let mut rtc = PCF2129::new(i2c, pcf2129::DEFAULT_ADDRESS);
//!
//! // Configure asynchronously
//! rtc.configure(&Config::default()).await?;
//!
//! // Get current date/time asynchronously
//! let datetime = rtc.datetime().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::{
    is_no_acknowledge, AgingOffset, CalendarTime, ClockOutControl, Config, Control1, Control2,
    Control3, Field, PCF2129Error, PollFlag, RegAddr, Seconds, TimeRepresentation,
    TimestampControl, WatchdogControl,
};

/// PCF2129 Real-Time Clock async driver.
///
/// This struct provides the async interface to the PCF2129 RTC device.
/// It supports async I2C operations through the `embedded-hal-async` traits.
pub struct PCF2129<I2C: I2c> {
    i2c: I2C,
    address: u8,
    poll_flag: Option<&'static PollFlag>,
}

impl<I2C: I2c> PCF2129<I2C> {
    /// Creates a new PCF2129 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x51)
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
    pub fn poll_requested(&self) -> bool {
        self.poll_flag.is_some_and(PollFlag::take)
    }

    /// Reads one register.
    ///
    /// # Returns
    /// * `Ok(u8)` - The raw register value on success
    /// * `Err(PCF2129Error)` on error
    pub async fn read_register(
        &mut self,
        register: RegAddr,
    ) -> Result<u8, PCF2129Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[register as u8], &mut data)
            .await?;
        Ok(data[0])
    }

    /// Writes one register.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(PCF2129Error)` on error
    pub async fn write_register(
        &mut self,
        register: RegAddr,
        value: u8,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        debug!("PCF2129: writing {:?}={}", register, value);
        self.i2c
            .write(self.address, &[register as u8, value])
            .await?;
        Ok(())
    }

    /// Checks whether a PCF2129 answers at the configured address.
    ///
    /// # Returns
    /// * `Ok(true)` if control register 1 reads back with EXT_TEST clear
    /// * `Ok(false)` if the address was not acknowledged or EXT_TEST was set
    /// * `Err(PCF2129Error)` on any other bus error
    pub async fn probe_device(&mut self) -> Result<bool, PCF2129Error<I2C::Error>> {
        let mut data = [0];
        match self
            .i2c
            .write_read(self.address, &[RegAddr::Control1 as u8], &mut data)
            .await
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
    pub async fn probe(&mut self) -> Result<(), PCF2129Error<I2C::Error>> {
        if self.probe_device().await? {
            Ok(())
        } else {
            Err(PCF2129Error::DeviceNotResponding)
        }
    }

    /// Runs the initialization sequence described by `config`.
    ///
    /// # Arguments
    /// * `config` - The configuration to apply
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(PCF2129Error)` on error
    pub async fn configure(&mut self, config: &Config) -> Result<(), PCF2129Error<I2C::Error>> {
        let watchdog = config.watchdog_control();
        debug!("PCF2129: writing watchdog control: {:?}", watchdog);
        self.set_watchdog_control(watchdog).await?;

        self.set_time_representation(config.time_representation)
            .await?;

        let mut clock_out = config.clock_out_control();
        debug!("PCF2129: writing clock out control: {:?}", clock_out);
        self.set_clock_out_control(clock_out).await?;
        clock_out.set_otp_refresh(true);
        self.set_clock_out_control(clock_out).await?;

        let timestamp = config.timestamp_control();
        debug!("PCF2129: writing timestamp control: {:?}", timestamp);
        self.set_timestamp_control(timestamp).await?;

        let mut control = self.control_3().await?;
        control.set_battery_low_interrupt_enable(config.battery_low_interrupt);
        debug!("PCF2129: writing control 3: {:?}", control);
        self.set_control_3(control).await?;
        Ok(())
    }

    /// Reads one time-keeping field as a decimal value.
    pub async fn field(&mut self, field: Field) -> Result<u8, PCF2129Error<I2C::Error>> {
        let raw = self.read_register(field.spec().register).await?;
        Ok(field.decode(raw))
    }

    /// Writes one time-keeping field, clamping out-of-range values.
    pub async fn set_field(
        &mut self,
        field: Field,
        value: u8,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        self.write_register(field.spec().register, field.encode(value))
            .await
    }

    /// Gets the current date and time from the device in one burst read.
    ///
    /// # Returns
    /// * `Ok(CalendarTime)` - The current date and time
    /// * `Err(PCF2129Error)` on error
    pub async fn datetime(&mut self) -> Result<CalendarTime, PCF2129Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .await?;
        Ok(data.into())
    }

    /// Sets the current date and time on the device in one burst write.
    ///
    /// # Arguments
    /// * `datetime` - The date and time to set
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(PCF2129Error)` on error
    pub async fn set_datetime(
        &mut self,
        datetime: &CalendarTime,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        let data: [u8; 7] = datetime.into();
        debug!("PCF2129: writing datetime {:?} as {:?}", datetime, data);
        self.i2c
            .write(
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
            )
            .await?;
        Ok(())
    }

    /// Reads the current date and time as a chrono `NaiveDateTime`.
    pub async fn naive_datetime(&mut self) -> Result<NaiveDateTime, PCF2129Error<I2C::Error>> {
        self.datetime()
            .await?
            .to_naive_datetime()
            .map_err(PCF2129Error::DateTime)
    }

    /// Sets the date and time from a chrono `NaiveDateTime` (years 2000-2099).
    pub async fn set_naive_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        let datetime = CalendarTime::try_from(datetime).map_err(PCF2129Error::DateTime)?;
        self.set_datetime(&datetime).await
    }

    /// Switches the hours register to 12-hour format.
    pub async fn set_twelve_hour_mode(&mut self) -> Result<(), PCF2129Error<I2C::Error>> {
        self.set_time_representation(TimeRepresentation::TwelveHour)
            .await
    }

    /// Switches the hours register to 24-hour format.
    pub async fn set_twenty_four_hour_mode(&mut self) -> Result<(), PCF2129Error<I2C::Error>> {
        self.set_time_representation(TimeRepresentation::TwentyFourHour)
            .await
    }

    /// Reads the hour format from control register 1.
    pub async fn time_representation(
        &mut self,
    ) -> Result<TimeRepresentation, PCF2129Error<I2C::Error>> {
        Ok(self.control_1().await?.time_representation())
    }

    async fn set_time_representation(
        &mut self,
        time_representation: TimeRepresentation,
    ) -> Result<(), PCF2129Error<I2C::Error>> {
        let mut control = self.control_1().await?;
        control.set_time_representation(time_representation);
        debug!("PCF2129: writing control 1: {:?}", control);
        self.set_control_1(control).await
    }

    /// Returns whether the battery-low flag (BLF) is set.
    pub async fn battery_low(&mut self) -> Result<bool, PCF2129Error<I2C::Error>> {
        Ok(self.control_3().await?.battery_low_flag())
    }

    /// Returns whether the oscillator-stop flag is set in the seconds register.
    pub async fn oscillator_stopped(&mut self) -> Result<bool, PCF2129Error<I2C::Error>> {
        let seconds = Seconds::from(self.read_register(RegAddr::Seconds).await?);
        Ok(seconds.oscillator_stop_flag())
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> PCF2129<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Returns"]
                    #[doc = concat!("* `Ok(", stringify!($typ), ")` - The register value on success")]
                    #[doc = "* `Err(PCF2129Error)` on error"]
                    pub async fn $name(&mut self) -> Result<$typ, PCF2129Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Arguments"]
                    #[doc = concat!("* `value` - The value to write to the ", stringify!($name), " register")]
                    #[doc = "\n\n# Returns"]
                    #[doc = "* `Ok(())` on success"]
                    #[doc = "* `Err(PCF2129Error)` on error"]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), PCF2129Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
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

// Field access implementations
macro_rules! impl_field_access {
    ($(($name:ident, $field:expr)),+) => {
        impl<I2C: I2c> PCF2129<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " field as a decimal value.")]
                    pub async fn $name(&mut self) -> Result<u8, PCF2129Error<I2C::Error>> {
                        self.field($field).await
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " field, clamping out-of-range values.")]
                    pub async fn [<set_ $name>](&mut self, value: u8) -> Result<(), PCF2129Error<I2C::Error>> {
                        self.set_field($field, value).await
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

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::CalendarError;
    use alloc::vec;
    use chrono::{Datelike, NaiveDate, Timelike};
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x51;

    async fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[tokio::test]
    async fn test_async_probe() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0])
                .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        assert!(dev.probe_device().await.unwrap());
        assert!(matches!(
            dev.probe().await,
            Err(PCF2129Error::DeviceNotResponding)
        ));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_configure() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::WatchdogControl as u8, 0x03]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x04]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ClockOutControl as u8, 0x07]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ClockOutControl as u8, 0x27]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::TimestampControl as u8, 0x40]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control3 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control3 as u8, 0x00]),
        ])
        .await;

        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);
        dev.configure(&Config::default()).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_read_datetime() {
        // 2024-03-14 15:30:00
        let datetime_registers = [
            0x00, // seconds
            0x30, // minutes
            0x15, // hours (24-hour mode)
            0x14, // day
            0x04, // weekday (discarded)
            0x03, // month
            0x24, // year
        ];

        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            datetime_registers.to_vec(),
        )])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        let dt = dev.datetime().await.unwrap();
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.year(), 2024);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_set_datetime() {
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Seconds as u8,
                0x80, // seconds with OSF
                0x30, // minutes
                0x15, // hours
                0x14, // day
                0x00, // weekday placeholder
                0x03, // month
                0x24, // year
            ],
        )])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        dev.set_datetime(&CalendarTime::new(2024, 3, 14, 15, 30, 0))
            .await
            .unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_field_operations() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0xC5]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8, 0x80]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Days as u8, 0x01]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Months as u8], vec![0x12]),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        assert_eq!(dev.seconds().await.unwrap(), 45);
        dev.set_seconds(75).await.unwrap();
        dev.set_day(0).await.unwrap();
        assert_eq!(dev.month().await.unwrap(), 12);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_mode_and_status() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x01]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0x05]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x05]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0x01]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control3 as u8], vec![0x04]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0x80]),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        dev.set_twelve_hour_mode().await.unwrap();
        dev.set_twenty_four_hour_mode().await.unwrap();
        assert!(dev.battery_low().await.unwrap());
        assert!(dev.oscillator_stopped().await.unwrap());
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_probe_bus_error_propagates() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Control1 as u8],
            vec![0],
        )
        .with_error(ErrorKind::Bus)])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        assert!(matches!(
            dev.probe_device().await,
            Err(PCF2129Error::I2c(ErrorKind::Bus))
        ));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_read_write_register() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8], vec![0x08]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8, 0x05]),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        assert_eq!(dev.read_register(RegAddr::AgingOffset).await.unwrap(), 0x08);
        dev.write_register(RegAddr::AgingOffset, 0x05).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_naive_datetime() {
        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                vec![0x00, 0x30, 0x15, 0x14, 0x04, 0x03, 0x24],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8, 0x80, 0x30, 0x15, 0x14, 0x00, 0x03, 0x24],
            ),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        let dt = dev.naive_datetime().await.unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        dev.set_naive_datetime(&dt).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_naive_datetime_errors() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x00, 0x00, 0x00, 0x30, 0x00, 0x02, 0x23], // February 30th
        )])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        assert!(matches!(
            dev.naive_datetime().await,
            Err(PCF2129Error::DateTime(CalendarError::InvalidDateTime))
        ));

        let dt = NaiveDate::from_ymd_opt(2100, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            dev.set_naive_datetime(&dt).await,
            Err(PCF2129Error::DateTime(CalendarError::YearOutOfRange))
        ));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_time_representation() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x04]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x00]),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        assert_eq!(
            dev.time_representation().await.unwrap(),
            TimeRepresentation::TwelveHour
        );
        assert_eq!(
            dev.time_representation().await.unwrap(),
            TimeRepresentation::TwentyFourHour
        );
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_typed_register_access() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8], vec![0x12]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8, 0x02]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8], vec![0x08]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::WatchdogControl as u8], vec![0x23]),
        ])
        .await;
        let mut dev = PCF2129::new(mock, DEVICE_ADDRESS);

        let mut control = dev.control_2().await.unwrap();
        assert!(control.alarm_flag());
        assert!(control.alarm_interrupt_enable());
        control.set_alarm_flag(false);
        dev.set_control_2(control).await.unwrap();
        assert_eq!(dev.aging_offset().await.unwrap().offset(), 8);
        assert_eq!(
            dev.watchdog_control().await.unwrap().source_clock(),
            crate::TimerSourceClock::PerMinute
        );
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_poll_requested() {
        static FLAG: PollFlag = PollFlag::new();

        let mut dev = PCF2129::new(setup_mock(&[]).await, DEVICE_ADDRESS);
        assert!(!dev.poll_requested());
        dev.i2c.done();

        let mut dev = PCF2129::new(setup_mock(&[]).await, DEVICE_ADDRESS).with_poll_flag(&FLAG);
        assert!(!dev.poll_requested());
        FLAG.signal();
        assert!(dev.poll_requested());
        assert!(!dev.poll_requested());
        dev.i2c.done();
    }
}
