//! Platform-agnostic driver for the TI OPT4048 tristimulus XYZ color sensor.
//!
//! The OPT4048 measures light on four channels, each reported as a
//! mantissa/exponent pair with a sample counter and a checksum. This driver
//! talks to it over any [`embedded_hal::i2c::I2c`] bus and converts raw
//! channel counts into CIE XYZ, sRGB, and correlated color temperature.
//!
//! ## Features
//! - Identity check and configuration management over I2C.
//! - Combined four-channel read with per-channel CRC validation.
//! - Pure color pipeline: XYZ, chromaticity, sRGB, CCT ([`color`]).
//! - Bit-exact register codec, usable standalone ([`registers`]).
//! - Optional `defmt` formatting and `embedded-graphics` color interop.
//!
//! ## Usage
//!
//! 1. Instantiate your platform's HAL implementation of the I2C bus.
//! 2. Create the driver with [`Opt4048::new`] at one of the four strap
//!    addresses.
//! 3. Call [`Opt4048::init`] — it verifies the device identity and puts the
//!    sensor into continuous conversion.
//! 4. Poll with [`Opt4048::read`] (raw channels) or the convenience readers
//!    ([`Opt4048::read_xyz`], [`Opt4048::read_rgb`], [`Opt4048::read_cct`]).
//!
//! ```no_run
//! # use embedded_hal::i2c::{self, I2c, SevenBitAddress};
//! # #[derive(Debug)] struct BusError;
//! # impl i2c::Error for BusError { fn kind(&self) -> i2c::ErrorKind { i2c::ErrorKind::Other } }
//! # struct Bus;
//! # impl i2c::ErrorType for Bus { type Error = BusError; }
//! # impl I2c for Bus { fn transaction(&mut self, _: SevenBitAddress, _: &mut [i2c::Operation<'_>]) -> Result<(), BusError> { Ok(()) } }
//! # let i2c = Bus;
//! use opt4048::{Opt4048, Range, ADDR_GND};
//!
//! let mut sensor = Opt4048::new(i2c, ADDR_GND);
//! sensor.init().expect("no OPT4048 on the bus");
//! sensor.set_range(Range::Auto).expect("config write failed");
//!
//! let xyz = sensor.read_xyz().expect("read failed");
//! if let Some(chroma) = xyz.chromaticity() {
//!     let hex = chroma.to_rgb().to_bytes();
//!     let kelvin = chroma.cct();
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod color;
pub mod registers;

use embedded_hal::i2c::I2c;

pub use color::{Chromaticity, Rgb, Xyz};
pub use registers::{
    ChannelSet, Config, ConversionTime, FaultCount, Flags, IntConfig, OperatingMode, Range,
    RawChannel, Threshold, ThresholdChannel,
};

use registers::addr;

/// Bus address with the ADDR pin strapped to ground.
pub const ADDR_GND: u8 = 0b100_0100;
/// Bus address with the ADDR pin strapped to the supply rail.
pub const ADDR_VDD: u8 = 0b100_0101;
/// Bus address with the ADDR pin strapped to SDA.
pub const ADDR_SDA: u8 = 0b100_0110;
/// Bus address with the ADDR pin strapped to SCL.
pub const ADDR_SCL: u8 = 0b100_0111;

/// Identity word the device answers from its ID register.
pub const DEVICE_ID: u16 = 0x0821;

const CHANNEL_READ_LEN: usize = 16;

/// Error type for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C bus error.
    I2c(E),
    /// The device did not identify as an OPT4048. Unrecoverable for this
    /// address; the caller decides whether to report or probe elsewhere.
    UnknownDevice { expected: u16, found: u16 },
    /// The operation requires a successful [`Opt4048::init`] first.
    NotInitialized,
    /// A channel reading failed its checksum.
    Crc { channel: u8 },
}

/// OPT4048 driver.
///
/// Owns the bus handle and a cache of the device configuration. The cache
/// and the physical registers agree after every successful setter call; a
/// failed write-back leaves the cache untouched, and [`Opt4048::read_config`]
/// re-derives it from the device at any time.
///
/// Not thread-safe: all operations take `&mut self` and block on the bus.
/// Wrap the driver in your own mutex if several contexts share it.
pub struct Opt4048<I2C> {
    i2c: I2C,
    address: u8,
    config: Config,
    verify_crc: bool,
    ready: bool,
}

impl<I2C, E> Opt4048<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a driver instance. Performs no bus traffic; call
    /// [`Opt4048::init`] before anything else.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            config: Config::default(),
            verify_crc: true,
            ready: false,
        }
    }

    /// Identify the sensor and bring it into continuous conversion.
    ///
    /// Reads the ID register and compares it against [`DEVICE_ID`]; a
    /// mismatch fails with [`Error::UnknownDevice`] and the driver stays
    /// unusable. On a match the current device configuration is read into
    /// the cache, the operating mode is set to
    /// [`OperatingMode::Continuous`], and the configuration is read back
    /// once more to confirm the write.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        let found = self.read_u16(addr::DEVICE_ID)?;
        if found != DEVICE_ID {
            return Err(Error::UnknownDevice {
                expected: DEVICE_ID,
                found,
            });
        }

        self.config = self.fetch_config()?;
        let mut cfg = self.config;
        cfg.operating_mode = OperatingMode::Continuous;
        self.write_config(&cfg)?;
        self.config = self.fetch_config()?;
        self.ready = true;
        Ok(())
    }

    /// Read all four channels in one 16-byte burst.
    ///
    /// The device streams the two 16-bit halves of each channel register
    /// MSB-first; they are reassembled into big-endian words here before
    /// decoding. While CRC verification is enabled (the default), each
    /// channel's checksum is recomputed and a mismatch fails with
    /// [`Error::Crc`].
    pub fn read(&mut self) -> Result<ChannelSet, Error<E>> {
        self.ensure_ready()?;

        let mut buf = [0u8; CHANNEL_READ_LEN];
        self.i2c
            .write_read(self.address, &[addr::CH0], &mut buf)
            .map_err(Error::I2c)?;

        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let set = ChannelSet {
            ch0: registers::unpack_channel(words[0]),
            ch1: registers::unpack_channel(words[1]),
            ch2: registers::unpack_channel(words[2]),
            ch3: registers::unpack_channel(words[3]),
        };

        if self.verify_crc {
            let channels = [set.ch0, set.ch1, set.ch2, set.ch3];
            for (i, ch) in channels.iter().enumerate() {
                if !ch.crc_ok() {
                    return Err(Error::Crc { channel: i as u8 });
                }
            }
        }

        Ok(set)
    }

    /// Read and convert to CIE tristimulus values.
    pub fn read_xyz(&mut self) -> Result<Xyz, Error<E>> {
        Ok(Xyz::from_channels(&self.read()?))
    }

    /// Read and convert to gamma-encoded sRGB.
    ///
    /// `Ok(None)` means the reading was fully dark and has no defined
    /// chromaticity.
    pub fn read_rgb(&mut self) -> Result<Option<Rgb>, Error<E>> {
        Ok(self.read_xyz()?.chromaticity().map(|c| c.to_rgb()))
    }

    /// Read and convert to correlated color temperature in kelvin.
    ///
    /// `Ok(None)` means the chromaticity was undefined or degenerate for
    /// the CCT approximation.
    pub fn read_cct(&mut self) -> Result<Option<f64>, Error<E>> {
        Ok(self.read_xyz()?.chromaticity().and_then(|c| c.cct()))
    }

    /// Read the status flag register.
    pub fn read_flags(&mut self) -> Result<Flags, Error<E>> {
        self.ensure_ready()?;
        Ok(registers::unpack_flags(self.read_u16(addr::FLAGS)?))
    }

    /// The cached configuration, as of the last successful read or
    /// write-back.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Re-read the configuration from the device, refreshing the cache.
    pub fn read_config(&mut self) -> Result<Config, Error<E>> {
        self.ensure_ready()?;
        self.config = self.fetch_config()?;
        Ok(self.config)
    }

    /// Read both threshold comparison levels.
    pub fn thresholds(&mut self) -> Result<(Threshold, Threshold), Error<E>> {
        self.ensure_ready()?;
        let low = registers::unpack_threshold(self.read_u16(addr::THRESHOLD_LOW)?);
        let high = registers::unpack_threshold(self.read_u16(addr::THRESHOLD_HIGH)?);
        Ok((low, high))
    }

    /// Write both threshold comparison levels.
    pub fn set_thresholds(&mut self, low: Threshold, high: Threshold) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.write_u16(addr::THRESHOLD_LOW, registers::pack_threshold(&low))?;
        self.write_u16(addr::THRESHOLD_HIGH, registers::pack_threshold(&high))
    }

    /// Set the full-scale range.
    pub fn set_range(&mut self, range: Range) -> Result<(), Error<E>> {
        self.update_config(|c| c.range = range)
    }

    /// Set the per-channel conversion time.
    pub fn set_conversion_time(&mut self, time: ConversionTime) -> Result<(), Error<E>> {
        self.update_config(|c| c.conversion_time = time)
    }

    /// Set the operating mode.
    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), Error<E>> {
        self.update_config(|c| c.operating_mode = mode)
    }

    /// Select the channel the threshold comparison applies to.
    pub fn set_threshold_channel(&mut self, channel: ThresholdChannel) -> Result<(), Error<E>> {
        self.update_config(|c| c.threshold_channel = channel)
    }

    /// Set how many consecutive faults assert the interrupt.
    pub fn set_fault_count(&mut self, count: FaultCount) -> Result<(), Error<E>> {
        self.update_config(|c| c.fault_count = count)
    }

    /// Enable or disable quick wake-up from standby.
    pub fn set_quick_wake(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.update_config(|c| c.quick_wake = enabled)
    }

    /// Configure the interrupt pin mechanism.
    pub fn set_int_config(&mut self, int_config: IntConfig) -> Result<(), Error<E>> {
        self.update_config(|c| c.int_config = int_config)
    }

    /// Set the interrupt pin polarity (true = active high).
    pub fn set_int_polarity(&mut self, active_high: bool) -> Result<(), Error<E>> {
        self.update_config(|c| c.int_polarity = active_high)
    }

    /// Set the interrupt pin direction (true = output).
    pub fn set_int_direction(&mut self, output: bool) -> Result<(), Error<E>> {
        self.update_config(|c| c.int_direction = output)
    }

    /// Latch threshold comparisons until the flag register is read.
    pub fn set_latch(&mut self, latched: bool) -> Result<(), Error<E>> {
        self.update_config(|c| c.latch = latched)
    }

    /// Enable or disable burst reads of the channel registers.
    pub fn set_i2c_burst(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.update_config(|c| c.i2c_burst = enabled)
    }

    /// Toggle per-channel CRC verification in [`Opt4048::read`].
    ///
    /// On by default. Readings always carry the transmitted checksum either
    /// way, so callers can still check [`RawChannel::crc_ok`] themselves.
    pub fn set_crc_verification(&mut self, enabled: bool) {
        self.verify_crc = enabled;
    }

    /// Release the underlying bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn ensure_ready(&self) -> Result<(), Error<E>> {
        if self.ready {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Apply one field mutation and write the whole configuration back.
    /// The cache is committed only after both register writes succeed.
    fn update_config(&mut self, mutate: impl FnOnce(&mut Config)) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        let mut next = self.config;
        mutate(&mut next);
        self.write_config(&next)?;
        self.config = next;
        Ok(())
    }

    fn fetch_config(&mut self) -> Result<Config, Error<E>> {
        let high = self.read_u16(addr::CONFIG_HIGH)?;
        let low = self.read_u16(addr::CONFIG_LOW)?;
        Ok(registers::unpack_config(((high as u32) << 16) | low as u32))
    }

    fn write_config(&mut self, cfg: &Config) -> Result<(), Error<E>> {
        let word = registers::pack_config(cfg);
        self.write_u16(addr::CONFIG_HIGH, (word >> 16) as u16)?;
        self.write_u16(addr::CONFIG_LOW, word as u16)
    }

    fn read_u16(&mut self, reg: u8) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_u16(&mut self, reg: u8, value: u16) -> Result<(), Error<E>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .map_err(Error::I2c)
    }
}

/// Prelude module for easy importing of common traits and types.
pub mod prelude {
    pub use embedded_hal::i2c::I2c;

    pub use crate::color::{Chromaticity, Rgb, Xyz};
    pub use crate::registers::{
        ChannelSet, Config, ConversionTime, FaultCount, Flags, IntConfig, OperatingMode, Range,
        RawChannel, Threshold, ThresholdChannel,
    };
    pub use crate::{Error, Opt4048, ADDR_GND, ADDR_SCL, ADDR_SDA, ADDR_VDD, DEVICE_ID};
}
