//! Register-level encoding for the OPT4048.
//!
//! Pure bit-field transcoding, no I/O. Everything here is the single source
//! of truth for the device's register layout: field positions follow the
//! datasheet exactly, and the driver never touches raw shifts itself.

/// Register map. Every register is 16 bits wide; channel results span two
/// consecutive registers each.
pub mod addr {
    /// CH0 result, exponent + mantissa MSBs (LSB half at +1)
    pub const CH0: u8 = 0x00;
    /// CH1 result
    pub const CH1: u8 = 0x02;
    /// CH2 result
    pub const CH2: u8 = 0x04;
    /// CH3 result
    pub const CH3: u8 = 0x06;
    /// Low comparison threshold
    pub const THRESHOLD_LOW: u8 = 0x08;
    /// High comparison threshold
    pub const THRESHOLD_HIGH: u8 = 0x09;
    /// Configuration, high half
    pub const CONFIG_HIGH: u8 = 0x0A;
    /// Configuration, low half
    pub const CONFIG_LOW: u8 = 0x0B;
    /// Status flags
    pub const FLAGS: u8 = 0x0C;
    /// Device identity
    pub const DEVICE_ID: u8 = 0x11;
}

// Configuration high half (register 0x0A), MSB first.
// QWAKE(1) | reserved(1) | RANGE(4) | CONVERSION_TIME(4) | OPERATING_MODE(2)
// | LATCH(1) | INT_POL(1) | FAULT_COUNT(2)
const QWAKE_SHIFT: u32 = 15;
const RANGE_SHIFT: u32 = 10;
const RANGE_MASK: u16 = 0b1111;
const CONV_TIME_SHIFT: u32 = 6;
const CONV_TIME_MASK: u16 = 0b1111;
const OP_MODE_SHIFT: u32 = 4;
const OP_MODE_MASK: u16 = 0b11;
const LATCH_SHIFT: u32 = 3;
const INT_POL_SHIFT: u32 = 2;
const FAULT_COUNT_MASK: u16 = 0b11;

// Configuration low half (register 0x0B). Bit 15 must always be written set.
const CFG_LOW_FIXED: u16 = 0x8000;
const THRESHOLD_CH_SHIFT: u32 = 5;
const THRESHOLD_CH_MASK: u16 = 0b11;
const INT_DIR_SHIFT: u32 = 4;
const INT_CFG_SHIFT: u32 = 2;
const INT_CFG_MASK: u16 = 0b11;
const I2C_BURST_MASK: u16 = 0b1;

// Channel result word: EXPONENT(4) | MANTISSA_MSB(12) in the high half,
// MANTISSA_LSB(8) | COUNTER(4) | CRC(4) in the low half.
const CH_EXPONENT_SHIFT: u32 = 12;
const CH_EXPONENT_MASK: u16 = 0xF;
const CH_MANTISSA_MSB_MASK: u16 = 0x0FFF;
const CH_COUNTER_SHIFT: u32 = 4;
const CH_COUNTER_MASK: u16 = 0xF;
const CH_CRC_MASK: u16 = 0xF;

// Threshold word (registers 0x08/0x09): EXPONENT(4) | RESULT(12).
const THRES_EXPONENT_SHIFT: u32 = 12;
const THRES_RESULT_MASK: u16 = 0x0FFF;

// Flag word (register 0x0C), low nibble.
const FLAG_OVERLOAD: u16 = 1 << 3;
const FLAG_CONVERSION_READY: u16 = 1 << 2;
const FLAG_HIGH: u16 = 1 << 1;
const FLAG_LOW: u16 = 1 << 0;

/// Full-scale measurement range.
///
/// Codes 0–6 select a fixed range, 12 selects automatic ranging. Undefined
/// codes read back from the device are preserved as [`Range::Reserved`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Range {
    /// 2.2 klux full scale
    Lux2k2,
    /// 4.5 klux full scale
    Lux4k5,
    /// 9 klux full scale
    Lux9k,
    /// 18 klux full scale
    Lux18k,
    /// 36 klux full scale
    Lux36k,
    /// 72 klux full scale
    Lux72k,
    /// 144 klux full scale
    Lux144k,
    /// Automatic range selection
    Auto,
    /// Undefined range code, kept verbatim
    Reserved(u8),
}

impl Range {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Range::Lux2k2,
            1 => Range::Lux4k5,
            2 => Range::Lux9k,
            3 => Range::Lux18k,
            4 => Range::Lux36k,
            5 => Range::Lux72k,
            6 => Range::Lux144k,
            12 => Range::Auto,
            n => Range::Reserved(n),
        }
    }

    /// Raw 4-bit register code.
    pub fn bits(self) -> u8 {
        match self {
            Range::Lux2k2 => 0,
            Range::Lux4k5 => 1,
            Range::Lux9k => 2,
            Range::Lux18k => 3,
            Range::Lux36k => 4,
            Range::Lux72k => 5,
            Range::Lux144k => 6,
            Range::Auto => 12,
            Range::Reserved(n) => n,
        }
    }
}

/// Per-channel conversion time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionTime {
    Us600,
    Ms1,
    Ms1_8,
    Ms3_4,
    Ms6_5,
    Ms12_7,
    Ms25,
    Ms50,
    Ms100,
    Ms200,
    Ms400,
    Ms800,
    /// Undefined conversion-time code, kept verbatim
    Reserved(u8),
}

impl ConversionTime {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits {
            0 => ConversionTime::Us600,
            1 => ConversionTime::Ms1,
            2 => ConversionTime::Ms1_8,
            3 => ConversionTime::Ms3_4,
            4 => ConversionTime::Ms6_5,
            5 => ConversionTime::Ms12_7,
            6 => ConversionTime::Ms25,
            7 => ConversionTime::Ms50,
            8 => ConversionTime::Ms100,
            9 => ConversionTime::Ms200,
            10 => ConversionTime::Ms400,
            11 => ConversionTime::Ms800,
            n => ConversionTime::Reserved(n),
        }
    }

    /// Raw 4-bit register code.
    pub fn bits(self) -> u8 {
        match self {
            ConversionTime::Us600 => 0,
            ConversionTime::Ms1 => 1,
            ConversionTime::Ms1_8 => 2,
            ConversionTime::Ms3_4 => 3,
            ConversionTime::Ms6_5 => 4,
            ConversionTime::Ms12_7 => 5,
            ConversionTime::Ms25 => 6,
            ConversionTime::Ms50 => 7,
            ConversionTime::Ms100 => 8,
            ConversionTime::Ms200 => 9,
            ConversionTime::Ms400 => 10,
            ConversionTime::Ms800 => 11,
            ConversionTime::Reserved(n) => n,
        }
    }

    /// Conversion duration in microseconds, `None` for reserved codes.
    pub fn as_micros(self) -> Option<u32> {
        match self {
            ConversionTime::Us600 => Some(600),
            ConversionTime::Ms1 => Some(1_000),
            ConversionTime::Ms1_8 => Some(1_800),
            ConversionTime::Ms3_4 => Some(3_400),
            ConversionTime::Ms6_5 => Some(6_500),
            ConversionTime::Ms12_7 => Some(12_700),
            ConversionTime::Ms25 => Some(25_000),
            ConversionTime::Ms50 => Some(50_000),
            ConversionTime::Ms100 => Some(100_000),
            ConversionTime::Ms200 => Some(200_000),
            ConversionTime::Ms400 => Some(400_000),
            ConversionTime::Ms800 => Some(800_000),
            ConversionTime::Reserved(_) => None,
        }
    }
}

/// Device operating mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    PowerDown,
    /// One-shot measurement with forced auto-range
    OneShotAutoRange,
    OneShot,
    Continuous,
}

impl OperatingMode {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => OperatingMode::PowerDown,
            1 => OperatingMode::OneShotAutoRange,
            2 => OperatingMode::OneShot,
            _ => OperatingMode::Continuous,
        }
    }

    /// Raw 2-bit register code.
    pub fn bits(self) -> u8 {
        match self {
            OperatingMode::PowerDown => 0,
            OperatingMode::OneShotAutoRange => 1,
            OperatingMode::OneShot => 2,
            OperatingMode::Continuous => 3,
        }
    }
}

/// Consecutive fault events required before the interrupt asserts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCount {
    One,
    Two,
    Four,
    Eight,
}

impl FaultCount {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => FaultCount::One,
            1 => FaultCount::Two,
            2 => FaultCount::Four,
            _ => FaultCount::Eight,
        }
    }

    /// Raw 2-bit register code.
    pub fn bits(self) -> u8 {
        match self {
            FaultCount::One => 0,
            FaultCount::Two => 1,
            FaultCount::Four => 2,
            FaultCount::Eight => 3,
        }
    }
}

/// Channel the threshold comparison applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdChannel {
    Ch0,
    Ch1,
    Ch2,
    Ch3,
}

impl ThresholdChannel {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => ThresholdChannel::Ch0,
            1 => ThresholdChannel::Ch1,
            2 => ThresholdChannel::Ch2,
            _ => ThresholdChannel::Ch3,
        }
    }

    /// Raw 2-bit register code.
    pub fn bits(self) -> u8 {
        match self {
            ThresholdChannel::Ch0 => 0,
            ThresholdChannel::Ch1 => 1,
            ThresholdChannel::Ch2 => 2,
            ThresholdChannel::Ch3 => 3,
        }
    }
}

/// Interrupt pin behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntConfig {
    /// SMBus alert response
    SmbusAlert,
    /// Pin asserts when the next channel completes
    ReadyNextChannel,
    /// Pin asserts when all four channels complete
    ReadyAllChannels,
    /// Undefined code, kept verbatim
    Reserved(u8),
}

impl IntConfig {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits {
            0 => IntConfig::SmbusAlert,
            1 => IntConfig::ReadyNextChannel,
            3 => IntConfig::ReadyAllChannels,
            n => IntConfig::Reserved(n),
        }
    }

    /// Raw 2-bit register code.
    pub fn bits(self) -> u8 {
        match self {
            IntConfig::SmbusAlert => 0,
            IntConfig::ReadyNextChannel => 1,
            IntConfig::ReadyAllChannels => 3,
            IntConfig::Reserved(n) => n,
        }
    }
}

/// Device configuration, packed across registers 0x0A and 0x0B.
///
/// The driver caches one of these and writes both halves back on every
/// setter call; the device has no partial-field writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub quick_wake: bool,
    pub range: Range,
    pub conversion_time: ConversionTime,
    pub operating_mode: OperatingMode,
    /// Latched (true) or transparent threshold comparison
    pub latch: bool,
    /// Interrupt pin active high when true
    pub int_polarity: bool,
    pub fault_count: FaultCount,
    pub threshold_channel: ThresholdChannel,
    /// Interrupt pin is an output when true, a measurement trigger input otherwise
    pub int_direction: bool,
    pub int_config: IntConfig,
    /// Burst all channel registers in one I2C read when true
    pub i2c_burst: bool,
}

impl Default for Config {
    /// Power-on reset configuration (registers read 0x3208 / 0x8011).
    fn default() -> Self {
        Config {
            quick_wake: false,
            range: Range::Auto,
            conversion_time: ConversionTime::Ms100,
            operating_mode: OperatingMode::PowerDown,
            latch: true,
            int_polarity: false,
            fault_count: FaultCount::One,
            threshold_channel: ThresholdChannel::Ch0,
            int_direction: true,
            int_config: IntConfig::SmbusAlert,
            i2c_burst: true,
        }
    }
}

/// One decoded channel result word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawChannel {
    /// 4-bit exponent
    pub exponent: u8,
    /// 20-bit mantissa
    pub mantissa: u32,
    /// 4-bit sample counter, increments per conversion
    pub counter: u8,
    /// 4-bit checksum as transmitted
    pub crc: u8,
}

impl RawChannel {
    /// Full-precision ADC value, `mantissa << exponent`.
    ///
    /// At most 35 bits (mantissa < 2^20, exponent <= 15), so u64 cannot
    /// overflow.
    #[inline]
    pub fn value(&self) -> u64 {
        (self.mantissa as u64) << self.exponent
    }

    /// Recompute the checksum and compare it against the transmitted one.
    pub fn crc_ok(&self) -> bool {
        crc4(self.exponent, self.mantissa, self.counter) == self.crc
    }
}

/// One complete measurement: all four channels of a single poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSet {
    pub ch0: RawChannel,
    pub ch1: RawChannel,
    pub ch2: RawChannel,
    pub ch3: RawChannel,
}

/// Status flags from register 0x0C.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Flags {
    /// A channel saturated during conversion
    pub overload: bool,
    /// A conversion completed since the last flag read
    pub conversion_ready: bool,
    /// Measurement crossed the high threshold
    pub flag_high: bool,
    /// Measurement crossed the low threshold
    pub flag_low: bool,
}

/// Threshold comparison level (registers 0x08/0x09), exponent/result encoded
/// like a channel word but with a 12-bit result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Threshold {
    /// 4-bit exponent
    pub exponent: u8,
    /// 12-bit result
    pub result: u16,
}

impl Threshold {
    /// Comparison value, `result << exponent`.
    #[inline]
    pub fn value(&self) -> u32 {
        (self.result as u32) << self.exponent
    }
}

/// Pack a configuration into the 32-bit concatenation of registers
/// 0x0A (high half) and 0x0B (low half).
pub fn pack_config(cfg: &Config) -> u32 {
    let mut high: u16 = 0;
    high |= (cfg.quick_wake as u16) << QWAKE_SHIFT;
    high |= (cfg.range.bits() as u16 & RANGE_MASK) << RANGE_SHIFT;
    high |= (cfg.conversion_time.bits() as u16 & CONV_TIME_MASK) << CONV_TIME_SHIFT;
    high |= (cfg.operating_mode.bits() as u16 & OP_MODE_MASK) << OP_MODE_SHIFT;
    high |= (cfg.latch as u16) << LATCH_SHIFT;
    high |= (cfg.int_polarity as u16) << INT_POL_SHIFT;
    high |= cfg.fault_count.bits() as u16 & FAULT_COUNT_MASK;

    let mut low: u16 = CFG_LOW_FIXED;
    low |= (cfg.threshold_channel.bits() as u16 & THRESHOLD_CH_MASK) << THRESHOLD_CH_SHIFT;
    low |= (cfg.int_direction as u16) << INT_DIR_SHIFT;
    low |= (cfg.int_config.bits() as u16 & INT_CFG_MASK) << INT_CFG_SHIFT;
    low |= cfg.i2c_burst as u16 & I2C_BURST_MASK;

    ((high as u32) << 16) | low as u32
}

/// Unpack the 32-bit register concatenation back into a configuration.
///
/// Field codes are range-masked, never rejected: an undefined code decodes
/// into the matching `Reserved` variant so no device state is lost.
pub fn unpack_config(word: u32) -> Config {
    let high = (word >> 16) as u16;
    let low = word as u16;

    Config {
        quick_wake: (high >> QWAKE_SHIFT) & 1 != 0,
        range: Range::from_bits(((high >> RANGE_SHIFT) & RANGE_MASK) as u8),
        conversion_time: ConversionTime::from_bits(
            ((high >> CONV_TIME_SHIFT) & CONV_TIME_MASK) as u8,
        ),
        operating_mode: OperatingMode::from_bits(((high >> OP_MODE_SHIFT) & OP_MODE_MASK) as u8),
        latch: (high >> LATCH_SHIFT) & 1 != 0,
        int_polarity: (high >> INT_POL_SHIFT) & 1 != 0,
        fault_count: FaultCount::from_bits((high & FAULT_COUNT_MASK) as u8),
        threshold_channel: ThresholdChannel::from_bits(
            ((low >> THRESHOLD_CH_SHIFT) & THRESHOLD_CH_MASK) as u8,
        ),
        int_direction: (low >> INT_DIR_SHIFT) & 1 != 0,
        int_config: IntConfig::from_bits(((low >> INT_CFG_SHIFT) & INT_CFG_MASK) as u8),
        i2c_burst: low & I2C_BURST_MASK != 0,
    }
}

/// Decode one channel result word.
///
/// Expects the two 16-bit register halves already reassembled big-endian
/// into one u32 (the driver does that from the byte stream).
pub fn unpack_channel(word: u32) -> RawChannel {
    let high = (word >> 16) as u16;
    let low = word as u16;

    RawChannel {
        exponent: ((high >> CH_EXPONENT_SHIFT) & CH_EXPONENT_MASK) as u8,
        mantissa: (((high & CH_MANTISSA_MSB_MASK) as u32) << 8) | ((low >> 8) & 0xFF) as u32,
        counter: ((low >> CH_COUNTER_SHIFT) & CH_COUNTER_MASK) as u8,
        crc: (low & CH_CRC_MASK) as u8,
    }
}

/// Decode the flag register.
pub fn unpack_flags(word: u16) -> Flags {
    Flags {
        overload: word & FLAG_OVERLOAD != 0,
        conversion_ready: word & FLAG_CONVERSION_READY != 0,
        flag_high: word & FLAG_HIGH != 0,
        flag_low: word & FLAG_LOW != 0,
    }
}

/// Pack a threshold level into its 16-bit register form.
pub fn pack_threshold(t: &Threshold) -> u16 {
    ((t.exponent as u16 & CH_EXPONENT_MASK) << THRES_EXPONENT_SHIFT)
        | (t.result & THRES_RESULT_MASK)
}

/// Decode a threshold register.
pub fn unpack_threshold(word: u16) -> Threshold {
    Threshold {
        exponent: ((word >> THRES_EXPONENT_SHIFT) & CH_EXPONENT_MASK) as u8,
        result: word & THRES_RESULT_MASK,
    }
}

#[inline]
fn parity(v: u32) -> u8 {
    (v.count_ones() & 1) as u8
}

// Datasheet checksum over {exponent E, mantissa R, counter C}:
//   x0 = parity of every bit
//   x1 = parity of the odd-numbered bits
//   x2 = parity of bits 3, 7, 11, ...
//   x3 = parity of R3, R11, R19
fn crc4(exponent: u8, mantissa: u32, counter: u8) -> u8 {
    let e = exponent as u32;
    let r = mantissa;
    let c = counter as u32;

    let x0 = parity(e & 0xF) ^ parity(r & 0xF_FFFF) ^ parity(c & 0xF);
    let x1 = parity(e & 0xA) ^ parity(r & 0xA_AAAA) ^ parity(c & 0xA);
    let x2 = parity(e & 0x8) ^ parity(r & 0x8_8888) ^ parity(c & 0x8);
    let x3 = parity(r & 0x8_0808);

    x0 | (x1 << 1) | (x2 << 2) | (x3 << 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGES: [Range; 8] = [
        Range::Lux2k2,
        Range::Lux4k5,
        Range::Lux9k,
        Range::Lux18k,
        Range::Lux36k,
        Range::Lux72k,
        Range::Lux144k,
        Range::Auto,
    ];

    const MODES: [OperatingMode; 4] = [
        OperatingMode::PowerDown,
        OperatingMode::OneShotAutoRange,
        OperatingMode::OneShot,
        OperatingMode::Continuous,
    ];

    #[test]
    fn config_round_trip() {
        for (i, &range) in RANGES.iter().enumerate() {
            for &mode in MODES.iter() {
                let cfg = Config {
                    quick_wake: i % 2 == 0,
                    range,
                    conversion_time: ConversionTime::from_bits((i % 12) as u8),
                    operating_mode: mode,
                    latch: i % 3 == 0,
                    int_polarity: i % 2 == 1,
                    fault_count: FaultCount::from_bits((i % 4) as u8),
                    threshold_channel: ThresholdChannel::from_bits((i % 4) as u8),
                    int_direction: i % 3 == 1,
                    int_config: IntConfig::ReadyAllChannels,
                    i2c_burst: i % 2 == 0,
                };
                assert_eq!(unpack_config(pack_config(&cfg)), cfg);
            }
        }
    }

    #[test]
    fn config_bit_positions() {
        // Every field at its maximum documented code, checked against a
        // hand-packed literal.
        let cfg = Config {
            quick_wake: true,
            range: Range::Lux72k,
            conversion_time: ConversionTime::Ms800,
            operating_mode: OperatingMode::OneShot,
            latch: false,
            int_polarity: true,
            fault_count: FaultCount::Four,
            threshold_channel: ThresholdChannel::Ch3,
            int_direction: true,
            int_config: IntConfig::ReadyAllChannels,
            i2c_burst: true,
        };
        assert_eq!(pack_config(&cfg), 0x96E6_807D);
    }

    #[test]
    fn config_low_half_fixed_bit() {
        let word = pack_config(&Config::default());
        assert_ne!(word as u16 & 0x8000, 0);
    }

    #[test]
    fn default_config_matches_reset_word() {
        assert_eq!(pack_config(&Config::default()), 0x3208_8011);
        assert_eq!(unpack_config(0x3208_8011), Config::default());
    }

    #[test]
    fn reserved_codes_survive_round_trip() {
        // Range code 9 and conversion-time code 14 are undefined; they must
        // decode losslessly instead of failing.
        let word = 0x3208_8011 & !(0xF << 26) | (9 << 26);
        let cfg = unpack_config(word);
        assert_eq!(cfg.range, Range::Reserved(9));
        assert_eq!(pack_config(&cfg), word);

        assert_eq!(ConversionTime::from_bits(14), ConversionTime::Reserved(14));
        assert_eq!(ConversionTime::Reserved(14).bits(), 14);
        assert_eq!(IntConfig::from_bits(2), IntConfig::Reserved(2));
    }

    #[test]
    fn channel_decode_literal() {
        let ch = unpack_channel(0x1234_5678);
        assert_eq!(
            ch,
            RawChannel {
                exponent: 0x1,
                mantissa: 0x23456,
                counter: 0x7,
                crc: 0x8,
            }
        );
    }

    #[test]
    fn channel_value_shift() {
        let ch = RawChannel {
            exponent: 15,
            mantissa: (1 << 20) - 1,
            counter: 0,
            crc: 0,
        };
        // Largest representable reading, no overflow in u64.
        assert_eq!(ch.value(), ((1u64 << 20) - 1) << 15);

        let ch = unpack_channel(0x1234_5678);
        assert_eq!(ch.value(), 0x23456 << 1);
    }

    #[test]
    fn crc_known_values() {
        assert_eq!(crc4(0, 0, 0), 0);
        assert_eq!(crc4(1, 0x23456, 7), 0);
        assert_eq!(crc4(15, 0xF_FFFF, 15), 12);
        assert_eq!(crc4(3, 0x0_ABCD, 9), 4);
    }

    #[test]
    fn crc_rejects_corruption() {
        let good = RawChannel {
            exponent: 3,
            mantissa: 0x0_ABCD,
            counter: 9,
            crc: 4,
        };
        assert!(good.crc_ok());

        let mut bad = good;
        bad.crc ^= 1;
        assert!(!bad.crc_ok());

        let mut flipped = good;
        flipped.mantissa ^= 1 << 7;
        assert!(!flipped.crc_ok());
    }

    #[test]
    fn flags_decode() {
        let f = unpack_flags(0b1010);
        assert!(f.overload);
        assert!(!f.conversion_ready);
        assert!(f.flag_high);
        assert!(!f.flag_low);

        assert_eq!(
            unpack_flags(0b0101),
            Flags {
                overload: false,
                conversion_ready: true,
                flag_high: false,
                flag_low: true,
            }
        );
    }

    #[test]
    fn threshold_round_trip() {
        let t = Threshold {
            exponent: 0xA,
            result: 0x123,
        };
        assert_eq!(unpack_threshold(pack_threshold(&t)), t);
        assert_eq!(pack_threshold(&t), 0xA123);
        assert_eq!(t.value(), 0x123 << 0xA);
    }

    #[test]
    fn conversion_time_micros() {
        assert_eq!(ConversionTime::Us600.as_micros(), Some(600));
        assert_eq!(ConversionTime::Ms800.as_micros(), Some(800_000));
        assert_eq!(ConversionTime::Reserved(13).as_micros(), None);
    }
}
