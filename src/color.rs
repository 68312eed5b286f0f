//! Color pipeline: raw channel counts to CIE XYZ, sRGB, and correlated
//! color temperature.
//!
//! Pure math, no I/O and no device knowledge beyond [`ChannelSet`]. All
//! arithmetic is f64.

use crate::registers::ChannelSet;

// Channel-to-XYZ calibration matrix, row per channel, columns X/Y/Z/lux.
// Values from TI, "OPT4048 High Speed High Precision Tristimulus XYZ Color
// Sensor" datasheet, section 9.2.4 "Application Curves" (December 2022).
const XYZ_MATRIX: [[f64; 4]; 4] = [
    [0.000_234_892_992_0, -0.000_018_965_239_0, 0.000_012_081_168_4, 0.0],
    [0.000_040_746_744_1, 0.000_198_958_202_0, -0.000_015_884_811_5, 0.002_15],
    [0.000_092_861_940_4, -0.000_016_973_955_3, 0.000_674_021_520_0, 0.0],
    [0.0, 0.0, 0.0, 0.0],
];

// Chromaticity-to-linear-sRGB matrix (IEC 61966-2-1).
const SRGB_MATRIX: [[f64; 3]; 3] = [
    [3.240_625_5, -1.537_208_0, -0.498_628_6],
    [-0.968_930_7, 1.875_756_1, 0.041_517_5],
    [0.055_710_1, -0.204_021_1, 1.056_995_9],
];

// sRGB transfer function branch point.
const SRGB_LINEAR_THRESHOLD: f64 = 0.003_130_8;

// McCamy CCT approximation epicenter.
const MCCAMY_X_EPICENTER: f64 = 0.3320;
const MCCAMY_Y_EPICENTER: f64 = 0.1858;

/// CIE tristimulus values plus the lux estimate from the fourth matrix
/// column.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Xyz {
    /// Tristimulus X
    pub x: f64,
    /// Tristimulus Y
    pub y: f64,
    /// Tristimulus Z
    pub z: f64,
    /// Illuminance estimate
    pub lux: f64,
}

impl Xyz {
    /// Convert one poll's channel set into tristimulus values.
    ///
    /// Each channel is reconstructed as `mantissa << exponent` before the
    /// matrix multiply.
    pub fn from_channels(channels: &ChannelSet) -> Self {
        let adc = [
            channels.ch0.value() as f64,
            channels.ch1.value() as f64,
            channels.ch2.value() as f64,
            channels.ch3.value() as f64,
        ];

        let mut out = [0.0; 4];
        for (component, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|ch| adc[ch] * XYZ_MATRIX[ch][component]).sum();
        }

        Xyz {
            x: out[0],
            y: out[1],
            z: out[2],
            lux: out[3],
        }
    }

    /// Normalize to chromaticity coordinates.
    ///
    /// Returns `None` when X + Y + Z is zero (a fully dark reading), where
    /// chromaticity is undefined; callers decide what a dark scene means
    /// instead of receiving NaN.
    pub fn chromaticity(&self) -> Option<Chromaticity> {
        let sum = self.x + self.y + self.z;
        if sum == 0.0 {
            return None;
        }
        Some(Chromaticity {
            x: self.x / sum,
            y: self.y / sum,
            z: self.z / sum,
        })
    }
}

/// Chromaticity coordinates: XYZ normalized by their sum.
///
/// x + y + z is 1 by construction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chromaticity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Chromaticity {
    /// Convert to gamma-encoded sRGB.
    ///
    /// No clamping is applied; out-of-gamut chromaticities yield components
    /// outside 0..=1 and clamping is the caller's choice (see
    /// [`Rgb::to_bytes`]).
    pub fn to_rgb(&self) -> Rgb {
        let v = [self.x, self.y, self.z];
        let mut linear = [0.0; 3];
        for (row, slot) in linear.iter_mut().enumerate() {
            *slot = (0..3).map(|col| SRGB_MATRIX[row][col] * v[col]).sum();
        }

        Rgb {
            r: linear_to_srgb(linear[0]),
            g: linear_to_srgb(linear[1]),
            b: linear_to_srgb(linear[2]),
        }
    }

    /// Correlated color temperature in kelvin, McCamy's approximation.
    ///
    /// Returns `None` when y equals the approximation's epicenter ordinate
    /// (0.1858), where the formula degenerates. Chromaticities close to that
    /// line still produce finite but physically meaningless temperatures;
    /// the approximation is only trustworthy near the Planckian locus.
    pub fn cct(&self) -> Option<f64> {
        let denom = MCCAMY_Y_EPICENTER - self.y;
        if denom == 0.0 {
            return None;
        }
        let n = (self.x - MCCAMY_X_EPICENTER) / denom;
        Some(437.0 * n * n * n + 3601.0 * n * n + 6861.0 * n + 5517.0)
    }
}

/// Gamma-encoded sRGB color, nominally 0..=1 per channel, unclamped.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Quantize to 8-bit [R, G, B], clamping each channel to 0..=255.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            clamp_u8(self.r * 255.0),
            clamp_u8(self.g * 255.0),
            clamp_u8(self.b * 255.0),
        ]
    }
}

#[cfg(feature = "graphics")]
impl From<Rgb> for embedded_graphics::pixelcolor::Rgb888 {
    fn from(rgb: Rgb) -> Self {
        let [r, g, b] = rgb.to_bytes();
        embedded_graphics::pixelcolor::Rgb888::new(r, g, b)
    }
}

/// sRGB transfer function (IEC 61966-2-1): linear light to gamma-encoded.
#[inline]
pub fn linear_to_srgb(channel: f64) -> f64 {
    if channel <= SRGB_LINEAR_THRESHOLD {
        12.92 * channel
    } else {
        1.055 * libm::pow(channel, 1.0 / 2.4) - 0.055
    }
}

#[inline]
fn clamp_u8(v: f64) -> u8 {
    if v < 0.0 {
        0
    } else if v > 255.0 {
        255
    } else {
        v as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RawChannel;

    fn chan(exponent: u8, mantissa: u32) -> RawChannel {
        RawChannel {
            exponent,
            mantissa,
            counter: 0,
            crc: 0,
        }
    }

    // Channel counts solved so the matrix lands on the D65 white point
    // (X = 95.047, Y = 100.0, Z = 108.883).
    fn daylight() -> ChannelSet {
        ChannelSet {
            ch0: chan(2, 60_934),
            ch1: chan(2, 135_087),
            ch2: chan(2, 42_477),
            ch3: chan(2, 86_622),
        }
    }

    #[test]
    fn daylight_tristimulus() {
        let xyz = Xyz::from_channels(&daylight());
        assert!((xyz.x - 95.047_286_548_542).abs() < 1e-9);
        assert!((xyz.y - 100.000_144_244_279_61).abs() < 1e-9);
        assert!((xyz.z - 108.882_937_956_900_4).abs() < 1e-9);
        // Lux column picks up channel 1 only.
        assert!((xyz.lux - 1_161.7482).abs() < 1e-9);
    }

    #[test]
    fn daylight_chromaticity_sums_to_one() {
        let c = Xyz::from_channels(&daylight()).chromaticity().unwrap();
        assert!((c.x - 0.312_727_178_068_904).abs() < 1e-9);
        assert!((c.y - 0.329_023_205_728_503).abs() < 1e-9);
        assert!((c.x + c.y + c.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn chromaticity_sums_to_one_off_white() {
        let set = ChannelSet {
            ch0: chan(5, 1_000),
            ch1: chan(3, 777),
            ch2: chan(0, 123_456),
            ch3: chan(1, 1),
        };
        let c = Xyz::from_channels(&set).chromaticity().unwrap();
        assert!((c.x + c.y + c.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dark_reading_has_no_chromaticity() {
        let dark = ChannelSet {
            ch0: chan(0, 0),
            ch1: chan(0, 0),
            ch2: chan(0, 0),
            ch3: chan(15, 0),
        };
        let xyz = Xyz::from_channels(&dark);
        assert_eq!(xyz.x, 0.0);
        assert!(xyz.chromaticity().is_none());
    }

    #[test]
    fn daylight_srgb() {
        let rgb = Xyz::from_channels(&daylight())
            .chromaticity()
            .unwrap()
            .to_rgb();
        assert!((rgb.r - 0.608_889_295_765_633).abs() < 1e-9);
        assert!((rgb.g - 0.608_896_770_615_136).abs() < 1e-9);
        assert!((rgb.b - 0.608_840_280_154_635).abs() < 1e-9);
        assert_eq!(rgb.to_bytes(), [155, 155, 155]);
    }

    #[test]
    fn daylight_cct() {
        let cct = Xyz::from_channels(&daylight())
            .chromaticity()
            .unwrap()
            .cct()
            .unwrap();
        assert!((cct - 6_506.520_778_136_5).abs() < 1e-6);
    }

    #[test]
    fn warm_white_cct() {
        let c = Chromaticity {
            x: 0.4450,
            y: 0.4074,
            z: 1.0 - 0.4450 - 0.4074,
        };
        assert!((c.cct().unwrap() - 2_896.796_427_644_56).abs() < 1e-6);
    }

    #[test]
    fn cct_degenerate_denominator() {
        let c = Chromaticity {
            x: 0.40,
            y: MCCAMY_Y_EPICENTER,
            z: 1.0 - 0.40 - MCCAMY_Y_EPICENTER,
        };
        assert_eq!(c.cct(), None);
    }

    #[test]
    fn srgb_transfer_branches() {
        // Linear branch scales by 12.92 exactly.
        assert!((linear_to_srgb(0.001) - 0.012_92).abs() < 1e-12);
        // The branch point itself still takes the linear branch.
        assert!((linear_to_srgb(0.003_130_8) - 0.040_449_936).abs() < 1e-12);
        // Power branch just above the threshold.
        assert!((linear_to_srgb(0.003_131) - 0.040_452_448_050_838).abs() < 1e-9);
        // Continuity across the branch point within the IEC rounding gap.
        let step = linear_to_srgb(SRGB_LINEAR_THRESHOLD + 1e-8) - linear_to_srgb(SRGB_LINEAR_THRESHOLD);
        assert!(step.abs() < 1e-6);
        // A known power-branch value: linear 0.5 -> ~0.7354.
        assert!((linear_to_srgb(0.5) - 0.735_356_983_052_449).abs() < 1e-9);
    }

    #[test]
    fn rgb_bytes_clamp() {
        let rgb = Rgb {
            r: 1.4,
            g: -0.2,
            b: 0.5,
        };
        assert_eq!(rgb.to_bytes(), [255, 0, 127]);
    }
}
