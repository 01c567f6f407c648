//! sRGB colors parsed from CSS values.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque sRGB color.
///
/// Theme declarations are resolved into this type; SVG output always
/// writes it back as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl RgbColor {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses any CSS color value (`#abc`, `#aabbcc`, `rgb(...)`, `hsl(...)`,
    /// named colors). Alpha is discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use kittencaps::models::RgbColor;
    ///
    /// assert_eq!(RgbColor::from_css("white").unwrap(), RgbColor::new(255, 255, 255));
    /// assert_eq!(RgbColor::from_css("#0f0").unwrap(), RgbColor::new(0, 255, 0));
    /// assert_eq!(RgbColor::from_css("rgb(1, 2, 3)").unwrap(), RgbColor::new(1, 2, 3));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the value isn't a CSS color.
    pub fn from_css(value: &str) -> Result<Self> {
        let color = svgtypes::Color::from_str(value.trim())
            .map_err(|e| anyhow!("Invalid CSS color '{value}': {e}"))?;
        Ok(Self::new(color.red, color.green, color.blue))
    }

    /// Converts CIE Lab (D50 white, as CSS `lab()` uses) to sRGB.
    ///
    /// Out-of-gamut channels are clipped.
    #[must_use]
    pub fn from_lab(lightness: f64, a: f64, b: f64) -> Self {
        const KAPPA: f64 = 24389.0 / 27.0;
        const EPSILON: f64 = 216.0 / 24389.0;
        const D50: [f64; 3] = [0.3457 / 0.3585, 1.0, (1.0 - 0.3457 - 0.3585) / 0.3585];

        let fy = (lightness + 16.0) / 116.0;
        let fx = fy + a / 500.0;
        let fz = fy - b / 200.0;
        let inverse = |f: f64| {
            let cube = f.powi(3);
            if cube > EPSILON {
                cube
            } else {
                (116.0 * f - 16.0) / KAPPA
            }
        };
        let y = if lightness > KAPPA * EPSILON {
            fy.powi(3)
        } else {
            lightness / KAPPA
        };
        let xyz_d50 = [inverse(fx) * D50[0], y * D50[1], inverse(fz) * D50[2]];

        let xyz_d65 = multiply(&BRADFORD_D50_TO_D65, xyz_d50);
        Self::from_linear_srgb(multiply(&XYZ_D65_TO_LINEAR_SRGB, xyz_d65))
    }

    /// Converts OKLab (as CSS `oklab()` uses, lightness in 0..1) to sRGB.
    ///
    /// Out-of-gamut channels are clipped.
    #[must_use]
    pub fn from_oklab(lightness: f64, a: f64, b: f64) -> Self {
        let l = (lightness + 0.396_337_777_4 * a + 0.215_803_757_3 * b).powi(3);
        let m = (lightness - 0.105_561_345_8 * a - 0.063_854_172_8 * b).powi(3);
        let s = (lightness - 0.089_484_177_5 * a - 1.291_485_548_0 * b).powi(3);

        Self::from_linear_srgb([
            4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s,
            -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s,
            -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_612_701_0 * s,
        ])
    }

    /// Applies the sRGB transfer function and quantizes each channel.
    fn from_linear_srgb(rgb: [f64; 3]) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |linear: f64| {
            let encoded = if linear <= 0.003_130_8 {
                12.92 * linear
            } else {
                1.055 * linear.powf(1.0 / 2.4) - 0.055
            };
            (encoded.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Self::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// `#RRGGBB`, uppercase.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

const BRADFORD_D50_TO_D65: [[f64; 3]; 3] = [
    [0.955_473_421_488_075, -0.023_098_454_948_764_71, 0.063_259_240_570_720_57],
    [-0.028_369_709_333_863_7, 1.009_995_398_081_304_1, 0.021_041_441_191_917_323],
    [0.012_314_014_864_481_998, -0.020_507_649_298_898_964, 1.330_365_926_242_124],
];

const XYZ_D65_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [3.240_969_941_904_522_6, -1.537_383_177_570_094, -0.498_610_760_293_003_4],
    [-0.969_243_636_280_879_6, 1.875_967_501_507_720_2, 0.041_555_057_407_175_59],
    [0.055_630_079_696_993_66, -0.203_976_958_888_976_52, 1.056_971_514_242_878_6],
];

fn multiply(matrix: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    matrix.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
