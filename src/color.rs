//! Conversions between the color representations the N4 deals in.
//!
//! The controller's native color encoding is CIE xyY chromaticity plus
//! brightness, so everything funnels through `Yxy`. RGB values are on the
//! 0..=255 scale, hue is in degrees, saturation in 0..=1.

use palette::{FromColor, Hsv, Srgb, Yxy};

use crate::error::KetraError;

/// Convert from a kelvin color temperature to an RGB color.
///
/// Piecewise approximation from
/// <http://www.tannerhelland.com/4435/convert-temperature-rgb-algorithm-code/>.
/// Channels are clamped to [0, 255] after evaluation. Kelvin must be a
/// positive, finite number.
pub fn kelvin_to_rgb(kelvin: f32) -> Result<[f32; 3], KetraError> {
    if !kelvin.is_finite() || kelvin <= 0.0 {
        return Err(KetraError::InvalidArgument(format!(
            "color temperature {kelvin} K is not a positive temperature"
        )));
    }

    let temp = kelvin / 100.0;

    let red = if temp <= 66.0 {
        255.0
    } else {
        329.698_727_446 * (temp - 60.0).powf(-0.133_204_759_2)
    };

    let green = if temp <= 66.0 {
        99.470_802_586_1 * temp.ln() - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (temp - 60.0).powf(-0.075_514_849_2)
    };

    let blue = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (temp - 10.0).ln() - 305.044_792_730_7
    };

    Ok([
        red.clamp(0.0, 255.0),
        green.clamp(0.0, 255.0),
        blue.clamp(0.0, 255.0),
    ])
}

/// Convert from a kelvin color temperature to xy chromaticity coordinates.
pub fn kelvin_to_xy(kelvin: f32) -> Result<(f32, f32), KetraError> {
    let [red, green, blue] = kelvin_to_rgb(kelvin)?;
    let (x, y, _) = rgb_to_xyy([red, green, blue]);
    Ok((x, y))
}

/// Convert an RGB color (channels 0..=255) to full xyY coordinates.
pub fn rgb_to_xyy(rgb: [f32; 3]) -> (f32, f32, f32) {
    let srgb = Srgb::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0);
    let yxy = Yxy::from_color(srgb);
    (yxy.x, yxy.y, yxy.luma)
}

/// Convert xyY coordinates back to an RGB color (channels 0..=255).
///
/// Chromaticities outside the sRGB gamut are clamped channel-wise.
pub fn xyy_to_rgb(x: f32, y: f32, luma: f32) -> [f32; 3] {
    let srgb = Srgb::from_color(Yxy::new(x, y, luma));
    [
        (srgb.red * 255.0).clamp(0.0, 255.0),
        (srgb.green * 255.0).clamp(0.0, 255.0),
        (srgb.blue * 255.0).clamp(0.0, 255.0),
    ]
}

/// Convert a hue (degrees) / saturation pair to xy chromaticity, at full value.
pub fn hs_to_xy(hue: f32, saturation: f32) -> (f32, f32) {
    let hsv: Hsv = Hsv::new(hue, saturation, 1.0);
    let yxy: Yxy = Yxy::from_color(hsv);
    (yxy.x, yxy.y)
}

/// Convert xy chromaticity to a hue (degrees) / saturation pair.
pub fn xy_to_hs(x: f32, y: f32) -> (f32, f32) {
    let yxy: Yxy = Yxy::new(x, y, 1.0);
    let hsv: Hsv = Hsv::from_color(yxy);
    (hsv.hue.into_positive_degrees(), hsv.saturation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tolerance: f32) {
        assert!((a - b).abs() <= tolerance, "{a} != {b} (tolerance {tolerance})");
    }

    #[test]
    fn kelvin_channels_stay_in_range() {
        let mut kelvin = 1000.0;
        while kelvin <= 10000.0 {
            let [red, green, blue] = kelvin_to_rgb(kelvin).unwrap();
            for channel in [red, green, blue] {
                assert!((0.0..=255.0).contains(&channel), "{channel} at {kelvin} K");
            }
            kelvin += 50.0;
        }
    }

    #[test]
    fn kelvin_known_points() {
        // 2000 K: warm white, red pinned at 255, no blue yet at 1500 K
        let [red, green, blue] = kelvin_to_rgb(2000.0).unwrap();
        assert_close(red, 255.0, 0.01);
        assert_close(green, 136.87, 0.05);
        assert_close(blue, 13.90, 0.05);

        let [_, _, blue] = kelvin_to_rgb(1500.0).unwrap();
        assert_close(blue, 0.0, 0.0);

        // the 6600 K breakpoint clamps to pure white
        assert_eq!(kelvin_to_rgb(6600.0).unwrap(), [255.0, 255.0, 255.0]);

        // above the breakpoint red and green fall off, blue pins at 255
        let [red, green, blue] = kelvin_to_rgb(6700.0).unwrap();
        assert!(red < 255.0);
        assert!(green < 255.0);
        assert_close(blue, 255.0, 0.0);
    }

    #[test]
    fn kelvin_rejects_out_of_domain_input() {
        assert!(kelvin_to_rgb(0.0).is_err());
        assert!(kelvin_to_rgb(-500.0).is_err());
        assert!(kelvin_to_rgb(f32::NAN).is_err());
        assert!(kelvin_to_xy(f32::INFINITY).is_err());
    }

    #[test]
    fn rgb_round_trips_through_xyy() {
        for rgb in [
            [255.0, 0.0, 0.0],
            [12.0, 34.0, 56.0],
            [200.0, 180.0, 90.0],
            [0.0, 255.0, 128.0],
            [255.0, 255.0, 255.0],
        ] {
            let (x, y, luma) = rgb_to_xyy(rgb);
            let back = xyy_to_rgb(x, y, luma);
            for channel in 0..3 {
                assert_close(back[channel], rgb[channel], 0.1);
            }
        }
    }

    #[test]
    fn hs_round_trips_through_xy() {
        for (hue, saturation) in [(10.0, 1.0), (120.0, 0.8), (240.5, 0.33), (42.0, 0.5)] {
            let (x, y) = hs_to_xy(hue, saturation);
            let (hue_back, saturation_back) = xy_to_hs(x, y);
            assert_close(hue_back, hue, 0.5);
            assert_close(saturation_back, saturation, 0.01);
        }
    }

    #[test]
    fn kelvin_to_xy_lands_near_the_white_point() {
        // 6600 K maps to pure white, whose chromaticity is the D65 white point
        let (x, y) = kelvin_to_xy(6600.0).unwrap();
        assert_close(x, 0.3127, 0.005);
        assert_close(y, 0.3290, 0.005);
    }
}
