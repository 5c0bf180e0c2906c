//! Conversions between 8-bit RGB and the OKLCh space, plus the distance and
//! hue-averaging helpers every clustering stage shares.
//!
//! Channel values are normalised to `[0, 1]` and fed straight into the OKLab
//! matrices (no transfer curve), and the inverse path reverses exactly those
//! steps. The matrices themselves come from `palette`'s `LinSrgb` ⇄ `Oklab`
//! conversion.

use palette::{IntoColor, LinSrgb, Oklab, Oklch};
use serde::{Deserialize, Serialize};

/// Scale applied to lightness and chroma differences.
const LC_WEIGHT: f32 = 100.0;
/// Scale applied to the hue difference (fraction of a turn), lower than `LC_WEIGHT`.
const HUE_WEIGHT: f32 = 50.0;

/// A coordinate in OKLCh: lightness `l ∈ [0, 1]`, chroma `c ≥ 0`, hue `h ∈ [0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lch {
    #[serde(rename = "L")]
    pub l: f32,
    #[serde(rename = "C")]
    pub c: f32,
    pub h: f32,
}

impl Lch {
    pub const fn new(l: f32, c: f32, h: f32) -> Self {
        Self { l, c, h }
    }

    /// Convert an sRGB byte triplet.
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        rgb_to_oklch(rgb)
    }

    /// Back to RGB, clamped to the displayable range.
    pub fn to_rgb(self) -> [u8; 3] {
        oklch_to_rgb(self)
    }

    /// Same coordinate with a different chroma.
    #[must_use]
    pub fn with_chroma(self, c: f32) -> Self {
        Self { c, ..self }
    }

    /// Whether all three components are inside their documented ranges.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.l) && self.c >= 0.0 && (0.0..360.0).contains(&self.h)
    }

    /// Render as a CSS `oklch()` expression.
    pub fn to_css(&self) -> String {
        format!("oklch({:.3} {:.3} {:.1}deg)", self.l, self.c, self.h)
    }
}

/// RGB (0–255 per channel) → OKLCh.
pub fn rgb_to_oklch([r, g, b]: [u8; 3]) -> Lch {
    let rgb = LinSrgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let lab: Oklab = rgb.into_color();
    let lch: Oklch = lab.into_color();
    Lch {
        l: lch.l.clamp(0.0, 1.0),
        c: lch.chroma.max(0.0),
        h: normalize_hue(lch.hue.into_positive_degrees()),
    }
}

/// OKLCh → RGB, rounded and clamped to 0–255.
pub fn oklch_to_rgb(lch: Lch) -> [u8; 3] {
    let lab: Oklab = Oklch::new(lch.l, lch.c, lch.h).into_color();
    let rgb: LinSrgb = lab.into_color();
    [to_byte(rgb.red), to_byte(rgb.green), to_byte(rgb.blue)]
}

#[inline]
fn to_byte(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Wrap any angle in degrees into `[0, 360)`.
pub fn normalize_hue(h: f32) -> f32 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shorter angular difference between two hues, in degrees (`0..=180`).
pub fn hue_delta(a: f32, b: f32) -> f32 {
    let d = (a - b).abs().rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Perceptual distance between two coordinates.
///
/// `ΔL` and `ΔC` are scaled by 100, the hue difference (as a fraction of a
/// full turn) by 50, and the Euclidean norm is divided by 100 again.
pub fn distance(a: &Lch, b: &Lch) -> f32 {
    let dl = (a.l - b.l) * LC_WEIGHT;
    let dc = (a.c - b.c) * LC_WEIGHT;
    let dh = hue_delta(a.h, b.h) / 360.0 * HUE_WEIGHT;
    (dl * dl + dc * dc + dh * dh).sqrt() / 100.0
}

/// Mean of angles in degrees, computed from unit vectors so that the 0/360
/// seam averages correctly. An empty input yields `0`.
pub fn circular_mean<I>(angles: I) -> f32
where
    I: IntoIterator<Item = f32>,
{
    let (sin_sum, cos_sum) = angles.into_iter().fold((0.0f64, 0.0f64), |(s, c), h| {
        let rad = (h as f64).to_radians();
        (s + rad.sin(), c + rad.cos())
    });
    normalize_hue(sin_sum.atan2(cos_sum).to_degrees() as f32)
}

/// Mean lightness, mean chroma and circular-mean hue of a group.
pub fn mean_lch<'a, I>(points: I) -> Option<Lch>
where
    I: IntoIterator<Item = &'a Lch>,
{
    let mut n = 0usize;
    let mut l_sum = 0.0f64;
    let mut c_sum = 0.0f64;
    let mut hues = Vec::new();
    for p in points {
        n += 1;
        l_sum += p.l as f64;
        c_sum += p.c as f64;
        hues.push(p.h);
    }
    if n == 0 {
        return None;
    }
    Some(Lch {
        l: (l_sum / n as f64) as f32,
        c: (c_sum / n as f64) as f32,
        h: circular_mean(hues),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_one_step() {
        // Coarse grid over the cube plus the corners
        let steps = [0u8, 1, 17, 64, 100, 128, 173, 200, 254, 255];
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let back = oklch_to_rgb(rgb_to_oklch([r, g, b]));
                    for (orig, got) in [r, g, b].iter().zip(back.iter()) {
                        assert!(
                            (*orig as i16 - *got as i16).abs() <= 1,
                            "round trip of {:?} gave {:?}",
                            [r, g, b],
                            back
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn forward_ranges() {
        for rgb in [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 255, 0], [0, 0, 255], [12, 200, 90]] {
            let lch = rgb_to_oklch(rgb);
            assert!(lch.is_valid(), "{rgb:?} -> {lch:?}");
        }
    }

    #[test]
    fn gray_has_no_chroma() {
        let lch = rgb_to_oklch([128, 128, 128]);
        assert!(lch.c < 1e-4, "gray chroma {}", lch.c);
        assert!(lch.l > 0.7 && lch.l < 0.85);
    }

    #[test]
    fn primaries_have_expected_hues() {
        let red = rgb_to_oklch([255, 0, 0]);
        let green = rgb_to_oklch([0, 255, 0]);
        let blue = rgb_to_oklch([0, 0, 255]);
        assert!((red.h - 29.2).abs() < 1.0, "red hue {}", red.h);
        assert!((green.h - 142.5).abs() < 1.0, "green hue {}", green.h);
        assert!((blue.h - 264.1).abs() < 1.0, "blue hue {}", blue.h);
        assert!(red.c > 0.2 && green.c > 0.2 && blue.c > 0.2);
    }

    #[test]
    fn circular_mean_across_seam() {
        let mean = circular_mean([350.0, 10.0]);
        assert!(hue_delta(mean, 0.0) < 1e-3, "expected ~0, got {mean}");
        assert!((circular_mean([0.0, 0.0, 0.0])).abs() < 1e-6);
        assert!((circular_mean([90.0, 90.0]) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn circular_mean_empty_is_zero() {
        assert_eq!(circular_mean(std::iter::empty()), 0.0);
    }

    #[test]
    fn normalize_hue_wraps() {
        assert_eq!(normalize_hue(360.0), 0.0);
        assert!((normalize_hue(-30.0) - 330.0).abs() < 1e-4);
        assert!((normalize_hue(725.0) - 5.0).abs() < 1e-3);
        assert_eq!(normalize_hue(-1e-9), 0.0);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Lch::new(0.6, 0.2, 30.0);
        let b = Lch::new(0.4, 0.1, 300.0);
        assert_eq!(distance(&a, &a), 0.0);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn hue_weighted_less_than_lightness() {
        let base = Lch::new(0.5, 0.1, 0.0);
        // Half a turn of hue against half the lightness range
        let hue_far = Lch::new(0.5, 0.1, 180.0);
        let light_far = Lch::new(1.0, 0.1, 0.0);
        assert!(distance(&base, &hue_far) < distance(&base, &light_far));
        assert!((distance(&base, &hue_far) - 0.25).abs() < 1e-5);
        assert!((distance(&base, &light_far) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn mean_lch_of_group() {
        let pts = [Lch::new(0.2, 0.1, 350.0), Lch::new(0.4, 0.3, 10.0)];
        let m = mean_lch(&pts).unwrap();
        assert!((m.l - 0.3).abs() < 1e-6);
        assert!((m.c - 0.2).abs() < 1e-6);
        assert!(hue_delta(m.h, 0.0) < 1e-3);
        assert!(mean_lch(&Vec::<Lch>::new()).is_none());
    }

    #[test]
    fn css_rendering() {
        assert_eq!(Lch::new(0.5, 0.123456, 220.04).to_css(), "oklch(0.500 0.123 220.0deg)");
    }
}
