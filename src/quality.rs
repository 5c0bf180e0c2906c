//! Harmony check over primary, secondary and accent, with a corrective pass
//! for palettes that score too low.

use serde::Serialize;
use tracing::debug;

use crate::candidate::{ColorCandidate, Source};
use crate::oklch::{self, Lch};
use crate::roles::Palette;

/// Primary chroma above this is considered too loud when augmenting.
pub const MAX_PRIMARY_CHROMA: f32 = 0.25;
/// Chroma primary is clamped to when too loud.
pub const CLAMPED_PRIMARY_CHROMA: f32 = 0.22;
/// A neutral with more chroma than this is replaced.
pub const MAX_NEUTRAL_CHROMA: f32 = 0.05;

/// Breakdown of the harmony score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityReport {
    /// Final score in `[0, 1]`.
    pub score: f32,
    /// Mean pairwise distance between the three main roles.
    pub contrast: f32,
    pub saturation_variance: f32,
    pub lightness_variance: f32,
}

fn spread(values: [f32; 3]) -> f32 {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    max - min
}

/// Score how well primary, secondary and accent work together.
pub fn assess(palette: &Palette) -> QualityReport {
    let colors = [palette.primary.oklch, palette.secondary.oklch, palette.accent.oklch];

    let contrast = (oklch::distance(&colors[0], &colors[1])
        + oklch::distance(&colors[0], &colors[2])
        + oklch::distance(&colors[1], &colors[2]))
        / 3.0;
    let saturation_variance = spread(colors.map(|c| c.c));
    let lightness_variance = spread(colors.map(|c| c.l));

    let score = contrast * 0.4
        + (saturation_variance / 0.2).min(1.0) * 0.3
        + (lightness_variance / 0.4).min(1.0) * 0.3;

    QualityReport {
        score: score.min(1.0),
        contrast,
        saturation_variance,
        lightness_variance,
    }
}

/// Tone down an over-saturated primary and force a real neutral.
///
/// Only the primary and neutral slots change; `all` and the other roles are
/// carried over untouched.
pub fn augment(palette: Palette) -> Palette {
    let primary = if palette.primary.oklch.c > MAX_PRIMARY_CHROMA {
        let oklch = palette.primary.oklch.with_chroma(CLAMPED_PRIMARY_CHROMA);
        ColorCandidate { oklch, rgb: oklch.to_rgb(), ..palette.primary }
    } else {
        palette.primary
    };

    let neutral = if palette.neutral.oklch.c > MAX_NEUTRAL_CHROMA {
        ColorCandidate::new(Lch::new(0.5, 0.01, primary.oklch.h), Source::Augmented)
    } else {
        palette.neutral
    };

    Palette { primary, neutral, ..palette }
}

/// Assess `palette` and augment it when the score is below `threshold`.
pub fn apply_gate(palette: Palette, threshold: f32) -> (Palette, QualityReport) {
    let report = assess(&palette);
    debug!(score = report.score, contrast = report.contrast, "palette quality");
    if report.score < threshold {
        debug!(threshold, "quality below threshold, augmenting");
        (augment(palette), report)
    } else {
        (palette, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(l: f32, c: f32, h: f32) -> ColorCandidate {
        ColorCandidate::new(Lch::new(l, c, h), Source::KMeans)
    }

    fn palette(primary: ColorCandidate, neutral: ColorCandidate) -> Palette {
        let secondary = cand(0.52, 0.28, 40.0);
        let accent = cand(0.48, 0.29, 35.0);
        Palette {
            primary,
            secondary,
            accent,
            neutral,
            vibrant: primary,
            all: vec![primary, secondary, accent, neutral],
        }
    }

    #[test]
    fn similar_colors_score_low() {
        let p = palette(cand(0.5, 0.30, 30.0), cand(0.5, 0.10, 30.0));
        let report = assess(&p);
        assert!(report.score < 0.6, "score {}", report.score);
        assert!(report.contrast < 0.1);
    }

    #[test]
    fn diverse_colors_score_high() {
        let p = Palette {
            primary: cand(0.2, 0.05, 20.0),
            secondary: cand(0.9, 0.30, 200.0),
            accent: cand(0.5, 0.15, 110.0),
            ..Palette::fallback()
        };
        let report = assess(&p);
        // contrast ~0.52 plus both variance terms saturated
        assert!(report.score > 0.75 && report.score <= 1.0, "score {}", report.score);
        assert!((report.lightness_variance - 0.7).abs() < 1e-6);
        assert!((report.saturation_variance - 0.25).abs() < 1e-6);
    }

    #[test]
    fn gate_clamps_primary_and_replaces_neutral() {
        let p = palette(cand(0.5, 0.30, 30.0), cand(0.5, 0.10, 30.0));
        let (out, report) = apply_gate(p.clone(), 0.6);
        assert!(report.score < 0.6);
        assert!((out.primary.oklch.c - 0.22).abs() < 1e-6);
        assert_eq!(out.primary.oklch.h, 30.0);
        assert!((out.neutral.oklch.c - 0.01).abs() < 1e-6);
        assert_eq!(out.neutral.oklch.h, 30.0);
        assert_eq!(out.neutral.source, Source::Augmented);
        // Other slots and the ranked list are untouched
        assert_eq!(out.secondary, p.secondary);
        assert_eq!(out.all, p.all);
        assert_eq!(out.vibrant, p.vibrant);
    }

    #[test]
    fn gate_leaves_good_palette_alone() {
        let p = palette(cand(0.5, 0.30, 30.0), cand(0.5, 0.10, 30.0));
        let (out, _) = apply_gate(p.clone(), 0.0);
        assert_eq!(out, p);
    }

    #[test]
    fn augment_keeps_moderate_colors() {
        let p = palette(cand(0.5, 0.2, 30.0), cand(0.6, 0.03, 90.0));
        let out = augment(p.clone());
        assert_eq!(out, p);
    }
}
