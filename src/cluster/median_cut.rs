//! Median cut over lightness and chroma.
//!
//! Each level sorts the group along whichever of L or C spans the wider range
//! and halves it at the median. No randomness is involved, so identical input
//! always yields identical leaves.

use crate::candidate::{ColorCandidate, Source};
use crate::oklch::{self, Lch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Lightness,
    Chroma,
}

impl Axis {
    fn key(self, p: &Lch) -> f32 {
        match self {
            Self::Lightness => p.l,
            Self::Chroma => p.c,
        }
    }
}

fn range_of(points: &[Lch], axis: Axis) -> f32 {
    let (lo, hi) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let v = axis.key(p);
        (lo.min(v), hi.max(v))
    });
    hi - lo
}

/// Split `points` recursively up to `depth` levels (at most `2^depth` leaves).
pub fn median_cut(points: &[Lch], depth: u32) -> Vec<ColorCandidate> {
    let mut work = points.to_vec();
    let mut leaves = Vec::new();
    split(&mut work, depth, &mut leaves);
    leaves
}

fn split(points: &mut [Lch], depth: u32, leaves: &mut Vec<ColorCandidate>) {
    if points.is_empty() {
        return;
    }
    if depth == 0 || points.len() <= 1 {
        if let Some(mean) = oklch::mean_lch(points.iter()) {
            leaves.push(ColorCandidate::new(mean, Source::MedianCut));
        }
        return;
    }

    let axis = if range_of(points, Axis::Lightness) > range_of(points, Axis::Chroma) {
        Axis::Lightness
    } else {
        Axis::Chroma
    };
    points.sort_by(|a, b| axis.key(a).total_cmp(&axis.key(b)));

    let mid = points.len() / 2;
    let (left, right) = points.split_at_mut(mid);
    split(left, depth - 1, leaves);
    split(right, depth - 1, leaves);
}
