//! Merging the two clusterers' output into a ranked, role-assigned palette.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidate::{ColorCandidate, Source};
use crate::oklch::{self, Lch};

/// Candidates closer than this to an already accepted one are duplicates.
pub const DEDUP_RADIUS: f32 = 0.15;
/// Number of ranked candidates kept in [`Palette::all`].
pub const MAX_RANKED: usize = 8;
/// Chroma a candidate must exceed to count as vibrant.
pub const VIBRANT_CHROMA: f32 = 0.2;

/// Semantic purpose of a palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Neutral,
    Vibrant,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Primary, Role::Secondary, Role::Accent, Role::Neutral, Role::Vibrant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::Neutral => "neutral",
            Self::Vibrant => "vibrant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "accent" => Ok(Self::Accent),
            "neutral" => Ok(Self::Neutral),
            "vibrant" => Ok(Self::Vibrant),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// Final extraction result. Every role is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: ColorCandidate,
    pub secondary: ColorCandidate,
    pub accent: ColorCandidate,
    pub neutral: ColorCandidate,
    pub vibrant: ColorCandidate,
    /// Up to [`MAX_RANKED`] candidates, best first.
    pub all: Vec<ColorCandidate>,
}

impl Palette {
    /// Fixed palette returned whenever extraction cannot proceed.
    pub fn fallback() -> Self {
        let fixed = |l, c, h, rgb| ColorCandidate::with_rgb(Lch::new(l, c, h), rgb, Source::Fallback);
        Self {
            primary: fixed(0.45, 0.2, 220.0, [75, 98, 255]),
            secondary: fixed(0.5, 0.15, 280.0, [120, 60, 200]),
            accent: fixed(0.6, 0.18, 20.0, [255, 140, 80]),
            neutral: fixed(0.5, 0.01, 220.0, [128, 128, 128]),
            vibrant: fixed(0.55, 0.25, 60.0, [255, 220, 50]),
            all: Vec::new(),
        }
    }

    pub fn get(&self, role: Role) -> &ColorCandidate {
        match role {
            Role::Primary => &self.primary,
            Role::Secondary => &self.secondary,
            Role::Accent => &self.accent,
            Role::Neutral => &self.neutral,
            Role::Vibrant => &self.vibrant,
        }
    }

    /// Coordinate of a role looked up by name, or primary's for unknown names.
    pub fn color_or_primary(&self, name: &str) -> Lch {
        name.parse::<Role>()
            .map(|role| self.get(role).oklch)
            .unwrap_or(self.primary.oklch)
    }

    /// `--primary`, `--secondary` and `--accent` as CSS `oklch()` values.
    pub fn to_css_variables(&self) -> Vec<(String, String)> {
        [Role::Primary, Role::Secondary, Role::Accent]
            .into_iter()
            .map(|role| (format!("--{role}"), self.get(role).oklch.to_css()))
            .collect()
    }

    /// Whether this is exactly the fixed fallback palette.
    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}

/// How good a color is as a theme color: saturated enough and mid-lightness.
pub fn color_score(lch: &Lch) -> f32 {
    let saturation = (lch.c / 0.25).min(1.0);
    let lightness = 1.0 - (lch.l - 0.5).abs() / 0.5;
    saturation * 0.6 + lightness * 0.4
}

/// Greedy dedup in list order: keep a candidate only if nothing accepted so
/// far is within [`DEDUP_RADIUS`].
pub fn dedup(candidates: impl IntoIterator<Item = ColorCandidate>) -> Vec<ColorCandidate> {
    let mut unique: Vec<ColorCandidate> = Vec::new();
    for candidate in candidates {
        let duplicate = unique
            .iter()
            .any(|u| oklch::distance(&u.oklch, &candidate.oklch) < DEDUP_RADIUS);
        if !duplicate {
            unique.push(candidate);
        }
    }
    unique
}

/// Combine both clusterers' candidates and assign roles.
pub fn merge_and_rank(kmeans: Vec<ColorCandidate>, median_cut: Vec<ColorCandidate>) -> Palette {
    let unique = dedup(kmeans.into_iter().chain(median_cut));

    let mut ranked: Vec<ColorCandidate> = unique
        .into_iter()
        .map(|c| c.scored(color_score(&c.oklch)))
        .collect();
    // Stable: equal scores keep concatenation order
    ranked.sort_by(|a, b| b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0)));
    debug!(candidates = ranked.len(), "ranked candidates");

    assign_roles(ranked)
}

/// Role assignment over candidates already sorted best-first.
fn assign_roles(ranked: Vec<ColorCandidate>) -> Palette {
    let default = ColorCandidate::default_color();
    let at = |i: usize| ranked.get(i).copied();

    let primary = at(0).unwrap_or(default);
    let secondary = at(1).unwrap_or(primary);
    let accent = at(2).or(at(1)).unwrap_or(primary);

    let mut neutral: Option<ColorCandidate> = None;
    for c in &ranked {
        if neutral.is_none_or(|n| c.oklch.c < n.oklch.c) {
            neutral = Some(*c);
        }
    }
    let neutral = neutral.unwrap_or(default);

    let vibrant = ranked
        .iter()
        .find(|c| c.oklch.c > VIBRANT_CHROMA)
        .copied()
        .unwrap_or(primary);

    let all = ranked.into_iter().take(MAX_RANKED).collect();

    Palette { primary, secondary, accent, neutral, vibrant, all }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(l: f32, c: f32, h: f32, source: Source) -> ColorCandidate {
        ColorCandidate::new(Lch::new(l, c, h), source)
    }

    #[test]
    fn score_prefers_saturated_mid_lightness() {
        assert!((color_score(&Lch::new(0.5, 0.25, 0.0)) - 1.0).abs() < 1e-6);
        assert!((color_score(&Lch::new(0.5, 0.5, 0.0)) - 1.0).abs() < 1e-6);
        assert!(color_score(&Lch::new(0.9, 0.25, 0.0)) < color_score(&Lch::new(0.6, 0.25, 0.0)));
        assert!(color_score(&Lch::new(0.5, 0.05, 0.0)) < color_score(&Lch::new(0.5, 0.2, 0.0)));
        assert!(color_score(&Lch::new(0.0, 0.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn dedup_keeps_first_of_near_pair() {
        let a = cand(0.5, 0.2, 100.0, Source::KMeans);
        let b = cand(0.52, 0.2, 100.0, Source::MedianCut);
        let c = cand(0.9, 0.1, 300.0, Source::MedianCut);
        let out = dedup([a, b, c]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source, Source::KMeans);
        assert_eq!(out[1].oklch, c.oklch);
    }

    #[test]
    fn roles_follow_rank() {
        let kmeans = vec![
            cand(0.5, 0.25, 30.0, Source::KMeans),  // 1.0
            cand(0.3, 0.10, 150.0, Source::KMeans), // 0.24 + 0.24
            cand(0.7, 0.20, 270.0, Source::KMeans), // 0.48 + 0.24
        ];
        let median = vec![cand(0.5, 0.06, 200.0, Source::MedianCut)]; // 0.144 + 0.4
        let palette = merge_and_rank(kmeans, median);

        assert_eq!(palette.primary.oklch.h, 30.0);
        assert_eq!(palette.secondary.oklch.h, 270.0);
        assert_eq!(palette.accent.oklch.h, 200.0);
        assert_eq!(palette.neutral.oklch.h, 200.0);
        assert_eq!(palette.vibrant.oklch.h, 30.0);
        assert_eq!(palette.all.len(), 4);
        assert!(palette.all.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn single_candidate_fills_every_role() {
        let palette = merge_and_rank(vec![cand(0.5, 0.1, 10.0, Source::KMeans)], Vec::new());
        for role in Role::ALL {
            assert_eq!(palette.get(role).oklch, Lch::new(0.5, 0.1, 10.0), "{role}");
        }
        assert_eq!(palette.all.len(), 1);
    }

    #[test]
    fn two_candidates_accent_falls_back_to_second() {
        let palette = merge_and_rank(
            vec![cand(0.5, 0.25, 10.0, Source::KMeans), cand(0.8, 0.1, 200.0, Source::KMeans)],
            Vec::new(),
        );
        assert_eq!(palette.accent.oklch, palette.secondary.oklch);
        assert_ne!(palette.accent.oklch, palette.primary.oklch);
    }

    #[test]
    fn no_candidates_uses_default_color() {
        let palette = merge_and_rank(Vec::new(), Vec::new());
        for role in Role::ALL {
            assert_eq!(palette.get(role).oklch, Lch::new(0.5, 0.15, 220.0));
        }
        assert!(palette.all.is_empty());
    }

    #[test]
    fn vibrant_falls_back_to_primary_when_dull() {
        let palette = merge_and_rank(
            vec![cand(0.5, 0.15, 10.0, Source::KMeans), cand(0.8, 0.1, 200.0, Source::KMeans)],
            Vec::new(),
        );
        assert_eq!(palette.vibrant, palette.primary);
    }

    #[test]
    fn all_capped_at_eight() {
        // 4 x 3 grid in (L, C), every pair at least 0.2 apart
        let many: Vec<ColorCandidate> = (0..12)
            .map(|i| {
                let l = 0.2 + 0.2 * (i % 4) as f32;
                let c = 0.05 + 0.2 * (i / 4) as f32;
                cand(l, c, 90.0, Source::MedianCut)
            })
            .collect();
        let palette = merge_and_rank(Vec::new(), many);
        assert_eq!(palette.all.len(), MAX_RANKED);
    }

    #[test]
    fn fallback_is_complete() {
        let palette = Palette::fallback();
        assert!(palette.all.is_empty());
        assert!(palette.is_fallback());
        for role in Role::ALL {
            assert!(palette.get(role).oklch.is_valid());
        }
        assert_eq!(palette.primary.rgb, [75, 98, 255]);
    }

    #[test]
    fn css_variables() {
        let vars = Palette::fallback().to_css_variables();
        assert_eq!(vars[0], ("--primary".to_string(), "oklch(0.450 0.200 220.0deg)".to_string()));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn lookup_by_name() {
        let palette = Palette::fallback();
        assert_eq!(palette.color_or_primary("accent"), palette.accent.oklch);
        assert_eq!(palette.color_or_primary("Vibrant"), palette.vibrant.oklch);
        assert_eq!(palette.color_or_primary("nope"), palette.primary.oklch);
    }
}
