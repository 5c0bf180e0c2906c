use serde::{Deserialize, Serialize};

use crate::oklch::Lch;

/// Which stage produced a candidate color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    KMeans,
    MedianCut,
    /// Forced near-gray inserted by the quality gate.
    Augmented,
    /// Placeholder for a role that had no real candidate.
    Default,
    Fallback,
}

/// A representative color from one of the clusterers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorCandidate {
    pub oklch: Lch,
    pub rgb: [u8; 3],
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl ColorCandidate {
    /// Candidate whose RGB is derived from its coordinate.
    pub fn new(oklch: Lch, source: Source) -> Self {
        Self { oklch, rgb: oklch.to_rgb(), source, score: None }
    }

    /// Candidate with an explicit RGB value, used for hardcoded colors.
    pub const fn with_rgb(oklch: Lch, rgb: [u8; 3], source: Source) -> Self {
        Self { oklch, rgb, source, score: None }
    }

    /// Placeholder for a role no candidate could fill.
    pub const fn default_color() -> Self {
        Self::with_rgb(Lch::new(0.5, 0.15, 220.0), [100, 120, 200], Source::Default)
    }

    #[must_use]
    pub fn scored(self, score: f32) -> Self {
        Self { score: Some(score), ..self }
    }

    /// `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}
