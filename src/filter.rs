use serde::Serialize;

use crate::config::ExtractConfig;
use crate::oklch::Lch;

/// One sampled pixel with its OKLCh coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub rgb: [u8; 3],
    pub oklch: Lch,
}

impl Sample {
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self { rgb, oklch: Lch::from_rgb(rgb) }
    }
}

/// Lightness and chroma window a sample must fall into.
#[derive(Debug, Clone, Copy)]
pub struct PerceptualFilter {
    pub min_lightness: f32,
    pub max_lightness: f32,
    pub min_saturation: f32,
}

impl PerceptualFilter {
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self {
            min_lightness: config.min_lightness,
            max_lightness: config.max_lightness,
            min_saturation: config.min_saturation,
        }
    }

    /// Both lightness bounds and the chroma floor are inclusive.
    #[inline]
    pub fn accepts(&self, lch: &Lch) -> bool {
        lch.l >= self.min_lightness && lch.l <= self.max_lightness && lch.c >= self.min_saturation
    }

    /// Keep samples that are neither too dark, too bright nor too dull.
    /// Order is preserved.
    pub fn apply(&self, samples: &[Sample]) -> Vec<Sample> {
        samples.iter().filter(|s| self.accepts(&s.oklch)).copied().collect()
    }
}

impl Default for PerceptualFilter {
    fn default() -> Self {
        Self::from_config(&ExtractConfig::default())
    }
}
