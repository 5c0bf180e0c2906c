use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Tunables for one extraction run.
///
/// Missing fields in a JSON file fall back to the defaults, so a config file
/// only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Smallest side of the square sampling grid.
    pub min_sample_size: u32,
    /// Largest side of the square sampling grid.
    pub max_sample_size: u32,
    /// Side of the preview used to measure entropy.
    pub preview_size: u32,
    /// Entropy below which the image is treated as trivially simple.
    pub entropy_threshold: f32,
    /// Entropy above which the largest grid is used.
    pub max_entropy: f32,
    /// Initial centroid count for k-means.
    pub kmeans_k: usize,
    /// Fixed number of k-means rounds.
    pub kmeans_iterations: usize,
    /// Recursion depth of median cut (at most `2^depth` leaves).
    pub median_cut_depth: u32,
    /// Minimum chroma a sample needs to survive filtering.
    pub min_saturation: f32,
    pub min_lightness: f32,
    pub max_lightness: f32,
    /// Quality score below which the palette is augmented.
    pub quality_threshold: f32,
    /// Fixes the k-means seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 16,
            max_sample_size: 128,
            preview_size: 32,
            entropy_threshold: 0.15,
            max_entropy: 7.0,
            kmeans_k: 16,
            kmeans_iterations: 8,
            median_cut_depth: 5,
            min_saturation: 0.05,
            min_lightness: 0.15,
            max_lightness: 0.95,
            quality_threshold: 0.6,
            seed: None,
        }
    }
}

impl ExtractConfig {
    /// Load a (possibly partial) config from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| ExtractError::InvalidConfig(format!("{}: {e}", path.as_ref().display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style seed override.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_sample_size == 0 || self.preview_size == 0 {
            return Err(ExtractError::InvalidConfig(
                "sample and preview sizes must be non-zero".into(),
            ));
        }
        if self.min_sample_size > self.max_sample_size {
            return Err(ExtractError::InvalidConfig(format!(
                "min_sample_size {} exceeds max_sample_size {}",
                self.min_sample_size, self.max_sample_size
            )));
        }
        if self.min_lightness > self.max_lightness {
            return Err(ExtractError::InvalidConfig(format!(
                "lightness window [{}, {}] is inverted",
                self.min_lightness, self.max_lightness
            )));
        }
        if self.kmeans_k == 0 {
            return Err(ExtractError::InvalidConfig("kmeans_k must be at least 1".into()));
        }
        Ok(())
    }
}
