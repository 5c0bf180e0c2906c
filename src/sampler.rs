//! Image loading and entropy-driven sampling.
//!
//! The number of pixels analysed scales with how busy the image is: a small
//! preview is reduced to a luminance histogram, its Shannon entropy picks the
//! side of a square sampling grid, and the whole image is resized onto that
//! grid.

use std::path::PathBuf;

use image::error::{LimitError, LimitErrorKind};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};
use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};

/// Where the image comes from.
///
/// Remote images are fetched by the host (JS `fetch` in the browser, the
/// caller natively) and handed over as [`ImageSource::Bytes`].
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Decodes an [`ImageSource`] into pixels.
pub trait ImageLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage>;
}

/// Loader backed by the `image` crate's format detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecodingLoader;

impl ImageLoader for DecodingLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage> {
        let img = match source {
            ImageSource::Path(path) => image::open(path)?,
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes)?,
        };
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(ExtractError::ImageDecode(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::DimensionError,
            ))));
        }
        Ok(img)
    }
}

/// Nearest-neighbour resize onto a `side`×`side` grid, read back as RGB
/// triplets in row-major order. Alpha is ignored.
pub fn extract_pixels(img: &DynamicImage, side: u32) -> Vec<[u8; 3]> {
    let resized = image::imageops::resize(img, side, side, FilterType::Nearest);
    resized.pixels().map(|p| [p[0], p[1], p[2]]).collect()
}

/// Shannon entropy (bits) of the luminance histogram of a `preview`×`preview`
/// thumbnail.
pub fn luminance_entropy(img: &DynamicImage, preview: u32) -> f32 {
    let pixels = extract_pixels(img, preview);
    let mut histogram = [0u32; 256];
    for [r, g, b] in &pixels {
        let gray = 0.299 * *r as f32 + 0.587 * *g as f32 + 0.114 * *b as f32;
        histogram[(gray.floor() as usize).min(255)] += 1;
    }

    let total = pixels.len() as f32;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f32 / total;
            -p * p.log2()
        })
        .sum()
}

/// Map an entropy value onto the sampling grid side.
pub fn adaptive_sample_size(entropy: f32, config: &ExtractConfig) -> u32 {
    if entropy < config.entropy_threshold {
        config.min_sample_size
    } else if entropy > config.max_entropy {
        config.max_sample_size
    } else {
        let range = (config.max_sample_size - config.min_sample_size) as f32;
        config.min_sample_size + (range * (entropy / 8.0)).floor() as u32
    }
}

/// Pick a grid size for `img` and sample it.
pub fn sample_image(img: &DynamicImage, config: &ExtractConfig) -> Vec<[u8; 3]> {
    let entropy = luminance_entropy(img, config.preview_size);
    let side = adaptive_sample_size(entropy, config);
    debug!(entropy, side, "adaptive sample size");
    extract_pixels(img, side)
}
