//! Extract a small, perceptually ranked theme palette from a raster image.
//!
//! The pipeline:
//! 1. Decode the image and pick a sampling grid from its luminance entropy.
//! 2. Convert every sample to OKLCh and drop ones too dark, too bright or too dull.
//! 3. Cluster with k-means (randomly seeded) and median cut (deterministic).
//! 4. Merge, deduplicate and score the candidates, then assign the
//!    `primary`, `secondary`, `accent`, `neutral` and `vibrant` roles.
//! 5. Score the result for harmony and correct it when it falls short.
//!
//! [`extract`] never fails: a decode error or an image with no usable colors
//! yields [`Palette::fallback`]. Use [`try_extract`] to see why.

use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

pub mod candidate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod filter;
pub mod oklch;
pub mod quality;
pub mod roles;
pub mod sampler;
pub mod shades;
pub mod theme;

pub use candidate::{ColorCandidate, Source};
pub use config::ExtractConfig;
pub use error::{ExtractError, Result};
pub use filter::{PerceptualFilter, Sample};
pub use oklch::Lch;
pub use quality::QualityReport;
pub use roles::{Palette, Role};
pub use sampler::{DecodingLoader, ImageLoader, ImageSource};
pub use shades::Shades;
pub use theme::ThemeStore;

// ------------------------------------------------------------
// Pipeline
// ------------------------------------------------------------

/// Random source for k-means seeding: fixed when `config.seed` is set.
pub fn seeded_rng(config: &ExtractConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Run filtering, both clusterers, ranking and the quality gate over
/// already-sampled pixels.
pub fn extract_from_pixels<R>(pixels: &[[u8; 3]], config: &ExtractConfig, rng: &mut R) -> Result<(Palette, QualityReport)>
where
    R: Rng + ?Sized,
{
    let samples: Vec<Sample> = pixels.iter().map(|&rgb| Sample::from_rgb(rgb)).collect();
    let filtered = PerceptualFilter::from_config(config).apply(&samples);
    debug!(sampled = samples.len(), kept = filtered.len(), "perceptual filter");
    if filtered.is_empty() {
        return Err(ExtractError::EmptySampleSet { sampled: samples.len() });
    }

    let points: Vec<Lch> = filtered.iter().map(|s| s.oklch).collect();
    let centroids = cluster::kmeans(&points, config.kmeans_k, config.kmeans_iterations, rng);
    let partitions = cluster::median_cut(&points, config.median_cut_depth);
    debug!(kmeans = centroids.len(), median_cut = partitions.len(), "clustered");

    let palette = roles::merge_and_rank(centroids, partitions);
    Ok(quality::apply_gate(palette, config.quality_threshold))
}

/// Sample a decoded image and extract its palette, reporting failures.
pub fn try_extract_from_image(img: &DynamicImage, config: &ExtractConfig) -> Result<Palette> {
    config.validate()?;
    let pixels = sampler::sample_image(img, config);
    let mut rng = seeded_rng(config);
    extract_from_pixels(&pixels, config, &mut rng).map(|(palette, _)| palette)
}

/// Load `source` through `loader` and extract its palette, reporting failures.
pub fn try_extract_with<L>(loader: &L, source: &ImageSource, config: &ExtractConfig) -> Result<Palette>
where
    L: ImageLoader + ?Sized,
{
    config.validate()?;
    let img = loader.load(source)?;
    try_extract_from_image(&img, config)
}

/// Decode `source` and extract its palette, reporting failures.
pub fn try_extract(source: impl Into<ImageSource>, config: &ExtractConfig) -> Result<Palette> {
    try_extract_with(&DecodingLoader, &source.into(), config)
}

fn or_fallback(result: Result<Palette>) -> Palette {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "palette extraction failed, using fallback palette");
        Palette::fallback()
    })
}

/// Extract a palette from a path or encoded bytes. Never fails.
pub fn extract(source: impl Into<ImageSource>, config: &ExtractConfig) -> Palette {
    or_fallback(try_extract(source, config))
}

/// [`extract`] with a custom image loader.
pub fn extract_with<L>(loader: &L, source: &ImageSource, config: &ExtractConfig) -> Palette
where
    L: ImageLoader + ?Sized,
{
    or_fallback(try_extract_with(loader, source, config))
}

/// [`extract`] for an image that is already decoded.
pub fn extract_from_image(img: &DynamicImage, config: &ExtractConfig) -> Palette {
    or_fallback(try_extract_from_image(img, config))
}

/// Extract a palette from encoded image bytes (PNG, JPEG, ...).
pub fn extract_palette_bytes(input: &[u8], config: &ExtractConfig) -> Palette {
    extract(input, config)
}

// ------------------------------------------------------------
// JS bindings
// ------------------------------------------------------------

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    let text = serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))?;
    js_sys::JSON::parse(&text)
}

/// Extract a palette from encoded image bytes.
///
/// The image bytes are fetched by the caller (use a CORS-enabled `fetch` for
/// remote images). Returns a plain object with `primary`, `secondary`,
/// `accent`, `neutral`, `vibrant` and `all`.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette(input: Vec<u8>, seed: Option<u32>) -> std::result::Result<JsValue, JsValue> {
    let config = ExtractConfig {
        seed: seed.map(u64::from),
        ..ExtractConfig::default()
    };
    to_js(&extract_palette_bytes(&input, &config))
}

/// Generate tone ramps from a palette object (any recognised color shape).
#[wasm_bindgen(js_name = generateShades)]
pub fn generate_shades(palette: JsValue) -> std::result::Result<JsValue, JsValue> {
    let text: String = js_sys::JSON::stringify(&palette)?.into();
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| JsValue::from_str(&format!("Invalid palette: {e}")))?;
    to_js(&Shades::from_json(&value))
}

/// CSS custom properties (`--primary`, `--secondary`, `--accent`) for a palette.
#[wasm_bindgen(js_name = paletteCss)]
pub fn palette_css(palette: JsValue) -> std::result::Result<JsValue, JsValue> {
    let text: String = js_sys::JSON::stringify(&palette)?.into();
    let palette: Palette = serde_json::from_str(&text)
        .map_err(|e| JsValue::from_str(&format!("Invalid palette: {e}")))?;
    let vars: std::collections::BTreeMap<String, String> = palette.to_css_variables().into_iter().collect();
    to_js(&vars)
}
