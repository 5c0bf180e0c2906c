use thiserror::Error;

/// Failures that can occur while extracting a palette.
///
/// The `extract*` entry points never surface these; they log the cause and
/// return [`Palette::fallback`](crate::Palette::fallback) instead. They are
/// exposed for callers that want the root cause via [`try_extract`](crate::try_extract).
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unable to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No samples left after perceptual filtering ({sampled} sampled)")]
    EmptySampleSet { sampled: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Theme store error: {0}")]
    ThemeStore(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
