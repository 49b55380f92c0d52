use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong turning a strip into a grid.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Strip width {width} is not divisible by sub-width {sub_width}")]
    DimensionMismatch { width: u32, sub_width: u32 },
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
    #[error("Resampling failed: {0}")]
    Resample(String),
}
