//! Reading strips from disk and writing canvases back.
//!
//! Decoding goes through `image`'s reader with content sniffing, so a PNG
//! saved as `.jpg` still loads. Encoding picks the format from the output
//! extension; JPEG has no alpha channel and gets an RGB copy.

use super::error::GridError;
use image::buffer::ConvertBuffer;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::path::Path;

/// Formats with a compiled-in encoder, keyed by lowercase extension.
const OUTPUT_FORMATS: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
];

/// Output format for a path, from its extension.
pub fn output_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    OUTPUT_FORMATS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, format)| *format)
}

/// Strip dimensions without decoding pixel data.
pub fn read_dimensions(path: &Path) -> Result<(u32, u32), GridError> {
    image::image_dimensions(path).map_err(|e| GridError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, GridError> {
    let decode_error = |message: String| GridError::Decode {
        path: path.to_path_buf(),
        message,
    };
    ImageReader::open(path)
        .map_err(|e| decode_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))
}

/// Encode `canvas` to `path`, inferring the format from the extension.
///
/// On failure, a file this call created is removed again; a file that
/// already existed is left as the encoder left it.
pub fn save_image(canvas: &RgbaImage, path: &Path) -> Result<(), GridError> {
    let encode_error = |message: String| GridError::Encode {
        path: path.to_path_buf(),
        message,
    };
    let format = output_format(path).ok_or_else(|| {
        encode_error(format!(
            "unsupported output format '{}'",
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default()
        ))
    })?;

    let existed = path.exists();
    let result = match format {
        ImageFormat::Jpeg => {
            let rgb: RgbImage = canvas.convert();
            rgb.save_with_format(path, format)
        }
        _ => canvas.save_with_format(path, format),
    };

    result.map_err(|e| {
        if !existed && path.exists() {
            if let Err(cleanup) = std::fs::remove_file(path) {
                log::warn!("could not remove partial output {}: {cleanup}", path.display());
            }
        }
        encode_error(e.to_string())
    })
}
