//! Shared test utilities for the shotkit test suite.
//!
//! Builds synthetic strips in memory or on disk, and empty placeholder files
//! for the sorter tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let strip = solid_strip(6, 100, 100);
//! assert_eq!(strip.dimensions(), (600, 100));
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_strip(&tmp.path().join("strip.png"), 6, 100, 100);
//! touch(&tmp.path().join("desk/Screenshot 2024-03-05 at 10.15.32.png"));
//! ```

use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic strips
// =========================================================================

/// Distinct opaque colours; sub-image `i` of a [`solid_strip`] is
/// `PALETTE[i % PALETTE.len()]`.
pub const PALETTE: [Rgba<u8>; 10] = [
    Rgba([220, 20, 60, 255]),
    Rgba([30, 144, 255, 255]),
    Rgba([50, 205, 50, 255]),
    Rgba([255, 215, 0, 255]),
    Rgba([148, 0, 211, 255]),
    Rgba([255, 140, 0, 255]),
    Rgba([0, 206, 209, 255]),
    Rgba([139, 69, 19, 255]),
    Rgba([255, 255, 255, 255]),
    Rgba([0, 0, 0, 255]),
];

/// A strip of `count` solid-colour sub-images, each `sub_width × height`.
pub fn solid_strip(count: u32, sub_width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(count * sub_width, height, |x, _| {
        PALETTE[(x / sub_width) as usize % PALETTE.len()]
    });
    DynamicImage::ImageRgba8(img)
}

/// Write a [`solid_strip`] to disk. The format follows the extension.
pub fn write_strip(path: &Path, count: u32, sub_width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    solid_strip(count, sub_width, height)
        .save(path)
        .unwrap_or_else(|e| panic!("failed to write strip {}: {e}", path.display()));
}

// =========================================================================
// Placeholder files
// =========================================================================

/// Create a small file (and its parent directories). The content is the
/// file name, so copies can be compared byte for byte.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let name = path.file_name().unwrap().to_string_lossy();
    std::fs::write(path, name.as_bytes()).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_strip_colours_each_sub_image() {
        let strip = solid_strip(3, 5, 2).to_rgba8();
        assert_eq!(strip.dimensions(), (15, 2));
        assert_eq!(*strip.get_pixel(0, 0), PALETTE[0]);
        assert_eq!(*strip.get_pixel(4, 1), PALETTE[0]);
        assert_eq!(*strip.get_pixel(5, 0), PALETTE[1]);
        assert_eq!(*strip.get_pixel(14, 1), PALETTE[2]);
    }
}
