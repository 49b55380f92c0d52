//! Strip → grid composition.
//!
//! ```text
//! strip (n × sub_width wide)          canvas (cols × rows cells)
//! ┌───┬───┬───┬───┬───┬───┐           ┌───┬───┬───┐
//! │ 0 │ 1 │ 2 │ 3 │ 4 │ 5 │    →      │ 0 │ 1 │ 2 │
//! └───┴───┴───┴───┴───┴───┘           ├───┼───┼───┤
//!                                     │ 3 │ 4 │ 5 │
//!                                     └───┴───┴───┘
//! ```
//!
//! Cells are filled row-major; cells past the last sub-image keep the
//! background. Downscaling runs once on the finished canvas with a box filter
//! so each output pixel is the area average of the pixels it covers.

use super::error::GridError;
use super::params::{GridParams, Scale};
use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage, imageops};

/// Split a strip width into sub-images of `sub_width`.
///
/// Returns the sub-image count. A trailing partial sub-image is an error,
/// never silently dropped.
pub fn count_sub_images(width: u32, sub_width: u32) -> Result<u32, GridError> {
    if sub_width == 0 {
        return Err(GridError::InvalidInput("sub-width must be positive".into()));
    }
    if width == 0 || width % sub_width != 0 {
        return Err(GridError::DimensionMismatch { width, sub_width });
    }
    Ok(width / sub_width)
}

/// Arrange the sub-images of `strip` into the grid described by `params`.
///
/// Never touches the input buffer and writes nothing to disk.
pub fn compose(strip: &DynamicImage, params: &GridParams) -> Result<RgbaImage, GridError> {
    let (width, height) = strip.dimensions();
    let sub_width = params.sub_width;
    let layout = params.layout;

    let count = count_sub_images(width, sub_width)?;
    if height == 0 {
        return Err(GridError::InvalidInput("strip height must be positive".into()));
    }
    if layout.rows == 0 || layout.cols == 0 || layout.capacity() < u64::from(count) {
        return Err(GridError::InvalidInput(format!(
            "layout {layout} cannot hold {count} sub-images"
        )));
    }

    let canvas_width = layout
        .cols
        .checked_mul(sub_width)
        .ok_or_else(|| GridError::InvalidInput(format!("canvas too wide for layout {layout}")))?;
    let canvas_height = layout
        .rows
        .checked_mul(height)
        .ok_or_else(|| GridError::InvalidInput(format!("canvas too tall for layout {layout}")))?;

    let source = strip.to_rgba8();
    let mut canvas: RgbaImage =
        ImageBuffer::from_pixel(canvas_width, canvas_height, params.background.0);

    for index in 0..count {
        let tile = imageops::crop_imm(&source, index * sub_width, 0, sub_width, height).to_image();
        let (row, col) = layout.cell_of(index);
        imageops::replace(
            &mut canvas,
            &tile,
            i64::from(col * sub_width),
            i64::from(row * height),
        );
    }
    log::debug!(
        "placed {count} sub-images of {sub_width}x{height} into {layout} ({canvas_width}x{canvas_height})"
    );

    if params.scale.is_identity() {
        return Ok(canvas);
    }
    downscale(canvas, params.scale)
}

/// Area-averaging downscale of a whole canvas.
///
/// Takes the canvas by value so its pixel buffer moves into the resizer.
pub fn downscale(canvas: RgbaImage, scale: Scale) -> Result<RgbaImage, GridError> {
    let (src_width, src_height) = canvas.dimensions();
    let (dst_width, dst_height) = (scale.apply(src_width), scale.apply(src_height));

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        canvas.into_raw(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| GridError::Resample(format!("source buffer rejected: {e}")))?;
    let mut dst_image = fr::images::Image::new(dst_width, dst_height, fr::PixelType::U8x4);

    let options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box));
    fr::Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| GridError::Resample(e.to_string()))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(dst_width, dst_height, dst_image.into_vec())
        .ok_or_else(|| GridError::Resample("resized buffer has unexpected length".into()))
}
