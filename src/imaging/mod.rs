//! Grid composition in pure Rust, no system image libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Dimensions** | `image::image_dimensions` |
//! | **Decode / encode** | `image::ImageReader`, `ImageBuffer::save_with_format` |
//! | **Slice + place** | `imageops::crop_imm` + `imageops::replace` |
//! | **Downscale** | `fast_image_resize` box convolution (area average) |
//!
//! The module is split into:
//! - **Layout**: Pure rows×cols selection (unit testable, no pixels)
//! - **Parameters**: Validated inputs for one composition
//! - **Compose**: Slicing, placement and scaling of an in-memory strip
//! - **Codec**: Disk I/O with path-carrying errors

mod codec;
mod compose;
mod error;
mod layout;
mod params;

pub use codec::{load_image, output_format, read_dimensions, save_image};
pub use compose::{compose, count_sub_images, downscale};
pub use error::GridError;
pub use layout::{Layout, compute_layouts, select_best_layout};
pub use params::{Background, GridParams, Scale};
