//! Parameter types for grid composition.
//!
//! These structs describe *what* to build, not *how*. The file-level
//! [`grid`](crate::grid) pipeline fills them in from config and CLI flags;
//! [`compose`](super::compose) consumes them.
//!
//! ## Types
//!
//! - [`Scale`]: Uniform output scale in `(0, 1]`, default `1.0`. Validated on construction.
//! - [`Background`]: RGBA fill for empty grid cells, parsed from `#RRGGBB` / `#RRGGBBAA`.
//! - [`GridParams`]: Sub-width, layout, scale and background for one composition.

use super::error::GridError;
use super::layout::Layout;
use image::Rgba;

/// Uniform scale factor applied to the assembled canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    pub const ONE: Scale = Scale(1.0);

    pub fn new(value: f64) -> Result<Self, GridError> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(GridError::InvalidInput(format!(
                "scale must be in (0, 1], got {value}"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }

    /// Scale one pixel dimension, rounding to nearest and never below 1.
    pub fn apply(self, dimension: u32) -> u32 {
        ((f64::from(dimension) * self.0).round() as u32).max(1)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::ONE
    }
}

/// Fill colour for cells no sub-image lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub Rgba<u8>);

impl Background {
    pub const TRANSPARENT: Background = Background(Rgba([0, 0, 0, 0]));

    /// Parse `#RRGGBB` (opaque) or `#RRGGBBAA`.
    pub fn parse(hex: &str) -> Result<Self, GridError> {
        let invalid = || GridError::InvalidInput(format!("invalid background colour '{hex}'"));
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha])))
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Everything [`compose`](super::compose::compose) needs besides the pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    /// Width of one sub-image in the source strip.
    pub sub_width: u32,
    pub layout: Layout,
    pub scale: Scale,
    pub background: Background,
}
