//! # Shotkit
//!
//! Two small screenshot utilities behind one binary:
//!
//! - **grid**: a horizontal strip of equal-width sub-images (a burst of
//!   screenshots pasted side by side) is rearranged into the most compact
//!   near-square grid and written as a new image.
//! - **sort**: screenshots on the desktop are filed into
//!   `YYYY-MM-MonthName/WeekNN/` folders using the date in their file name.
//!
//! ```text
//! grid   strip.png (n × W, H)  →  strip_grid.png (cols·W × rows·H)
//! sort   ~/Desktop/*.png       →  ~/Desktop/Screenshots/2024-03-March/Week10/
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure layout selection and in-memory composition, plus the decode/encode boundary |
//! | [`grid`] | File-level pipeline: sub-width inference, output naming, parallel batches |
//! | [`sort`] | Pattern matching, ISO-week target paths, move/copy with per-file outcomes |
//! | [`config`] | `shotkit.toml` loading, stock defaults, merging, validation |
//! | [`naming`] | Derived names: grid output paths, month/week folders, `~` expansion |
//! | [`output`] | CLI output formatting for both tools |
//!
//! # Design Decisions
//!
//! ## Fewest Empty Cells First
//!
//! Layouts are ranked by cell capacity before squareness. Seven sub-images
//! become `1x7` (no gaps) rather than `3x3` (two gaps); six become `2x3`.
//! See [`imaging::compute_layouts`].
//!
//! ## Fail Instead of Truncate
//!
//! A strip whose width is not a multiple of the sub-width is rejected with
//! [`imaging::GridError::DimensionMismatch`] and nothing is written. Dropping a
//! partial sub-image silently loses content.
//!
//! ## Never Overwrite
//!
//! The grid tool refuses outputs that collide with an input or with each
//! other; the sorter refuses to replace a file already at its target. Both
//! report the conflict as a per-file failure.
//!
//! ## Pure Core, Thin Shell
//!
//! [`imaging`] never touches the filesystem except in its codec functions,
//! and [`output`] only formats strings. Everything that can be tested without
//! images or directories is.

pub mod config;
pub mod grid;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod sort;

#[cfg(test)]
pub(crate) mod test_helpers;
