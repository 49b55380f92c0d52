//! Centralized path and folder naming.
//!
//! Both tools derive new paths from existing ones, and every derived name is
//! built here so the conventions stay in one place:
//!
//! - `strip.png` → `strip_grid.png` (grid output next to its input)
//! - `2024-03-05` → `2024-03-March/Week10/` (screenshot destination folders)
//! - `~/Desktop` → `/home/me/Desktop` (home expansion for config paths)
//!
//! [`resolved_path`] is the identity used when two spellings of a path must
//! compare equal (`strip.png` vs `./strip.png`).

use chrono::{Datelike, Month, NaiveDate};
use std::path::{Path, PathBuf};

/// Extension used when the input has none.
const FALLBACK_EXTENSION: &str = "png";

/// Default grid output path: same directory, `{stem}{suffix}.{ext}`.
///
/// - `"shots/strip.png"`, `"_grid"` → `"shots/strip_grid.png"`
/// - `"strip.JPG"`, `"_grid"` → `"strip_grid.JPG"` (extension case kept)
/// - `"strip"`, `"_grid"` → `"strip_grid.png"`
pub fn grid_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// Month folder name: `YYYY-MM-MonthName`.
pub fn month_folder(date: NaiveDate) -> String {
    let name = u8::try_from(date.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown");
    format!("{}-{:02}-{}", date.year(), date.month(), name)
}

/// Week folder name from the ISO-8601 week number: `WeekNN`.
pub fn week_folder(date: NaiveDate) -> String {
    format!("Week{:02}", date.iso_week().week())
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without `~`, and `~user` forms, are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Resolve `path` for identity comparisons.
///
/// Existing paths are canonicalized. A file that does not exist yet resolves
/// through its parent directory, so `./out.png` and `out.png` still match.
pub fn resolved_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}
