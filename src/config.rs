//! Toolkit configuration module.
//!
//! Handles loading, validating, and merging `shotkit.toml`. Configuration is
//! layered: stock defaults are overridden by the config file, and the config
//! file is overridden by command-line flags (applied in `main`).
//!
//! ## Config File Location
//!
//! The first of these that exists wins:
//!
//! ```text
//! --config <FILE>                    # explicit, must exist
//! ./shotkit.toml                     # project-local
//! <config dir>/shotkit/config.toml   # e.g. ~/.config/shotkit/config.toml
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [grid]
//! scale = 1.0               # Output scale in (0, 1]
//! # sub_width = 256         # Sub-image width (omit = strip height)
//! suffix = "_grid"          # Appended to the input stem for the output name
//! background = "#00000000"  # Empty-cell fill, #RRGGBB or #RRGGBBAA
//!
//! [sort]
//! source = "~/Desktop"
//! target = "~/Desktop/Screenshots"
//! pattern = 'Screenshot (\d{4})-(\d{2})-(\d{2}) at'
//! extensions = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"]
//! recursive = false
//! mode = "move"             # "move" or "copy"
//!
//! [processing]
//! max_processes = 4         # Max parallel grid workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Background, Scale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "shotkit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Toolkit configuration loaded from `shotkit.toml`.
///
/// All fields have defaults; a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolkitConfig {
    /// Strip → grid settings.
    pub grid: GridConfig,
    /// Screenshot sorting settings.
    pub sort: SortConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ToolkitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Scale::new(self.grid.scale)
            .map_err(|_| ConfigError::Validation("grid.scale must be in (0, 1]".into()))?;
        if self.grid.sub_width == Some(0) {
            return Err(ConfigError::Validation(
                "grid.sub_width must be positive".into(),
            ));
        }
        if self.grid.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "grid.suffix must not be empty (the output would replace the input)".into(),
            ));
        }
        Background::parse(&self.grid.background).map_err(|_| {
            ConfigError::Validation(
                "grid.background must be #RRGGBB or #RRGGBBAA".into(),
            )
        })?;
        if self.sort.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "sort.extensions must not be empty".into(),
            ));
        }
        crate::sort::compile_pattern(&self.sort.pattern)
            .map_err(|e| ConfigError::Validation(format!("sort.pattern: {e}")))?;
        Ok(())
    }
}

/// Strip → grid settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Uniform output scale in `(0, 1]`.
    pub scale: f64,
    /// Sub-image width; absent means square sub-images (width = strip height).
    pub sub_width: Option<u32>,
    /// Appended to the input file stem to name the output.
    pub suffix: String,
    /// Fill for empty cells, `#RRGGBB` or `#RRGGBBAA`.
    pub background: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            sub_width: None,
            suffix: "_grid".into(),
            background: "#00000000".into(),
        }
    }
}

/// Whether sorted screenshots leave their source directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Move,
    Copy,
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMode::Move => write!(f, "move"),
            TransferMode::Copy => write!(f, "copy"),
        }
    }
}

/// Screenshot sorting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    /// Directory scanned for screenshots (`~` expands to home).
    pub source: String,
    /// Root of the dated folder tree (`~` expands to home).
    pub target: String,
    /// Filename regex with three capture groups: year, month, day.
    pub pattern: String,
    /// Accepted extensions, case-insensitive, without the dot.
    pub extensions: Vec<String>,
    /// Descend into subdirectories of `source`.
    pub recursive: bool,
    pub mode: TransferMode,
}

/// Matches macOS screenshot names like `Screenshot 2024-03-05 at 10.15.32.png`.
pub const DEFAULT_PATTERN: &str = r"Screenshot (\d{4})-(\d{2})-(\d{2}) at";

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source: "~/Desktop".into(),
            target: "~/Desktop/Screenshots".into(),
            pattern: DEFAULT_PATTERN.into(),
            extensions: ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            recursive: false,
            mode: TransferMode::Move,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel grid workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ToolkitConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolkitConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolkitConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Locate the config file to use, if any.
///
/// An explicit path must exist; otherwise the working directory and then
/// the user config directory are searched.
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(Some(path.to_path_buf()))
        } else {
            Err(ConfigError::NotFound(path.to_path_buf()))
        };
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }
    Ok(dirs::config_dir()
        .map(|dir| dir.join("shotkit").join("config.toml"))
        .filter(|path| path.is_file()))
}

/// Load the effective config: stock defaults, overlaid with `path` if given.
///
/// Rejects unknown keys and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<ToolkitConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            Some(load_raw_config(p)?)
        }
        None => None,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `shotkit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# shotkit Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Looked up in this order: --config <FILE>, ./shotkit.toml,
# <config dir>/shotkit/config.toml. Command-line flags override the file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Strip -> grid
# ---------------------------------------------------------------------------
[grid]
# Uniform output scale, greater than 0 and at most 1.
# Downscaling averages pixel areas, so fine detail is blended, not skipped.
scale = 1.0

# Width of one sub-image in the strip. Omit to assume square sub-images
# (sub-image width = strip height). The strip width must be a multiple.
# sub_width = 256

# Appended to the input file stem: strip.png -> strip_grid.png
suffix = "_grid"

# Fill colour for grid cells without a sub-image, #RRGGBB or #RRGGBBAA.
# JPEG output has no alpha channel; transparent cells come out black there.
background = "#00000000"

# ---------------------------------------------------------------------------
# Screenshot sorting
# ---------------------------------------------------------------------------
[sort]
# Where screenshots are picked up. "~" expands to your home directory.
source = "~/Desktop"

# Root of the dated tree: <target>/2024-03-March/Week10/<file>
target = "~/Desktop/Screenshots"

# Filename regex; its first three capture groups are year, month and day.
pattern = 'Screenshot (\d{4})-(\d{2})-(\d{2}) at'

# Only files with these extensions are sorted (case-insensitive).
extensions = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"]

# Also look inside subdirectories of the source.
recursive = false

# "move" takes files out of the source, "copy" leaves them in place.
mode = "move"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers when several strips are converted at once.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, content: &str) -> PathBuf {
        let path = tmp.path().join(LOCAL_CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn default_config_values() {
        let config = ToolkitConfig::default();
        assert_eq!(config.grid.scale, 1.0);
        assert_eq!(config.grid.sub_width, None);
        assert_eq!(config.grid.suffix, "_grid");
        assert_eq!(config.sort.pattern, DEFAULT_PATTERN);
        assert_eq!(config.sort.mode, TransferMode::Move);
        assert!(!config.sort.recursive);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.grid.scale, 1.0);
        assert_eq!(config.sort.target, "~/Desktop/Screenshots");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[grid]
scale = 0.5
sub_width = 64
"#,
        );

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.grid.scale, 0.5);
        assert_eq!(config.grid.sub_width, Some(64));
        // Unspecified values should be defaults
        assert_eq!(config.grid.suffix, "_grid");
        assert_eq!(config.sort.source, "~/Desktop");
    }

    #[test]
    fn load_config_parses_transfer_mode() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[sort]
mode = "copy"
recursive = true
"#,
        );
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.sort.mode, TransferMode::Copy);
        assert!(config.sort.recursive);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "this is not valid toml [[[");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let result = load_config(Some(Path::new("/nonexistent/shotkit.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn find_config_file_explicit_must_exist() {
        let result = find_config_file(Some(Path::new("/nonexistent/shotkit.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));

        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "");
        assert_eq!(find_config_file(Some(&path)).unwrap(), Some(path));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ToolkitConfig, _> = toml::from_str(
            r#"
[grid]
scael = 0.5
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ToolkitConfig, _> = toml::from_str(
            r#"
[gird]
scale = 0.5
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_mode_rejected() {
        let result: Result<ToolkitConfig, _> = toml::from_str(
            r#"
[sort]
mode = "teleport"
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    fn validation_fails(overlay: &str) -> bool {
        let overlay: toml::Value = toml::from_str(overlay).unwrap();
        matches!(
            resolve_config(stock_defaults_value().unwrap(), Some(overlay)),
            Err(ConfigError::Validation(_))
        )
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(ToolkitConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_scale_range() {
        assert!(validation_fails("[grid]\nscale = 0.0"));
        assert!(validation_fails("[grid]\nscale = 1.5"));
        assert!(!validation_fails("[grid]\nscale = 1.0"));
    }

    #[test]
    fn validate_sub_width_zero() {
        assert!(validation_fails("[grid]\nsub_width = 0"));
    }

    #[test]
    fn validate_empty_suffix() {
        assert!(validation_fails("[grid]\nsuffix = \"\""));
    }

    #[test]
    fn validate_background() {
        assert!(validation_fails("[grid]\nbackground = \"white\""));
        assert!(!validation_fails("[grid]\nbackground = \"#ffffff\""));
    }

    #[test]
    fn validate_pattern_needs_three_groups() {
        assert!(validation_fails("[sort]\npattern = 'Screenshot (\\d{4})'"));
        assert!(validation_fails("[sort]\npattern = '(unclosed'"));
    }

    #[test]
    fn validate_empty_extensions() {
        assert!(validation_fails("[sort]\nextensions = []"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"scale = 1.0"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"scale = 0.5"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("scale").unwrap().as_float(), Some(0.5));
    }

    #[test]
    fn merge_toml_table_merge_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[sort]
source = "~/Desktop"
recursive = false
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[sort]
recursive = true
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let sort = merged.get("sort").unwrap();
        assert_eq!(sort.get("recursive").unwrap().as_bool(), Some(true));
        assert_eq!(sort.get("source").unwrap().as_str(), Some("~/Desktop"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"extensions = ["png", "jpg"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"extensions = ["webp"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("extensions").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Processing tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let huge = ProcessingConfig {
            max_processes: Some(100_000),
        };
        assert_eq!(effective_threads(&huge), cores);
        let zero = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&zero), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ToolkitConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = ToolkitConfig::default();
        assert_eq!(config.grid.scale, defaults.grid.scale);
        assert_eq!(config.grid.suffix, defaults.grid.suffix);
        assert_eq!(config.grid.background, defaults.grid.background);
        assert_eq!(config.sort.pattern, defaults.sort.pattern);
        assert_eq!(config.sort.extensions, defaults.sort.extensions);
        assert_eq!(config.sort.mode, defaults.sort.mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[grid]"));
        assert!(content.contains("[sort]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("grid").is_some());
        assert!(val.get("sort").is_some());
        assert!(val.get("processing").is_some());
    }
}
