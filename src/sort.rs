//! Screenshot sorting into dated folders.
//!
//! Files in the source directory whose names match a date pattern are moved
//! (or copied) into a `month/week` tree under the target directory:
//!
//! ```text
//! ~/Desktop/
//! ├── Screenshot 2024-03-05 at 10.15.32.png
//! └── Screenshot 2024-03-18 at 09.01.11.png
//!
//! ~/Desktop/Screenshots/
//! └── 2024-03-March/
//!     ├── Week10/
//!     │   └── Screenshot 2024-03-05 at 10.15.32.png
//!     └── Week12/
//!         └── Screenshot 2024-03-18 at 09.01.11.png
//! ```
//!
//! Weeks are ISO-8601 (Monday-first), so early-January screenshots can land in
//! week 52/53 of the previous ISO year. Names that match the pattern but not a
//! real date (`2024-02-30`) are reported as failures, never guessed.
//!
//! Per-file problems never abort the run: each file gets a [`FileOutcome`] and
//! the [`SortReport`] carries the totals.

use crate::config::{SortConfig, TransferMode};
use crate::naming::{expand_home, month_folder, week_folder};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Invalid filename pattern: {0}")]
    Pattern(String),
}

/// Compile a filename pattern, requiring year/month/day capture groups.
pub fn compile_pattern(pattern: &str) -> Result<Regex, SortError> {
    let regex = Regex::new(pattern).map_err(|e| SortError::Pattern(e.to_string()))?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 4 {
        return Err(SortError::Pattern(format!(
            "'{pattern}' needs three capture groups (year, month, day)"
        )));
    }
    Ok(regex)
}

/// Resolved sorting options: paths expanded, pattern compiled.
#[derive(Debug, Clone)]
pub struct SortOptions {
    pub source: PathBuf,
    pub target: PathBuf,
    pub pattern: Regex,
    pub mode: TransferMode,
    pub recursive: bool,
    /// Lowercase, without the dot.
    pub extensions: Vec<String>,
}

impl SortOptions {
    pub fn from_config(config: &SortConfig) -> Result<Self, SortError> {
        Ok(Self {
            source: expand_home(&config.source),
            target: expand_home(&config.target),
            pattern: compile_pattern(&config.pattern)?,
            mode: config.mode,
            recursive: config.recursive,
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        })
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }

    fn matches_name(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Capture date encoded in a filename, if it matches and is a real date.
pub fn capture_date(pattern: &Regex, filename: &str) -> Option<NaiveDate> {
    let caps = pattern.captures(filename)?;
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(3)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Destination for a screenshot: `target/YYYY-MM-MonthName/WeekNN/filename`.
pub fn target_path(options: &SortOptions, filename: &str) -> Option<PathBuf> {
    let date = capture_date(&options.pattern, filename)?;
    Some(
        options
            .target
            .join(month_folder(date))
            .join(week_folder(date))
            .join(filename),
    )
}

/// Find all screenshot files in the source directory, sorted by path.
///
/// Anything already under the target directory is skipped so a recursive
/// scan of a source that contains the target never re-sorts its own output.
pub fn find_screenshots(options: &SortOptions) -> Result<Vec<PathBuf>, SortError> {
    if !options.source.is_dir() {
        return Err(SortError::SourceNotFound(options.source.clone()));
    }

    let mut walker = WalkDir::new(&options.source).min_depth(1).sort_by_file_name();
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.path() != options.target.as_path())
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if options.matches_name(&name) && options.accepts_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    log::debug!(
        "found {} screenshots in {}",
        files.len(),
        options.source.display()
    );
    Ok(files)
}

/// Dry-run partition of found files.
#[derive(Debug, Default)]
pub struct Preview {
    /// `(source, target)` for files with a parseable date.
    pub valid: Vec<(PathBuf, PathBuf)>,
    /// Files matching the pattern whose date is not a real calendar date.
    pub invalid: Vec<PathBuf>,
}

/// Work out where every screenshot would go, touching nothing.
pub fn preview(options: &SortOptions) -> Result<Preview, SortError> {
    let mut result = Preview::default();
    for path in find_screenshots(options)? {
        match file_name(&path).and_then(|name| target_path(options, &name)) {
            Some(target) => result.valid.push((path, target)),
            None => result.invalid.push(path),
        }
    }
    Ok(result)
}

/// Outcome for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one sorting run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SortReport {
    pub total_files: usize,
    pub processed_files: usize,
    pub failed_files: usize,
    /// Destination folders used (or that would be used, in preview).
    pub created_folders: BTreeSet<PathBuf>,
    pub results: Vec<FileOutcome>,
}

impl SortReport {
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Progress events emitted while sorting.
#[derive(Debug, Clone)]
pub enum SortEvent {
    Progress {
        current: usize,
        total: usize,
        name: String,
    },
}

/// Sort every screenshot found in the source directory.
///
/// With `preview_only`, nothing on disk changes; the report shows what would
/// happen. Each file is independent: a failure is recorded and the run goes
/// on.
pub fn organize(
    options: &SortOptions,
    preview_only: bool,
    events: Option<Sender<SortEvent>>,
) -> Result<SortReport, SortError> {
    let files = find_screenshots(options)?;
    let total = files.len();
    let mut report = SortReport {
        total_files: total,
        ..SortReport::default()
    };

    for (i, source) in files.into_iter().enumerate() {
        let name = file_name(&source).unwrap_or_default();
        if let Some(tx) = &events {
            tx.send(SortEvent::Progress {
                current: i + 1,
                total,
                name: name.clone(),
            })
            .ok();
        }

        let Some(target) = target_path(options, &name) else {
            report.failed_files += 1;
            report.results.push(FileOutcome {
                source,
                target: None,
                success: false,
                error: Some("could not parse date from filename".into()),
            });
            continue;
        };

        let outcome = if preview_only {
            Ok(())
        } else {
            transfer(&source, &target, options.mode)
        };

        match outcome {
            Ok(()) => {
                if let Some(folder) = target.parent() {
                    report.created_folders.insert(folder.to_path_buf());
                }
                report.processed_files += 1;
                report.results.push(FileOutcome {
                    source,
                    target: Some(target),
                    success: true,
                    error: None,
                });
            }
            Err(e) => {
                log::warn!("{}: {e}", source.display());
                report.failed_files += 1;
                report.results.push(FileOutcome {
                    source,
                    target: Some(target),
                    success: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(report)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Move or copy one file into place, creating its folder.
///
/// Refuses to overwrite an existing target.
fn transfer(source: &Path, target: &Path, mode: TransferMode) -> std::io::Result<()> {
    if target.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("target already exists: {}", target.display()),
        ));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    match mode {
        TransferMode::Copy => copy_preserving_mtime(source, target),
        TransferMode::Move => match fs::rename(source, target) {
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
                log::debug!("{} crosses devices, copying instead", source.display());
                copy_preserving_mtime(source, target)?;
                fs::remove_file(source)
            }
            other => other,
        },
    }
}

fn copy_preserving_mtime(source: &Path, target: &Path) -> std::io::Result<()> {
    fs::copy(source, target)?;
    let modified = fs::metadata(source)?.modified()?;
    fs::File::options()
        .write(true)
        .open(target)?
        .set_modified(modified)
}
