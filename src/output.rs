//! CLI output formatting for both tools.
//!
//! # Output Format
//!
//! ## Grid
//!
//! ```text
//! strip.png: 600x100, 6 sub-images of 100px
//! strip.png: layout 2x3
//! strip.png → strip_grid.png (300x200)
//!
//! Converted 1 file
//! ```
//!
//! ## Layouts (`grid --show-layouts`)
//!
//! ```text
//! Layouts for 7 sub-images
//! *   1x7  ratio 7.00  empty 0
//!     2x4  ratio 2.00  empty 1
//!     3x3  ratio 1.00  empty 2
//! ```
//!
//! ## Sort
//!
//! ```text
//! Sorting ~/Desktop → ~/Desktop/Screenshots (move)
//! [1/2] Screenshot 2024-03-05 at 10.15.32.png
//! [2/2] Screenshot 2024-02-30 at 09.00.00.png
//!
//! Processed 1 of 2 files, 1 failed
//!     Screenshot 2024-02-30 at 09.00.00.png: could not parse date from filename
//! Folders
//!     2024-03-March/Week10
//! ```
//!
//! ## Sort preview (`sort --preview`)
//!
//! ```text
//! Previewing ~/Desktop → ~/Desktop/Screenshots (move)
//! Screenshot 2024-03-05 at 10.15.32.png → 2024-03-March/Week10
//!
//! Would process 1 of 2 files, 1 failed
//!     Screenshot 2024-02-30 at 09.00.00.png: could not parse date from filename
//! ```
//!
//! # Architecture
//!
//! Each tool has `format_*` functions (returning `Vec<String>`) for
//! testability and `print_*` wrappers that write to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::grid::{GridEvent, GridOutcome, GridRequest, GridRunError};
use crate::imaging::Layout;
use crate::sort::{Preview, SortEvent, SortOptions, SortReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// File name for display, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `1 file`, `2 files`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Grid output
// ============================================================================

/// Format the ranked layout listing. The chosen layout is marked with `*`.
pub fn format_layouts(count: u32, layouts: &[Layout], chosen: Layout) -> Vec<String> {
    let mut lines = vec![format!("Layouts for {count} sub-images")];
    let width = layouts
        .iter()
        .map(|l| l.to_string().len())
        .max()
        .unwrap_or(0);
    for layout in layouts {
        let marker = if *layout == chosen { "*" } else { " " };
        lines.push(format!(
            "{marker}   {:>width$}  ratio {:.2}  empty {}",
            layout.to_string(),
            layout.aspect_ratio(),
            layout.empty_cells(count),
        ));
    }
    lines
}

/// Print the layout listing to stdout.
pub fn print_layouts(count: u32, layouts: &[Layout], chosen: Layout) {
    for line in format_layouts(count, layouts, chosen) {
        println!("{}", line);
    }
}

/// Format a single grid progress event.
pub fn format_grid_event(event: &GridEvent) -> Vec<String> {
    match event {
        GridEvent::Analyzed {
            input,
            width,
            height,
            sub_width,
            count,
        } => vec![format!(
            "{}: {width}x{height}, {} of {sub_width}px",
            display_name(input),
            plural(*count as usize, "sub-image"),
        )],
        GridEvent::LayoutChosen { input, layout, .. } => {
            vec![format!("{}: layout {layout}", display_name(input))]
        }
        GridEvent::Saved {
            input,
            output,
            width,
            height,
        } => vec![format!(
            "{} \u{2192} {} ({width}x{height})",
            display_name(input),
            output.display()
        )],
    }
}

/// Format the end-of-run grid summary, one line per failure.
///
/// `requests` and `results` are parallel slices in input order.
pub fn format_grid_summary(
    requests: &[GridRequest],
    results: &[Result<GridOutcome, GridRunError>],
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut converted = 0;
    let mut planned = Vec::new();
    let mut failed = Vec::new();

    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(outcome) if outcome.dry_run => planned.push(outcome),
            Ok(_) => converted += 1,
            Err(e) => failed.push((display_name(&request.input), e.to_string())),
        }
    }

    for outcome in &planned {
        lines.push(format!(
            "{} \u{2192} {} ({}x{}, {}) [dry run]",
            display_name(&outcome.input),
            outcome.output.display(),
            outcome.canvas.0,
            outcome.canvas.1,
            outcome.layout,
        ));
    }

    lines.push(String::new());
    let mut summary = if planned.is_empty() {
        format!("Converted {}", plural(converted, "file"))
    } else {
        format!("Planned {}", plural(planned.len(), "file"))
    };
    if !failed.is_empty() {
        summary.push_str(&format!(", {} failed", failed.len()));
    }
    lines.push(summary);
    for (name, error) in failed {
        lines.push(format!("{}{name}: {error}", indent(1)));
    }
    lines
}

/// Print the grid summary to stdout.
pub fn print_grid_summary(
    requests: &[GridRequest],
    results: &[Result<GridOutcome, GridRunError>],
) {
    for line in format_grid_summary(requests, results) {
        println!("{}", line);
    }
}

// ============================================================================
// Sort output
// ============================================================================

/// Format the line announcing what a sort run will do.
pub fn format_sort_header(options: &SortOptions, preview_only: bool) -> Vec<String> {
    let action = if preview_only {
        "Previewing"
    } else {
        "Sorting"
    };
    vec![format!(
        "{action} {} \u{2192} {} ({})",
        options.source.display(),
        options.target.display(),
        options.mode
    )]
}

/// Format a single sort progress event.
pub fn format_sort_event(event: &SortEvent) -> Vec<String> {
    match event {
        SortEvent::Progress {
            current,
            total,
            name,
        } => vec![format!("[{current}/{total}] {name}")],
    }
}

/// Format the sort report: totals, failures, then target folders relative to
/// `target`.
pub fn format_sort_report(report: &SortReport, target: &Path) -> Vec<String> {
    let mut lines = vec![String::new()];

    if report.total_files == 0 {
        lines.push("No screenshots found".to_string());
        return lines;
    }

    let mut summary = format!(
        "Processed {} of {}",
        report.processed_files,
        plural(report.total_files, "file")
    );
    if report.failed_files > 0 {
        summary.push_str(&format!(", {} failed", report.failed_files));
    }
    lines.push(summary);

    for failure in report.failures() {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            display_name(&failure.source),
            failure.error.as_deref().unwrap_or("unknown error")
        ));
    }

    if !report.created_folders.is_empty() {
        lines.push("Folders".to_string());
        for folder in &report.created_folders {
            let shown = folder.strip_prefix(target).unwrap_or(folder);
            lines.push(format!("{}{}", indent(1), shown.display()));
        }
    }
    lines
}

/// Print the sort report to stdout.
pub fn print_sort_report(report: &SortReport, target: &Path) {
    for line in format_sort_report(report, target) {
        println!("{}", line);
    }
}

/// Format a preview: where each file would go, then the files whose date
/// does not parse.
pub fn format_preview(preview: &Preview, target: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (source, dest) in &preview.valid {
        let folder = dest.parent().unwrap_or(dest);
        let shown = folder.strip_prefix(target).unwrap_or(folder);
        lines.push(format!(
            "{} \u{2192} {}",
            display_name(source),
            shown.display()
        ));
    }
    lines.push(String::new());

    let total = preview.valid.len() + preview.invalid.len();
    if total == 0 {
        lines.push("No screenshots found".to_string());
        return lines;
    }

    let mut summary = format!(
        "Would process {} of {}",
        preview.valid.len(),
        plural(total, "file")
    );
    if !preview.invalid.is_empty() {
        summary.push_str(&format!(", {} failed", preview.invalid.len()));
    }
    lines.push(summary);
    for path in &preview.invalid {
        lines.push(format!(
            "{}{}: could not parse date from filename",
            indent(1),
            display_name(path)
        ));
    }
    lines
}

/// Print a preview to stdout.
pub fn print_preview(preview: &Preview, target: &Path) {
    for line in format_preview(preview, target) {
        println!("{}", line);
    }
}
