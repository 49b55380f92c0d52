//! File-level strip → grid pipeline.
//!
//! Wraps the pure [`imaging`](crate::imaging) functions with everything that
//! touches the filesystem:
//!
//! ```text
//! decode → infer sub-width → pick layout → compose → (scale) → encode
//! ```
//!
//! ## Sub-width inference
//!
//! Without an explicit sub-width the strip is assumed to hold square
//! sub-images, so `sub_width = height`. A 600×100 strip becomes six 100×100
//! sub-images, laid out 2×3, written as 300×200.
//!
//! ## Batches
//!
//! Each input file is independent. [`run_batch`] hands them to the rayon
//! pool and returns results in input order; progress events arrive in
//! completion order.

use crate::config::GridConfig;
use crate::imaging::{
    Background, GridError, GridParams, Layout, Scale, compose, compute_layouts, count_sub_images,
    load_image, read_dimensions, save_image, select_best_layout,
};
use crate::naming::{grid_output_path, resolved_path};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridRunError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Output conflict: {0}")]
    OutputConflict(String),
}

/// Resolve the sub-width and sub-image count for a strip.
///
/// `None` means square sub-images: the sub-width is the strip height.
pub fn plan_strip(
    width: u32,
    height: u32,
    sub_width: Option<u32>,
) -> Result<(u32, u32), GridError> {
    let sub_width = sub_width.unwrap_or(height);
    let count = count_sub_images(width, sub_width)?;
    Ok((sub_width, count))
}

/// Options shared by every file of one `grid` invocation.
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub sub_width: Option<u32>,
    pub scale: Scale,
    pub background: Background,
    pub suffix: String,
    pub dry_run: bool,
}

impl GridOptions {
    /// Validate the `[grid]` config section into typed options.
    pub fn from_config(config: &GridConfig, dry_run: bool) -> Result<Self, GridError> {
        Ok(Self {
            sub_width: config.sub_width,
            scale: Scale::new(config.scale)?,
            background: Background::parse(&config.background)?,
            suffix: config.suffix.clone(),
            dry_run,
        })
    }
}

/// One file to convert.
#[derive(Debug, Clone)]
pub struct GridRequest {
    pub input: PathBuf,
    /// Explicit output path; derived from the input name when absent.
    pub output: Option<PathBuf>,
    pub sub_width: Option<u32>,
    pub scale: Scale,
    pub background: Background,
    /// Appended to the input stem when deriving the output name.
    pub suffix: String,
    /// Plan only: decode nothing, write nothing.
    pub dry_run: bool,
}

impl GridRequest {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| grid_output_path(&self.input, &self.suffix))
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Source strip `(width, height)`.
    pub strip: (u32, u32),
    pub sub_width: u32,
    pub count: u32,
    pub layout: Layout,
    /// Written canvas `(width, height)`, after scaling.
    pub canvas: (u32, u32),
    /// True when nothing was written.
    pub dry_run: bool,
}

/// Progress events emitted while converting.
#[derive(Debug, Clone)]
pub enum GridEvent {
    Analyzed {
        input: PathBuf,
        width: u32,
        height: u32,
        sub_width: u32,
        count: u32,
    },
    LayoutChosen {
        input: PathBuf,
        layout: Layout,
        count: u32,
    },
    Saved {
        input: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Turn CLI inputs into requests, rejecting output collisions up front.
///
/// An explicit `output` is only valid for a single input. No request may
/// write over an input or over another request's output. Paths are compared
/// resolved, so `a.png` and `./a.png` are the same file.
pub fn plan_requests(
    inputs: &[PathBuf],
    output: Option<&Path>,
    options: &GridOptions,
) -> Result<Vec<GridRequest>, GridRunError> {
    if inputs.is_empty() {
        return Err(GridError::InvalidInput("no input files".into()).into());
    }
    if output.is_some() && inputs.len() > 1 {
        return Err(GridRunError::OutputConflict(format!(
            "--output takes a single input, got {}",
            inputs.len()
        )));
    }

    let requests: Vec<GridRequest> = inputs
        .iter()
        .map(|input| GridRequest {
            input: input.clone(),
            output: output.map(Path::to_path_buf),
            sub_width: options.sub_width,
            scale: options.scale,
            background: options.background,
            suffix: options.suffix.clone(),
            dry_run: options.dry_run,
        })
        .collect();

    let input_set: HashSet<PathBuf> = inputs
        .iter()
        .map(PathBuf::as_path)
        .map(resolved_path)
        .collect();
    let mut seen = HashSet::new();
    for request in &requests {
        let out = request.output_path();
        let resolved = resolved_path(&out);
        if input_set.contains(&resolved) {
            return Err(GridRunError::OutputConflict(format!(
                "{} would be overwritten",
                out.display()
            )));
        }
        if !seen.insert(resolved) {
            return Err(GridRunError::OutputConflict(format!(
                "{} is the output of more than one input",
                out.display()
            )));
        }
    }
    Ok(requests)
}

fn emit(events: Option<&Sender<GridEvent>>, event: GridEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Layout candidates for a strip file, for `--show-layouts`.
///
/// Reads only the image header.
pub fn layouts_for(input: &Path, sub_width: Option<u32>) -> Result<(u32, Vec<Layout>), GridError> {
    let (width, height) = read_dimensions(input)?;
    let (_, count) = plan_strip(width, height, sub_width)?;
    Ok((count, compute_layouts(count)?))
}

/// Convert one strip file into a grid file.
///
/// Nothing is written unless every step before encoding succeeds.
pub fn run(
    request: &GridRequest,
    events: Option<&Sender<GridEvent>>,
) -> Result<GridOutcome, GridRunError> {
    let output = request.output_path();
    if resolved_path(&output) == resolved_path(&request.input) {
        return Err(GridRunError::OutputConflict(format!(
            "{} would be overwritten",
            request.input.display()
        )));
    }

    let (width, height) = read_dimensions(&request.input)?;
    let (sub_width, count) = plan_strip(width, height, request.sub_width)?;
    emit(
        events,
        GridEvent::Analyzed {
            input: request.input.clone(),
            width,
            height,
            sub_width,
            count,
        },
    );

    let layout = select_best_layout(count)?;
    emit(
        events,
        GridEvent::LayoutChosen {
            input: request.input.clone(),
            layout,
            count,
        },
    );

    let planned = (
        request.scale.apply(layout.cols * sub_width),
        request.scale.apply(layout.rows * height),
    );
    let mut outcome = GridOutcome {
        input: request.input.clone(),
        output,
        strip: (width, height),
        sub_width,
        count,
        layout,
        canvas: planned,
        dry_run: request.dry_run,
    };
    if request.dry_run {
        return Ok(outcome);
    }

    let strip = load_image(&request.input)?;
    let params = GridParams {
        sub_width,
        layout,
        scale: request.scale,
        background: request.background,
    };
    let canvas = compose(&strip, &params)?;
    if let Some(parent) = outcome.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    save_image(&canvas, &outcome.output)?;

    outcome.canvas = canvas.dimensions();
    emit(
        events,
        GridEvent::Saved {
            input: request.input.clone(),
            output: outcome.output.clone(),
            width: outcome.canvas.0,
            height: outcome.canvas.1,
        },
    );
    log::info!(
        "{} -> {} ({}x{})",
        request.input.display(),
        outcome.output.display(),
        outcome.canvas.0,
        outcome.canvas.1
    );
    Ok(outcome)
}

/// Convert many strips in parallel. Results keep the order of `requests`.
pub fn run_batch(
    requests: &[GridRequest],
    events: Option<Sender<GridEvent>>,
) -> Vec<Result<GridOutcome, GridRunError>> {
    requests
        .par_iter()
        .map(|request| run(request, events.as_ref()))
        .collect()
}
