use clap::{Parser, Subcommand};
use shotkit::config::{self, TransferMode};
use shotkit::grid::{self, GridOptions};
use shotkit::imaging::select_best_layout;
use shotkit::output;
use shotkit::sort::{self, SortOptions};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shotkit")]
#[command(about = "Screenshot utilities: strip-to-grid conversion and dated sorting")]
#[command(long_about = "\
Screenshot utilities: strip-to-grid conversion and dated sorting

grid: a strip of equal-width sub-images becomes a compact grid.

  strip.png (600x100)                  strip_grid.png (300x200)
  ┌──┬──┬──┬──┬──┬──┐                  ┌──┬──┬──┐
  │ 0│ 1│ 2│ 3│ 4│ 5│        →         │ 0│ 1│ 2│
  └──┴──┴──┴──┴──┴──┘                  ├──┼──┼──┤
                                       │ 3│ 4│ 5│
                                       └──┴──┴──┘

  Without --sub-width, sub-images are assumed square (sub-width = height).

sort: screenshots are filed by the date in their name.

  ~/Desktop/Screenshot 2024-03-05 at 10.15.32.png
    → ~/Desktop/Screenshots/2024-03-March/Week10/

Config lookup: --config FILE, else ./shotkit.toml, else the user config
directory (shotkit/config.toml). Run 'shotkit gen-config' for a documented
config file.")]
#[command(version)]
struct Cli {
    /// Config file (overrides the default lookup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct GridArgs {
    /// Strip images to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Width of each sub-image in pixels (default: strip height)
    #[arg(long)]
    sub_width: Option<u32>,

    /// Downscale factor in (0, 1]
    #[arg(long)]
    scale: Option<f64>,

    /// Output file (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the ranked candidate layouts for each strip
    #[arg(long)]
    show_layouts: bool,

    /// Report what would be written without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(clap::Args)]
struct SortArgs {
    /// Directory to scan
    #[arg(short, long)]
    source: Option<String>,

    /// Root of the dated folder tree
    #[arg(short, long)]
    target: Option<String>,

    /// Show what would happen without touching any file
    #[arg(short, long)]
    preview: bool,

    /// Copy instead of move
    #[arg(short, long)]
    copy: bool,

    /// Filename regex with year, month and day capture groups
    #[arg(long)]
    pattern: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Rearrange horizontal strips into grids
    Grid(GridArgs),
    /// File screenshots into month/week folders
    Sort(SortArgs),
    /// Print a stock shotkit.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let failed = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            false
        }
        Command::Grid(args) => {
            let mut cfg = load_config(cli.config.as_deref())?;
            if let Some(sub_width) = args.sub_width {
                cfg.grid.sub_width = Some(sub_width);
            }
            if let Some(scale) = args.scale {
                cfg.grid.scale = scale;
            }
            init_thread_pool(&cfg.processing);
            run_grid(&args, &cfg.grid)?
        }
        Command::Sort(args) => {
            let mut cfg = load_config(cli.config.as_deref())?;
            if let Some(source) = args.source.clone() {
                cfg.sort.source = source;
            }
            if let Some(target) = args.target.clone() {
                cfg.sort.target = target;
            }
            if let Some(pattern) = args.pattern.clone() {
                cfg.sort.pattern = pattern;
            }
            if args.copy {
                cfg.sort.mode = TransferMode::Copy;
            }
            cfg.sort.recursive |= args.recursive;
            run_sort(&args, &cfg.sort)?
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Stock defaults overlaid with the first config file found.
fn load_config(explicit: Option<&Path>) -> Result<config::ToolkitConfig, config::ConfigError> {
    let path = config::find_config_file(explicit)?;
    config::load_config(path.as_deref())
}

/// Returns true when any file failed.
fn run_grid(
    args: &GridArgs,
    grid_config: &config::GridConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let options = GridOptions::from_config(grid_config, args.dry_run)?;
    let requests = grid::plan_requests(&args.inputs, args.output.as_deref(), &options)?;

    // listing only; unreadable strips are reported by the conversion below
    if args.show_layouts {
        for input in &args.inputs {
            if let Ok((count, layouts)) = grid::layouts_for(input, grid_config.sub_width) {
                println!("{}", input.display());
                output::print_layouts(count, &layouts, select_best_layout(count)?);
            }
        }
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_grid_event(&event) {
                println!("{}", line);
            }
        }
    });
    let results = grid::run_batch(&requests, Some(tx));
    printer.join().ok();

    output::print_grid_summary(&requests, &results);
    Ok(results.iter().any(Result::is_err))
}

/// Returns true when any file failed.
fn run_sort(
    args: &SortArgs,
    sort_config: &config::SortConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let options = SortOptions::from_config(sort_config)?;

    if args.json {
        let report = sort::organize(&options, args.preview, None)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.failed_files > 0);
    }

    for line in output::format_sort_header(&options, args.preview) {
        println!("{}", line);
    }
    if args.preview {
        let preview = sort::preview(&options)?;
        output::print_preview(&preview, &options.target);
        return Ok(!preview.invalid.is_empty());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_sort_event(&event) {
                println!("{}", line);
            }
        }
    });
    let report = sort::organize(&options, false, Some(tx));
    printer.join().ok();
    let report = report?;

    output::print_sort_report(&report, &options.target);
    Ok(report.failed_files > 0)
}

/// Diagnostics go to stderr through `log`. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
