use clap::{ArgAction, Parser, Subcommand};
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use texture_sweep::config::{self, ToolConfig};
use texture_sweep::imaging::{OutputTarget, ResizePlan, RustBackend};
use texture_sweep::inventory::FolderInventory;
use texture_sweep::logging::{LogConfig, init_logging};
use texture_sweep::output;
use texture_sweep::reconcile::{FileFilter, StatusFilter};
use texture_sweep::resize::{ResizePlanner, spawn_batch};
use texture_sweep::session::{Session, expand_source_paths};
use texture_sweep::sources::SourceError;
use texture_sweep::types::BatchOutcome;
use tracing::warn;

#[derive(Parser)]
#[command(name = "texture-sweep")]
#[command(about = "Find, delete, move and resize image assets no scene references")]
#[command(long_about = "\
Find, delete, move and resize image assets no scene references

Text sources (scene descriptors, scripts, manifests) are scanned for image
filenames. Every image under --folder whose name appears in a source is
'matched'; everything else is 'unmatched' and a cleanup candidate.

  level1/
  ├── scene.babylon         # \"textures/Hero.PNG\"  → references hero.png
  ├── ui.js                 # load('coin.png')     → references coin.png
  └── assets/               # --folder
      ├── hero.png          # matched
      ├── old/coin.png      # matched (basename only, any depth)
      └── unused_bg.jpg     # unmatched

Matching is by case-insensitive basename. Recognized images:
jpg, jpeg, png, gif, bmp, webp, tiff, tif.

Run 'texture-sweep gen-config' to generate a documented texture-sweep.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./texture-sweep.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// Sources and folder shared by every reconciling command.
#[derive(clap::Args, Clone)]
struct SweepArgs {
    /// Text source file or folder of sources (repeatable)
    #[arg(long = "source", required = true)]
    sources: Vec<PathBuf>,

    /// Image folder to scan recursively
    #[arg(long)]
    folder: PathBuf,
}

/// Resize policy flags; at most one may be given.
#[derive(clap::Args, Clone, Default)]
#[group(multiple = false)]
struct PlanArgs {
    /// Scale both edges by this percentage
    #[arg(long, value_parser = parse_percent)]
    percent: Option<f64>,

    /// Pin the width in pixels, keeping the aspect ratio
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Pin the height in pixels, keeping the aspect ratio
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Exact WIDTHxHEIGHT, ignoring the aspect ratio
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    size: Option<(u32, u32)>,
}

impl PlanArgs {
    /// The plan these flags describe, or `default` when none is given.
    fn to_plan(&self, default: ResizePlan) -> ResizePlan {
        if let Some(p) = self.percent {
            ResizePlan::percent(p)
        } else if let Some(w) = self.width {
            ResizePlan::fixed_width(w)
        } else if let Some(h) = self.height {
            ResizePlan::fixed_height(h)
        } else if let Some((w, h)) = self.size {
            ResizePlan::fixed_dimensions(w, h)
        } else {
            default
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List sources, files and reconciliation statistics
    Report {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Which files to list
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,

        /// Case-insensitive substring filter on file paths
        #[arg(long)]
        search: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List referenced images that do not exist under the folder
    Missing {
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// Permanently delete every unreferenced image
    Clean {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Move every unreferenced image into another folder
    Move {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Destination folder (created if missing)
        #[arg(long)]
        to: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Resize every image under a folder
    Resize {
        /// Image folder to scan recursively
        #[arg(long)]
        folder: PathBuf,

        #[command(flatten)]
        plan: PlanArgs,

        /// Write resized copies here instead of overwriting the originals
        #[arg(long)]
        out: Option<PathBuf>,

        /// Show target dimensions and estimated sizes without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a stock texture-sweep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_config = if cli.quiet {
        LogConfig::quiet()
    } else {
        LogConfig::from_verbosity(cli.verbose)
    };
    init_logging(&log_config)?;

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    init_thread_pool(&config.processing);
    let max_listed = config.report.max_listed_failures;

    match cli.command {
        Command::Report {
            sweep,
            status,
            search,
            json,
        } => {
            let (session, _) = open_session(&sweep, &config)?;
            let union = session.union_references();
            let filter = FileFilter { status, search };
            let files = filter.apply(&union, session.inventory().files());
            if json {
                let missing = session.missing_references();
                println!(
                    "{}",
                    output::format_report_json(
                        session.registry().sources(),
                        &files,
                        &session.stats(),
                        &missing
                    )?
                );
            } else {
                output::print_report(
                    session.registry().sources(),
                    &files,
                    session.inventory().root(),
                    &session.stats(),
                );
            }
        }
        Command::Missing { sweep } => {
            let (session, _) = open_session(&sweep, &config)?;
            output::print_missing(&session.missing_references());
        }
        Command::Clean { sweep, yes } => {
            let (mut session, imported) = open_session(&sweep, &config)?;
            session.ensure_sources_loaded(&imported)?;
            if !confirm_unmatched(&session, "Delete", "Delete these files permanently?", yes)? {
                return Ok(());
            }
            let outcome = session.delete_unmatched();
            output::print_batch_summary("Deleted", &outcome, max_listed, session.inventory().root());
        }
        Command::Move { sweep, to, yes } => {
            let (mut session, imported) = open_session(&sweep, &config)?;
            session.ensure_sources_loaded(&imported)?;
            let prompt = format!("Move these files to {}?", to.display());
            if !confirm_unmatched(&session, "Move", &prompt, yes)? {
                return Ok(());
            }
            std::fs::create_dir_all(&to)?;
            let outcome = session.move_unmatched(&to);
            output::print_batch_summary("Moved", &outcome, max_listed, session.inventory().root());
        }
        Command::Resize {
            folder,
            plan,
            out,
            dry_run,
        } => {
            let mut inventory = FolderInventory::new();
            inventory.scan(&folder)?;
            let planner = ResizePlanner::new(plan.to_plan(config.resize));
            let backend = RustBackend::new();

            if dry_run {
                for file in inventory.files() {
                    match planner.preview(&backend, file) {
                        Ok(preview) => println!(
                            "{}",
                            output::format_resize_preview(&file.path, &preview, Some(&folder))
                        ),
                        Err(e) => warn!(path = %file.path.display(), "cannot preview: {e}"),
                    }
                }
                return Ok(());
            }

            let target = match out {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    OutputTarget::Folder(dir)
                }
                None => OutputTarget::Overwrite,
            };
            let batch = spawn_batch(backend, planner.tasks(inventory.files()), target);
            for event in batch.events() {
                for line in output::format_resize_event(&event, Some(&folder)) {
                    println!("{}", line);
                }
            }
            let summary = batch.join()?;
            output::print_resize_summary(&summary, max_listed, Some(&folder));
        }
        // printed before config loading
        Command::GenConfig => {}
    }

    Ok(())
}

/// Import the sources and scan the folder. The import outcome is returned
/// so destructive commands can refuse on unreadable sources.
fn open_session(
    args: &SweepArgs,
    config: &ToolConfig,
) -> Result<(Session, BatchOutcome<SourceError>), Box<dyn Error>> {
    let paths = expand_source_paths(&args.sources, &config.sources);
    if paths.is_empty() {
        warn!("no source files found; every image will be unmatched");
    }

    let mut session = Session::new();
    let imported = session.import_sources(&paths);
    for (path, err) in &imported.failures {
        warn!(path = %path.display(), "skipping source: {err}");
    }
    session.select_folder(&args.folder)?;
    Ok((session, imported))
}

/// Show the unmatched files and ask before acting on them.
///
/// Returns `false` when there is nothing to do or the operator declines.
fn confirm_unmatched(session: &Session, action: &str, prompt: &str, yes: bool) -> io::Result<bool> {
    let reconciliation = session.reconciliation();
    if reconciliation.unmatched.is_empty() {
        println!("No unreferenced files");
        return Ok(false);
    }
    for line in output::format_pending(action, &reconciliation.unmatched, session.inventory().root()) {
        println!("{}", line);
    }
    if yes {
        return Ok(true);
    }
    let confirmed = prompt_confirm(prompt, Some(false))?;
    if !confirmed {
        println!("Aborted");
    }
    Ok(confirmed)
}

/// Ask a yes/no question on stdin. An empty answer (or EOF) takes `default`.
fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();
    loop {
        input.clear();
        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }
        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => {
                if let Some(default) = default {
                    return Ok(default);
                }
            }
            _ => {}
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err("percent must be greater than 0".into());
    }
    Ok(value)
}

/// Parse `WIDTHxHEIGHT`, e.g. `512x256`.
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("'{s}' is not WIDTHxHEIGHT"))?;
    let parse = |edge: &str| -> Result<u32, String> {
        match edge.trim().parse::<u32>() {
            Ok(0) => Err("dimensions must be non-zero".into()),
            Ok(n) => Ok(n),
            Err(_) => Err(format!("'{edge}' is not a pixel count")),
        }
    };
    Ok((parse(w)?, parse(h)?))
}
