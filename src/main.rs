//! Entry point for the EPUB segment extractor.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration (default `conf/config.toml`).
//! - Discover archives or book directories and hand them over as an explicit list.
//! - Run extraction and/or consolidation for each input, isolating failures.

mod archive;
mod classify;
mod config;
mod consolidate;
mod markup;
mod order;
mod report;
mod segments;
mod util;

use crate::archive::Extractor;
use crate::config::{AppConfig, load_config, serialize_config};
use crate::consolidate::Consolidator;
use crate::util::has_extension;
use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const USAGE: &str =
    "Usage: epub-segments [run|extract|consolidate|config] [--config <path>] [input...]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Extract each archive, then consolidate its book directory.
    Run,
    Extract,
    /// Consolidate book directories that were extracted earlier.
    Consolidate,
    /// Print the effective configuration as TOML.
    ShowConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    config_path: PathBuf,
    inputs: Vec<PathBuf>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config_path);
    if env::var_os("RUST_LOG").is_none() {
        set_log_level(reload_handle, config.log_level.as_filter_str());
    }
    if args.command == Command::ShowConfig {
        print!("{}", serialize_config(&config)?);
        return Ok(());
    }
    info!(
        command = ?args.command,
        mode = %config.mode,
        char_limit = config.segment_char_limit,
        "Starting EPUB segment extraction"
    );

    let inputs = discover_inputs(args.command, &args.inputs, &config)?;
    if inputs.is_empty() {
        warn!("No inputs found; nothing to do");
        return Ok(());
    }

    let extractor = Extractor::from_config(&config);
    let consolidator = Consolidator::from_config(&config);
    process_inputs(args.command, &inputs, &extractor, &consolidator)?;
    Ok(())
}

/// Run `command` on every input, logging failures and moving on to the next.
///
/// Returns the number of failed inputs; errors only when all of them failed.
fn process_inputs(
    command: Command,
    inputs: &[PathBuf],
    extractor: &Extractor,
    consolidator: &Consolidator,
) -> Result<usize> {
    let mut failures = 0usize;

    for input in inputs {
        let outcome = match command {
            Command::Run => extractor
                .extract(input)
                .and_then(|book| consolidator.run(&book.dir))
                .map(|_| ()),
            Command::Extract => extractor.extract(input).map(|book| {
                info!(
                    dir = %book.dir.display(),
                    fragments = book.fragments,
                    ordered = book.order.len(),
                    "Book ready for consolidation"
                );
            }),
            Command::Consolidate => consolidator.run(input).map(|_| ()),
            Command::ShowConfig => Ok(()),
        };
        if let Err(err) = outcome {
            failures += 1;
            error!(input = %input.display(), "Skipping input: {err:#}");
        }
    }

    info!(
        inputs = inputs.len(),
        failures,
        "Finished processing inputs"
    );
    if !inputs.is_empty() && failures == inputs.len() {
        bail!("all {failures} inputs failed");
    }
    Ok(failures)
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut command = Command::Run;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut inputs = Vec::new();
    let mut args = args.into_iter().peekable();

    if let Some(first) = args.peek() {
        let parsed = match first.as_str() {
            "run" => Some(Command::Run),
            "extract" => Some(Command::Extract),
            "consolidate" => Some(Command::Consolidate),
            "config" => Some(Command::ShowConfig),
            _ => None,
        };
        if let Some(parsed) = parsed {
            command = parsed;
            args.next();
        }
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                config_path = PathBuf::from(path);
            }
            "--help" | "-h" => bail!("{USAGE}"),
            flag if flag.starts_with('-') => bail!("Unknown option {flag}\n{USAGE}"),
            _ => inputs.push(PathBuf::from(&arg)),
        }
    }

    Ok(CliArgs {
        command,
        config_path,
        inputs,
    })
}

/// Expand the command-line inputs (or configured defaults) into concrete work items.
fn discover_inputs(command: Command, explicit: &[PathBuf], cfg: &AppConfig) -> Result<Vec<PathBuf>> {
    let roots = if explicit.is_empty() {
        let fallback = match command {
            Command::Consolidate => &cfg.output_root,
            Command::Run | Command::Extract | Command::ShowConfig => &cfg.input_dir,
        };
        vec![PathBuf::from(fallback)]
    } else {
        explicit.to_vec()
    };

    let mut found = Vec::new();
    for root in roots {
        if root.is_dir() {
            match command {
                Command::Run | Command::Extract | Command::ShowConfig => {
                    found.extend(list_archives(&root)?)
                }
                Command::Consolidate => {
                    if root.join(&cfg.order_file_name).is_file() {
                        found.push(root);
                    } else {
                        found.extend(list_book_dirs(&root)?);
                    }
                }
            }
        } else if root.is_file() && command != Command::Consolidate {
            if !has_extension(&root, &["epub"]) {
                warn!(path = %root.display(), "Input does not look like an EPUB; trying anyway");
            }
            found.push(root);
        } else {
            warn!(path = %root.display(), "Input not found or not usable; skipping");
        }
    }
    Ok(found)
}

fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archives: Vec<PathBuf> = read_dir_paths(dir)?
        .into_iter()
        .filter(|path| path.is_file() && has_extension(path, &["epub"]))
        .collect();
    archives.sort();
    Ok(archives)
}

fn list_book_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut books: Vec<PathBuf> = read_dir_paths(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect();
    books.sort();
    Ok(books)
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(
            entry
                .with_context(|| format!("Failed to list {}", dir.display()))?
                .path(),
        );
    }
    Ok(paths)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
