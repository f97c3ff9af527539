//! Binary entrypoint for colorflow.
//!
//! Resolves each image name, prints one color per line on stdout and
//! reports failures on stderr. All image logic lives in the library crate.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colorflow::config::Configuration;
use colorflow::processing::region::SamplingMode;
use colorflow::{AverageColor, ColorFormat, ErrorKind};
use tracing::{Level, debug, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt};

const EXIT_IO: u8 = 1;
const EXIT_CORRUPT: u8 = 2;
const EXIT_UNSUPPORTED: u8 = 3;
const EXIT_EMPTY: u8 = 4;
const EXIT_CONFIG: u8 = 5;

#[derive(Debug, Parser)]
#[command(name = "colorflow", version, about = "Print the average color of images")]
struct Cli {
    /// Image names; read from stdin, one per line, when none are given
    #[arg(value_name = "IMAGE")]
    images: Vec<String>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory prepended to every image name
    #[arg(short, long, value_name = "DIR")]
    prefix: Option<PathBuf>,

    /// Average only a border frame this many percent thick
    #[arg(short = 'n', long, value_name = "PERCENT")]
    frame_percent: Option<f64>,

    /// Output notation
    #[arg(short = 'F', long, value_enum, value_name = "FORMAT")]
    format: Option<ColorFormat>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// `RUST_LOG` decides the filter when set; `-v` only raises the colorflow
/// target on top of it when given explicitly.
fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let directive: Directive = format!("colorflow={level}").parse()?;
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if verbosity == 0 => filter,
        Ok(filter) => filter.add_directive(directive),
        Err(_) => EnvFilter::default().add_directive(directive),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
    Ok(())
}

const fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Io => EXIT_IO,
        ErrorKind::CorruptData => EXIT_CORRUPT,
        ErrorKind::InvalidFormat | ErrorKind::UnsupportedFeature => EXIT_UNSUPPORTED,
        ErrorKind::EmptyImage => EXIT_EMPTY,
        ErrorKind::InvalidFrame => EXIT_CONFIG,
    }
}

fn load_config(cli: &Cli) -> Result<Configuration> {
    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(prefix) = &cli.prefix {
        cfg.path_prefix = Some(prefix.clone());
    }
    if let Some(percent) = cli.frame_percent {
        cfg.sampling.mode = SamplingMode::Frame;
        cfg.sampling.frame_percent = percent;
    }
    if let Some(format) = cli.format {
        cfg.format = format;
    }
    cfg.validated().context("validating configuration")
}

/// Print the color for `name`; on failure report it and return the exit code.
fn process(cfg: &Configuration, pipeline: &AverageColor, name: &str) -> Option<u8> {
    let path = cfg.resolve(name);
    match pipeline.of_file(&path) {
        Ok(color) => {
            debug!(path = %path.display(), %color, "average color");
            println!("{color}");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), kind = ?err.kind(), "failed to compute average color");
            eprintln!("{name}: {err}");
            Some(exit_code(err.kind()))
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    init_tracing(cli.verbose)?;
    let cfg = load_config(cli)?;
    let pipeline = cfg.average_color()?;
    debug!(?cfg, "configuration");

    let mut last_failure = None;
    if cli.images.is_empty() {
        for (index, line) in io::stdin().lock().split(b'\n').enumerate() {
            let line = line.context("reading image name from stdin")?;
            let Ok(line) = String::from_utf8(line) else {
                warn!(line = index + 1, "skipping image name that is not valid UTF-8");
                eprintln!("stdin line {}: image name is not valid UTF-8", index + 1);
                last_failure = Some(EXIT_IO);
                continue;
            };
            let name = line.trim_end_matches('\r');
            if name.trim().is_empty() {
                continue;
            }
            last_failure = process(&cfg, &pipeline, name).or(last_failure);
        }
    } else {
        for name in &cli.images {
            last_failure = process(&cfg, &pipeline, name).or(last_failure);
        }
    }

    Ok(last_failure.map_or(ExitCode::SUCCESS, ExitCode::from))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_CONFIG)
        }
    }
}
