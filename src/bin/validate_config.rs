//! Validate traffic configuration files (JSON or YAML).
//!
//! Usage:
//!   validate_config [OPTIONS] FILE...
//!
//! Each file is decoded, every choice is resolved (applying schema defaults) and the result is
//! validated. Errors and warnings are printed one per line; the exit code is 1 if any file
//! fails to decode or has at least one error.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use trafficmodel::codec::{self, Decoded};
use trafficmodel::dump;
use trafficmodel::validate::Severity;
use trafficmodel::{Ambiguity, Config, ValidationOptions};

#[derive(Parser, Debug)]
#[command(name = "validate_config", about = "Validate traffic generator configuration files")]
struct Args {
    /// Configuration files (.json, .yaml, .yml)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Human-readable output
    #[arg(short = 'H', long)]
    human: bool,

    /// TOML file with validation options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Keep the first populated variant of an ambiguous choice without reporting it
    #[arg(long)]
    first_wins: bool,

    /// Report warnings as errors
    #[arg(long)]
    strict_warnings: bool,

    /// Print the resolved configuration as YAML
    #[arg(long)]
    print: bool,

    /// Dump flows, previewing the first N values of each counter
    #[arg(long, value_name = "N")]
    dump: Option<usize>,
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

fn print_report(path: &Path, decoded: &Decoded<Config>, style: OutputStyle) {
    for (severity, message) in decoded.report.messages() {
        let severity_str = match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match style {
            OutputStyle::Compact => println!("{}: {}: {}", path.display(), severity_str, message),
            OutputStyle::Human => println!("  {} {}", severity_str, message),
        }
    }
}

fn options(args: &Args) -> anyhow::Result<ValidationOptions> {
    let mut options = match &args.options {
        Some(path) => ValidationOptions::load(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => ValidationOptions::default(),
    };
    if args.first_wins {
        options.ambiguity = Ambiguity::FirstWins;
    }
    if args.strict_warnings {
        options.warnings_as_errors = true;
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let options = options(&args)?;
    let style = if args.human {
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };

    let mut has_error = false;
    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;

    for path in &args.files {
        let decoded = match codec::load::<Config>(path, options.clone()) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                has_error = true;
                continue;
            }
        };
        log::info!("{}: {} flow(s)", path.display(), decoded.message.flows.len());
        if let OutputStyle::Human = style {
            println!("{}:", path.display());
        }
        print_report(path, &decoded, style);
        total_errors += decoded.report.errors.len();
        total_warnings += decoded.report.warnings.len();
        if !decoded.is_ok() {
            has_error = true;
        }
        if args.print {
            print!("{}", codec::to_yaml(&decoded.message)?);
        }
        if let Some(preview) = args.dump {
            print!("{}", dump::dump_config(&decoded.message, preview));
        }
    }

    if total_errors > 0 || total_warnings > 0 {
        eprintln!(
            "validate: {} error(s), {} warning(s)",
            total_errors, total_warnings
        );
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
