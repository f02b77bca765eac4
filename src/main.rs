use std::path::PathBuf;

use clap::Parser;

use codetable::config::parse_delimiter;
use codetable::io_utils::CliError;
use codetable::report::write_skipped_report;
use codetable::{Compiler, Config, DuplicatePolicy, Sink};

/// Compile a delimited code/name table into a Rust `match` fragment.
#[derive(Parser, Debug)]
#[command(name = "codetable", version)]
struct Args {
    /// Input table, one `<code><delimiter><name>` entry per line
    input: PathBuf,

    /// Destination of the generated fragment
    output: Option<PathBuf>,

    /// JSON file providing defaults for the options below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field separator (single character, `\t`, `tab` or `space`) [default: tab]
    #[arg(short, long, value_parser = parse_delimiter)]
    delimiter: Option<char>,

    /// Text returned for codes not in the table [default: "Unknown company code"]
    #[arg(long)]
    fallback: Option<String>,

    /// How to handle a code listed more than once [default: reject]
    #[arg(long, value_enum)]
    duplicates: Option<DuplicatePolicy>,

    /// Spaces per indentation level [default: 4]
    #[arg(long)]
    indent: Option<usize>,

    /// Variable name the generated match inspects [default: code]
    #[arg(long)]
    scrutinee: Option<String>,

    /// Exit non-zero if OUTPUT differs from what would be generated; write nothing
    #[arg(long, conflicts_with = "stdout")]
    check: bool,

    /// Print the fragment to stdout instead of writing OUTPUT
    #[arg(long)]
    stdout: bool,

    /// Print the run summary as JSON
    #[arg(long, conflicts_with = "stdout")]
    json: bool,

    /// Write skipped lines as CSV (line,reason,content)
    #[arg(long, value_name = "PATH")]
    skipped_report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Overlay command-line flags on top of the config file.
    fn to_config(&self) -> Result<Config, CliError> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        cfg.input_path = Some(self.input.clone());
        if let Some(out) = &self.output {
            cfg.output_path = Some(out.clone());
        }
        if let Some(d) = self.delimiter {
            cfg.delimiter = d;
        }
        if let Some(f) = &self.fallback {
            cfg.fallback_text = f.clone();
        }
        if let Some(p) = self.duplicates {
            cfg.duplicate_policy = p;
        }
        if let Some(i) = self.indent {
            cfg.indent = i;
        }
        if let Some(s) = &self.scrutinee {
            cfg.scrutinee = s.clone();
        }
        Ok(cfg)
    }
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    if let Err(e) = run(args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let cfg = args.to_config()?;
    let sink = if args.stdout {
        Sink::Memory
    } else {
        let out = cfg
            .output_path
            .clone()
            .ok_or_else(|| CliError::msg("No output path given. Pass OUTPUT or --stdout."))?;
        if args.check {
            Sink::Check(out)
        } else {
            Sink::File(out)
        }
    };

    let compiled = Compiler::new(cfg).run(&sink)?;
    let summary = &compiled.summary;

    for d in &summary.diagnostics {
        log::warn!("line {}: skipped ({})", d.line, d.reason);
    }
    if let Some(path) = &args.skipped_report {
        write_skipped_report(path, &summary.diagnostics).map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(err) => CliError::io("writing", path, err),
            other => CliError::msg(format!("Failed writing '{}': {other:?}", path.display())),
        })?;
    }

    if args.stdout {
        print!("{}", compiled.artifact);
    }
    if args.json {
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| CliError::msg(format!("Failed encoding summary: {e}")))?;
        println!("{json}");
    } else {
        log::info!("{}", summary.describe());
    }

    if summary.up_to_date == Some(false) {
        if let Sink::Check(path) = &sink {
            return Err(CliError::msg(format!(
                "'{}' is out of date. Re-run without --check to regenerate it.",
                path.display()
            )));
        }
    }
    Ok(())
}
