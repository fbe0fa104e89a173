//! bibtex2dict - collect BibTeX references into a JSON reference store.

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use bib_tools::{bibtex2dict, logging::init_logging, CollectError};

/// Convert a BibTeX file or a directory of BibTeX files into a reference store
#[derive(Parser)]
#[command(name = "bibtex2dict")]
#[command(version)]
#[command(after_help = "\
Examples:
  bibtex2dict --bib refs.bib --outfile store/refs.json
  bibtex2dict -b papers/ -o store/refs.json

Running again with the same --outfile merges the new references into the store.
Set RUST_LOG=debug for per-file progress.")]
struct Cli {
    /// BibTeX file, or directory searched recursively for .bib files
    #[arg(short, long)]
    bib: PathBuf,

    /// Reference store to write. If it already exists, it is updated with the
    /// references read from --bib
    #[arg(short, long)]
    outfile: PathBuf,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input path not found / unreadable
    Input(String),
    /// Exit 11: BibTeX syntax error
    Parse(String),
    /// Exit 12: store cannot be written
    Store(String),
    /// Exit 14: output directory cannot be created
    Output(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) => 10,
            AppError::Parse(_) => 11,
            AppError::Store(_) => 12,
            AppError::Output(_) => 14,
        }
    }
}

impl From<CollectError> for AppError {
    fn from(e: CollectError) -> Self {
        match e {
            CollectError::InputNotFound(_)
            | CollectError::ReadError { .. }
            | CollectError::WalkError(_) => AppError::Input(e.to_string()),
            CollectError::ParseError { .. } => AppError::Parse(e.to_string()),
            CollectError::StoreError { .. } => AppError::Store(e.to_string()),
            CollectError::OutputDir { .. } => AppError::Output(e.to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(msg) => {
                write!(f, "{}\n  hint: verify the --bib path is correct", msg)
            }
            AppError::Parse(msg) => {
                write!(
                    f,
                    "{}\n  hint: fix the BibTeX syntax at the reported line; the store was not modified",
                    msg
                )
            }
            AppError::Store(msg) => write!(f, "{}", msg),
            AppError::Output(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the --outfile location is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = bibtex2dict(&cli.bib, &cli.outfile) {
        let e = AppError::from(e);
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}
