//! dict2csv - export a JSON reference store to CSV rows.

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use bib_tools::{dict2csv, logging::init_logging, store::StoreError, ExportError};

/// Convert a reference store into CSV rows
#[derive(Parser)]
#[command(name = "dict2csv")]
#[command(version)]
#[command(after_help = "\
Examples:
  dict2csv --dict store/refs.json --outfile refs.csv
  dict2csv -d store/refs.json -o exports/refs.csv

Columns: Title, Year, Tags, Group, URL, Venue, Notes (no header row).
Only Title, Year and URL are filled in.")]
struct Cli {
    /// Reference store written by bibtex2dict
    #[arg(short, long)]
    dict: PathBuf,

    /// CSV file to write. If it already exists, rows are appended to it
    #[arg(short, long)]
    outfile: PathBuf,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: store not found / unreadable
    Input(String),
    /// Exit 12: store content is invalid
    Store(String),
    /// Exit 13: a reference lacks a required field
    MissingField(String),
    /// Exit 14: cannot write output file
    Output(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) => 10,
            AppError::Store(_) => 12,
            AppError::MissingField(_) => 13,
            AppError::Output(_) => 14,
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match &e {
            ExportError::StoreError {
                source: StoreError::IoError(_),
                ..
            } => AppError::Input(e.to_string()),
            ExportError::StoreError { .. } => AppError::Store(e.to_string()),
            ExportError::RowError(_) => AppError::MissingField(e.to_string()),
            ExportError::OutputError { .. } => AppError::Output(e.to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(msg) => {
                write!(f, "{}\n  hint: verify the --dict path is correct", msg)
            }
            AppError::Store(msg) => {
                write!(
                    f,
                    "{}\n  hint: the file must be a reference store written by bibtex2dict",
                    msg
                )
            }
            AppError::MissingField(msg) => {
                write!(
                    f,
                    "{}\n  hint: every exported reference needs a title and a year",
                    msg
                )
            }
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

    if let Err(e) = dict2csv(&cli.dict, &cli.outfile) {
        let e = AppError::from(e);
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}
