//! `fixture` CLI: extract object-initializer fixtures from C# sources as JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Extract the value assigned to `Body` (pretty-printed)
//! fixture extract Tests/FriendControllerTest.cs
//!
//! # Extract by declared type, compact, into a file
//! fixture extract Tests/BattleTest.cs --identifier TestRequest --by-type --compact -o body.json
//!
//! # Report on many files at once
//! fixture batch Tests/*.cs
//!
//! # Inspect how a file is tokenized
//! fixture tokens Tests/BattleTest.cs
//! ```
//!
//! Logging goes to stderr. `-v` raises the level (info, debug, trace) and
//! `RUST_LOG` overrides it entirely.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fixture_core::error::line_column;
use fixture_core::lexer::{tokenize, TokenKind};
use fixture_core::{
    extract_batch, extract_file, BatchEntry, ExtractOptions, Extraction, Layout, Mode,
    DEFAULT_IDENTIFIER,
};
use serde::Serialize;
use serde_json::value::RawValue;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status when nothing in the file matches the identifier.
const EXIT_NO_MATCH: u8 = 2;

#[derive(Parser)]
#[command(
    name = "fixture",
    version,
    about = "Extract C# object-initializer fixtures as JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the fixture from one file
    Extract {
        /// C# source file
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract from several files and print a JSON report
    Batch {
        /// C# source files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the token stream of a file
    Tokens {
        /// C# source file
        file: PathBuf,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Assigned identifier, or declared type name with --by-type
    #[arg(long, default_value = DEFAULT_IDENTIFIER)]
    identifier: String,
    /// Match the first construction of the named type instead of an assignment
    #[arg(long)]
    by_type: bool,
    /// Emit compact JSON
    #[arg(long)]
    compact: bool,
}

impl TargetArgs {
    fn options(&self) -> ExtractOptions {
        let mode = if self.by_type {
            Mode::TypeName
        } else {
            Mode::Assignment
        };
        let layout = if self.compact {
            Layout::Compact
        } else {
            Layout::Indented
        };
        ExtractOptions::new(self.identifier.clone(), mode).with_layout(layout)
    }
}

/// One line of the `batch` report.
#[derive(Serialize)]
struct ReportEntry {
    path: String,
    status: Status,
    body: Option<ReportBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Extracted,
    NoMatch,
    NoInitializer,
    Error,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ReportBody {
    Json(Box<RawValue>),
    Message(String),
}

impl ReportEntry {
    fn from_batch(entry: BatchEntry) -> Result<Self> {
        let path = entry.path.display().to_string();
        let (status, body) = match entry.result {
            Ok(Extraction::Json(text)) => {
                let raw = RawValue::from_string(text)
                    .with_context(|| format!("Extracted JSON for {path} is malformed"))?;
                (Status::Extracted, Some(ReportBody::Json(raw)))
            }
            Ok(Extraction::NoMatch) => (Status::NoMatch, None),
            Ok(Extraction::NoInitializer) => (Status::NoInitializer, None),
            Err(err) => (Status::Error, Some(ReportBody::Message(err.to_string()))),
        };
        Ok(Self { path, status, body })
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            file,
            target,
            output,
        } => {
            let options = target.options();
            let extraction = extract_file(&file, &options)
                .with_context(|| format!("Failed to extract from {}", file.display()))?;
            match extraction {
                Extraction::Json(json) => write_output(output.as_deref(), &json)?,
                Extraction::NoInitializer => {
                    info!(path = %file.display(), "construction has no initializer, nothing written");
                }
                Extraction::NoMatch => {
                    let what = if target.by_type {
                        "construction of type"
                    } else {
                        "assignment to"
                    };
                    eprintln!(
                        "No {what} '{}' found in {}",
                        target.identifier,
                        file.display()
                    );
                    return Ok(ExitCode::from(EXIT_NO_MATCH));
                }
            }
        }
        Commands::Batch { files, target } => {
            // bodies are embedded verbatim; --compact applies to the report
            let options = target.options().with_layout(Layout::Compact);
            let report = extract_batch(&files, &options)
                .into_iter()
                .map(ReportEntry::from_batch)
                .collect::<Result<Vec<_>>>()?;
            let failed = report.iter().filter(|e| e.status == Status::Error).count();
            debug!(files = report.len(), failed, "batch finished");

            let rendered = if target.compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{rendered}");
            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Tokens { file } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let tokens = tokenize(&source)
                .with_context(|| format!("Failed to tokenize {}", file.display()))?;
            for token in &tokens {
                let (line, column) = line_column(&source, token.span.start);
                println!("{line}:{column}\t{}", describe(&token.kind));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(word) => format!("ident\t{word}"),
        TokenKind::Number(text) => format!("number\t{text}"),
        TokenKind::Str(value) => format!("string\t{value:?}"),
        TokenKind::Char(text) => format!("char\t{text}"),
        TokenKind::Interpolated(text) => format!("interpolated\t{text}"),
        TokenKind::Punct(p) => format!("punct\t{p}"),
        TokenKind::Unknown(c) => format!("unknown\t{c:?}"),
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{content}");
        }
    }
    Ok(())
}
