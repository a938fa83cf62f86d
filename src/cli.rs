//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bookfetch_core::book::MAX_EXTRACTED_CHAPTERS;
use bookfetch_core::parser::{DEFAULT_REFERENCE_PARAM, validate_relay_endpoint};
use bookfetch_core::resolver::GithubPolicy;

/// Resolve and fetch shared e-book links.
///
/// Turns GitHub blob pages, Google Drive share links, base64-wrapped tokens
/// and plain URLs into URLs a reader can fetch, routing hosts without
/// cross-origin access through a CORS relay.
#[derive(Parser, Debug)]
#[command(name = "bookfetch")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// CORS relay prefix (the encoded target is appended verbatim)
    #[arg(long, value_name = "URL", global = true, value_parser = validate_relay_endpoint)]
    pub relay: Option<String>,

    /// How GitHub blob links are rewritten: raw, raw-relayed or jsdelivr
    #[arg(long, value_name = "POLICY", global = true)]
    pub github: Option<GithubPolicy>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the fetchable URL for each reference
    Resolve(ResolveArgs),
    /// Resolve a reference, download it and save it as an EPUB
    Fetch(FetchArgs),
    /// Print the text of a book's first chapters
    Extract(ExtractArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

/// Arguments for `resolve`.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Links or base64 tokens (read from stdin, one per line, when omitted)
    #[arg(value_name = "REFERENCE")]
    pub references: Vec<String>,

    /// Reader page URL to take the reference from (e.g. `https://reader/?url=...`)
    #[arg(long, value_name = "URL")]
    pub from_page: Option<String>,

    /// Query parameter holding the reference in --from-page
    #[arg(long, value_name = "NAME", default_value = DEFAULT_REFERENCE_PARAM)]
    pub param: String,

    /// Emit one JSON object per reference
    #[arg(long)]
    pub json: bool,

    /// Show the decoded reference and candidate rules
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for `fetch`.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Link or base64 token to fetch
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Directory to save the book in (default: config output_dir, then ".")
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Filename to save as (default: derived from the link, then book.epub)
    #[arg(long, value_name = "FILE")]
    pub name: Option<String>,

    /// Reject bodies smaller than this many bytes
    #[arg(long, value_name = "N")]
    pub min_bytes: Option<u64>,
}

/// Arguments for `extract`.
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Link or base64 token to fetch and read
    #[arg(value_name = "REFERENCE", required_unless_present = "file")]
    pub reference: Option<String>,

    /// Read a local .epub instead of fetching
    #[arg(long, value_name = "PATH", conflicts_with = "reference")]
    pub file: Option<PathBuf>,

    /// Spine items to read at most
    #[arg(long, value_name = "N", default_value_t = MAX_EXTRACTED_CHAPTERS)]
    pub max_chapters: usize,

    /// Emit the chapters as one JSON object
    #[arg(long)]
    pub json: bool,
}
