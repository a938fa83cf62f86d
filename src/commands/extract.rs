//! `extract` command: fetch (or read) a book and print the text of its chapters.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use bookfetch_core::book::{ExtractedBook, extract_text_with_limit};
use bookfetch_core::fetch::BookClient;
use bookfetch_core::resolver::build_default_link_resolver;
use tracing::{error, info, warn};

use super::MISSING_LINK_HINT;
use super::fetch::start_spinner;
use crate::ProcessExit;
use crate::cli::ExtractArgs;
use crate::runtime::EffectiveConfig;
use crate::terminal;

pub async fn run_extract_command(
    args: &ExtractArgs,
    config: &EffectiveConfig,
) -> Result<ProcessExit> {
    let bytes = if let Some(path) = &args.file {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read book file '{}'", path.display()))?
    } else {
        let reference = args.reference.as_deref().map(str::trim).unwrap_or_default();
        let Some(target) = build_default_link_resolver(&config.resolver).resolve(reference) else {
            warn!("{MISSING_LINK_HINT}");
            return Ok(ProcessExit::Failure);
        };

        let client = BookClient::with_settings(config.fetch)?;
        let spinner = terminal::should_use_spinner(
            io::stderr().is_terminal(),
            config.is_quiet(),
            terminal::is_dumb_terminal(),
        )
        .then(|| start_spinner(&target.url));
        let fetched = client.fetch(&target).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match fetched {
            Ok(book) => {
                info!(size = %book.size_kib(), "book downloaded");
                book.bytes
            }
            Err(err) => {
                error!(url = %target.url, "{err}");
                return Ok(ProcessExit::Failure);
            }
        }
    };

    match extract_text_with_limit(&bytes, args.max_chapters) {
        Ok(book) => {
            let stdout = io::stdout();
            write_book(&mut stdout.lock(), &book, args.json)?;
            Ok(ProcessExit::Success)
        }
        Err(err) => {
            error!("{err}");
            Ok(ProcessExit::Failure)
        }
    }
}

fn write_book(out: &mut impl Write, book: &ExtractedBook, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, book).context("Failed to serialize extracted text")?;
        writeln!(out)?;
        return Ok(());
    }
    for chapter in &book.chapters {
        writeln!(out, "=== Chapter {} ({}) ===", chapter.index + 1, chapter.id)?;
        writeln!(out, "{}\n", chapter.text)?;
    }
    info!(
        spine_len = book.spine_len,
        chapters = book.chapters.len(),
        failed = book.failures.len(),
        "extraction finished"
    );
    Ok(())
}
