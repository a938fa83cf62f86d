//! `fetch` command: resolve, download, validate, save.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use bookfetch_core::fetch::{BookClient, FetchSettings};
use bookfetch_core::resolver::build_default_link_resolver;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use super::MISSING_LINK_HINT;
use crate::ProcessExit;
use crate::cli::FetchArgs;
use crate::runtime::EffectiveConfig;
use crate::terminal;

pub async fn run_fetch_command(args: &FetchArgs, config: &EffectiveConfig) -> Result<ProcessExit> {
    let resolver = build_default_link_resolver(&config.resolver);
    let Some(target) = resolver.resolve(args.reference.trim()) else {
        warn!("{MISSING_LINK_HINT}");
        return Ok(ProcessExit::Failure);
    };

    let settings = FetchSettings {
        min_bytes: args.min_bytes.unwrap_or(config.fetch.min_bytes),
        ..config.fetch
    };
    let client = BookClient::with_settings(settings)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());

    let spinner = terminal::should_use_spinner(
        std::io::stderr().is_terminal(),
        config.is_quiet(),
        terminal::is_dumb_terminal(),
    )
    .then(|| start_spinner(&target.url));

    let outcome = client
        .fetch_to_file(&target, &output_dir, args.name.as_deref())
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        Ok(saved) => {
            info!(
                rule = %target.rule,
                relayed = target.relayed,
                bytes = saved.bytes,
                "fetch complete"
            );
            println!("{}", saved.path.display());
            Ok(ProcessExit::Success)
        }
        Err(err) => {
            error!(url = %target.url, "{err}");
            Ok(ProcessExit::Failure)
        }
    }
}

pub(super) fn start_spinner(url: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching {url}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
