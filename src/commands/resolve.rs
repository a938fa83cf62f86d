//! `resolve` command: print the fetchable URL for each reference.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use bookfetch_core::parser::reference_from_query;
use bookfetch_core::resolver::{FetchTarget, LinkResolver, build_default_link_resolver};
use serde::Serialize;
use tracing::{debug, warn};

use super::MISSING_LINK_HINT;
use crate::ProcessExit;
use crate::cli::ResolveArgs;
use crate::runtime::EffectiveConfig;

/// JSON line emitted with `--json`.
#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    #[serde(flatten)]
    target: &'a FetchTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<&'a str>>,
}

pub fn run_resolve_command(args: &ResolveArgs, config: &EffectiveConfig) -> Result<ProcessExit> {
    let references = collect_references(args)?;
    let resolver = build_default_link_resolver(&config.resolver);
    debug!(?resolver, references = references.len(), "resolving references");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut missing = 0usize;
    for reference in &references {
        match resolver.resolve(reference) {
            Some(target) => write_target(&mut out, &resolver, &target, args)?,
            None => {
                missing += 1;
                warn!("{MISSING_LINK_HINT}");
            }
        }
    }
    if references.is_empty() {
        warn!("{MISSING_LINK_HINT}");
    }
    debug!(resolved = references.len() - missing, missing, "resolve finished");

    Ok(ProcessExit::Success)
}

/// `--from-page` first, then positional references, then stdin lines.
///
/// Shell and page input is trimmed here; the resolver itself takes references
/// verbatim.
fn collect_references(args: &ResolveArgs) -> Result<Vec<String>> {
    let mut references = Vec::new();
    if let Some(page) = &args.from_page {
        references.push(reference_from_query(page, &args.param).trim().to_string());
    }
    references.extend(args.references.iter().map(|r| r.trim().to_string()));

    if references.is_empty() && !io::stdin().is_terminal() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read references from stdin")?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                references.push(trimmed.to_string());
            }
        }
    }
    Ok(references)
}

fn write_target(
    out: &mut impl Write,
    resolver: &LinkResolver,
    target: &FetchTarget,
    args: &ResolveArgs,
) -> Result<()> {
    let candidates = args.explain.then(|| {
        resolver
            .rules_for(&target.reference)
            .into_iter()
            .map(|rule| rule.name())
            .collect::<Vec<_>>()
    });

    if args.json {
        let report = ResolveReport {
            target,
            candidates,
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
        return Ok(());
    }

    writeln!(out, "{}", target.url)?;
    if let Some(candidates) = candidates {
        writeln!(out, "  reference: {}", target.reference)?;
        writeln!(out, "  rule: {} (relayed: {})", target.rule, target.relayed)?;
        writeln!(out, "  candidates: {}", candidates.join(", "))?;
        if let Some(inner) = resolver.relay().unwrap_target(&target.url) {
            writeln!(out, "  relay target: {inner}")?;
        }
    }
    Ok(())
}
