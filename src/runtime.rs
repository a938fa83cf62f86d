//! Effective settings: file config merged under CLI flags.

use std::path::PathBuf;

use bookfetch_core::fetch::FetchSettings;
use bookfetch_core::preferences::ReaderPreferences;
use bookfetch_core::resolver::ResolverSettings;

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Cli;

/// Settings every command runs with.
#[derive(Debug, Clone)]
pub(crate) struct EffectiveConfig {
    pub(crate) resolver: ResolverSettings,
    pub(crate) fetch: FetchSettings,
    pub(crate) output_dir: PathBuf,
    pub(crate) preferences: ReaderPreferences,
    pub(crate) verbosity: VerbositySetting,
}

impl EffectiveConfig {
    /// Applies `file_config` over the defaults, then the CLI's global flags.
    pub(crate) fn resolve(cli: &Cli, file_config: Option<&FileConfig>) -> Self {
        let mut resolver = ResolverSettings::default();
        let mut fetch = FetchSettings::default();
        let mut output_dir = PathBuf::from(".");
        let mut preferences = ReaderPreferences::default();
        let mut verbosity = VerbositySetting::Default;

        if let Some(file_config) = file_config {
            if let Some(relay_url) = &file_config.relay_url {
                resolver.relay_endpoint.clone_from(relay_url);
            }
            if let Some(policy) = file_config.github_policy {
                resolver.github_policy = policy;
            }
            if let Some(secs) = file_config.connect_timeout_secs {
                fetch.connect_timeout_secs = secs;
            }
            if let Some(secs) = file_config.read_timeout_secs {
                fetch.read_timeout_secs = secs;
            }
            if let Some(min_bytes) = file_config.min_book_bytes {
                fetch.min_bytes = min_bytes;
            }
            if let Some(dir) = &file_config.output_dir {
                output_dir.clone_from(dir);
            }
            if let Some(level) = file_config.verbosity {
                verbosity = level;
            }
            preferences = apply_reader_preferences(preferences, file_config);
        }

        if let Some(relay) = &cli.relay {
            resolver.relay_endpoint.clone_from(relay);
        }
        if let Some(policy) = cli.github {
            resolver.github_policy = policy;
        }
        if cli.quiet {
            verbosity = VerbositySetting::Quiet;
        } else if cli.verbose == 1 {
            verbosity = VerbositySetting::Verbose;
        } else if cli.verbose > 1 {
            verbosity = VerbositySetting::Debug;
        }

        Self {
            resolver,
            fetch,
            output_dir,
            preferences,
            verbosity,
        }
    }

    pub(crate) fn is_quiet(&self) -> bool {
        self.verbosity == VerbositySetting::Quiet
    }
}

fn apply_reader_preferences(
    mut preferences: ReaderPreferences,
    file_config: &FileConfig,
) -> ReaderPreferences {
    if let Some(theme) = file_config.theme {
        preferences = preferences.with_theme(theme);
    }
    if let Some(font_family) = &file_config.font_family {
        preferences = preferences.with_font_family(font_family.as_str());
    }
    if let Some(percent) = file_config.font_size_percent {
        preferences = preferences.with_font_size_percent(percent);
    }
    if let Some(flow) = file_config.flow {
        preferences = preferences.with_flow(flow);
    }
    if let Some(eye_care) = file_config.eye_care {
        preferences = preferences.with_eye_care(eye_care);
    }
    preferences
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookfetch_core::preferences::Theme;
    use bookfetch_core::resolver::GithubPolicy;
    use clap::Parser;

    #[test]
    fn test_defaults_without_file_config() {
        let cli = Cli::try_parse_from(["bookfetch", "config", "show"]).unwrap();
        let effective = EffectiveConfig::resolve(&cli, None);
        assert_eq!(effective.resolver, ResolverSettings::default());
        assert_eq!(effective.fetch, FetchSettings::default());
        assert_eq!(effective.output_dir, PathBuf::from("."));
        assert_eq!(effective.verbosity, VerbositySetting::Default);
    }

    #[test]
    fn test_file_config_applies_under_cli_flags() {
        let file_config = FileConfig {
            relay_url: Some("https://file-relay.example/?".to_string()),
            github_policy: Some(GithubPolicy::Jsdelivr),
            min_book_bytes: Some(10),
            verbosity: Some(VerbositySetting::Verbose),
            theme: Some(Theme::Dark),
            ..FileConfig::default()
        };
        let cli = Cli::try_parse_from([
            "bookfetch",
            "--relay",
            "https://cli-relay.example/?",
            "-q",
            "config",
            "show",
        ])
        .unwrap();
        let effective = EffectiveConfig::resolve(&cli, Some(&file_config));
        assert_eq!(effective.resolver.relay_endpoint, "https://cli-relay.example/?");
        assert_eq!(effective.resolver.github_policy, GithubPolicy::Jsdelivr);
        assert_eq!(effective.fetch.min_bytes, 10);
        assert_eq!(effective.preferences.theme, Theme::Dark);
        assert!(effective.is_quiet());
    }

    #[test]
    fn test_verbose_count_maps_to_levels() {
        let cli = Cli::try_parse_from(["bookfetch", "-vv", "config", "show"]).unwrap();
        let effective = EffectiveConfig::resolve(&cli, None);
        assert_eq!(effective.verbosity, VerbositySetting::Debug);
        assert_eq!(effective.verbosity.log_level(), "trace");
    }
}
