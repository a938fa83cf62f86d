//! Application configuration loading for CLI defaults.
//!
//! The file is a flat `key = value` subset of TOML: double-quoted strings,
//! unquoted integers and booleans, `#` comments. Unknown keys are errors.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use bookfetch_core::fetch::DEFAULT_MAX_BOOK_BYTES;
use bookfetch_core::parser::validate_relay_endpoint;
use bookfetch_core::preferences::{Flow, MAX_FONT_SIZE_PERCENT, MIN_FONT_SIZE_PERCENT, Theme};
use bookfetch_core::resolver::GithubPolicy;

/// File configuration for bookfetch defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// CORS relay prefix the encoded target is appended to.
    pub relay_url: Option<String>,
    /// How GitHub blob links are rewritten.
    pub github_policy: Option<GithubPolicy>,
    /// Fetch client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Fetch client read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Minimum accepted book size in bytes.
    pub min_book_bytes: Option<u64>,
    /// Default directory for `fetch`.
    pub output_dir: Option<PathBuf>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Reader color scheme.
    pub theme: Option<Theme>,
    /// Reader font family.
    pub font_family: Option<String>,
    /// Reader font scale (50..=300).
    pub font_size_percent: Option<u16>,
    /// Reader content flow.
    pub flow: Option<Flow>,
    /// Reader warm overlay.
    pub eye_care: Option<bool>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(relay_url) = &self.relay_url {
            validate_relay_endpoint(relay_url)
                .context("Invalid config value for `relay_url`")?;
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;

        if let Some(min_book_bytes) = self.min_book_bytes
            && min_book_bytes > DEFAULT_MAX_BOOK_BYTES
        {
            bail!(
                "Invalid config value for `min_book_bytes`: {min_book_bytes}. Expected range: 0..={DEFAULT_MAX_BOOK_BYTES}"
            );
        }

        if let Some(percent) = self.font_size_percent
            && !(MIN_FONT_SIZE_PERCENT..=MAX_FONT_SIZE_PERCENT).contains(&percent)
        {
            bail!(
                "Invalid config value for `font_size_percent`: {percent}. Expected range: {MIN_FONT_SIZE_PERCENT}..={MAX_FONT_SIZE_PERCENT}"
            );
        }

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Log level used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

impl std::str::FromStr for VerbositySetting {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        [Self::Default, Self::Verbose, Self::Quiet, Self::Debug]
            .into_iter()
            .find(|setting| setting.as_str() == value)
            .with_context(|| format!("`{value}` is not one of: default, verbose, quiet, debug"))
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bookfetch/config.toml`
/// 2. `$HOME/.config/bookfetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("bookfetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("bookfetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_no, raw_line) in (1..).zip(raw.lines()) {
        let line = without_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=').map(|(k, v)| (k.trim(), v.trim())) else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let invalid = || format!("Invalid `{key}` value on line {line_no}");
        let text = || Literal::parse(value).and_then(Literal::into_text).with_context(invalid);
        let number = || Literal::parse(value).and_then(Literal::into_number).with_context(invalid);
        let flag = || Literal::parse(value).and_then(Literal::into_flag).with_context(invalid);

        match key {
            "relay_url" => cfg.relay_url = Some(text()?),
            "github_policy" => {
                cfg.github_policy = Some(text()?.parse::<GithubPolicy>().with_context(invalid)?);
            }
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(number()?),
            "read_timeout_secs" => cfg.read_timeout_secs = Some(number()?),
            "min_book_bytes" => cfg.min_book_bytes = Some(number()?),
            "output_dir" => cfg.output_dir = Some(PathBuf::from(text()?)),
            "verbosity" => {
                cfg.verbosity = Some(text()?.parse::<VerbositySetting>().with_context(invalid)?);
            }
            "theme" => cfg.theme = Some(text()?.parse::<Theme>().with_context(invalid)?),
            "font_family" => cfg.font_family = Some(text()?),
            "font_size_percent" => {
                let percent = number()?;
                cfg.font_size_percent = Some(
                    u16::try_from(percent)
                        .map_err(|_| anyhow!("{percent} is not a usable font scale"))
                        .with_context(invalid)?,
                );
            }
            "flow" => cfg.flow = Some(text()?.parse::<Flow>().with_context(invalid)?),
            "eye_care" => cfg.eye_care = Some(flag()?),
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Cuts a `#` comment, ignoring `#` inside a quoted string.
fn without_comment(line: &str) -> &str {
    let mut quoted = false;
    let cut = line
        .char_indices()
        .find(|&(_, ch)| {
            if ch == '"' {
                quoted = !quoted;
            }
            ch == '#' && !quoted
        })
        .map_or(line.len(), |(index, _)| index);
    &line[..cut]
}

/// Right-hand side of a config line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Literal {
    Text(String),
    Number(u64),
    Flag(bool),
}

impl Literal {
    fn parse(token: &str) -> Result<Self> {
        if let Some(rest) = token.strip_prefix('"') {
            let Some(text) = rest.strip_suffix('"') else {
                bail!("unterminated string {token}");
            };
            if text.contains('"') {
                bail!("unexpected quote inside {token}");
            }
            return Ok(Self::Text(text.to_string()));
        }
        match token {
            "true" => Ok(Self::Flag(true)),
            "false" => Ok(Self::Flag(false)),
            _ if token.starts_with('-') => bail!("{token} is negative"),
            _ => token.parse::<u64>().map(Self::Number).map_err(|_| {
                anyhow!("expected a quoted string, a whole number or true/false, found `{token}`")
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "a string",
            Self::Number(_) => "a number",
            Self::Flag(_) => "a boolean",
        }
    }

    fn into_text(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            other => bail!("expected a double-quoted string, found {}", other.kind()),
        }
    }

    fn into_number(self) -> Result<u64> {
        match self {
            Self::Number(number) => Ok(number),
            other => bail!("expected a whole number, found {}", other.kind()),
        }
    }

    fn into_flag(self) -> Result<bool> {
        match self {
            Self::Flag(flag) => Ok(flag),
            other => bail!("expected true or false, found {}", other.kind()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
github_policy = "jsdelivr"
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.github_policy, Some(GithubPolicy::Jsdelivr));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.relay_url.is_none());
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn test_parse_config_full_file() {
        let cfg = parse_config_str(
            r#"
relay_url = "https://relay.example/?url="
github_policy = "raw-relayed"
connect_timeout_secs = 10
read_timeout_secs = 120
min_book_bytes = 2048
output_dir = "/srv/books"
theme = "sepia"
font_family = "Literata, serif"
font_size_percent = 120
flow = "paginated"
eye_care = true
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.relay_url.as_deref(), Some("https://relay.example/?url="));
        assert_eq!(cfg.github_policy, Some(GithubPolicy::RawRelayed));
        assert_eq!(cfg.connect_timeout_secs, Some(10));
        assert_eq!(cfg.read_timeout_secs, Some(120));
        assert_eq!(cfg.min_book_bytes, Some(2048));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/books")));
        assert_eq!(cfg.theme, Some(Theme::Sepia));
        assert_eq!(cfg.font_family.as_deref(), Some("Literata, serif"));
        assert_eq!(cfg.font_size_percent, Some(120));
        assert_eq!(cfg.flow, Some(Flow::Paginated));
        assert_eq!(cfg.eye_care, Some(true));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
relay_url = "https://corsproxy.io/?" # keep the trailing ?
font_size_percent = 110 # slightly larger
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.relay_url.as_deref(), Some("https://corsproxy.io/?"));
        assert_eq!(cfg.font_size_percent, Some(110));
    }

    #[test]
    fn test_parse_config_hash_inside_string_is_kept() {
        let cfg = parse_config_str(r#"font_family = "Font #1""#).unwrap();
        assert_eq!(cfg.font_family.as_deref(), Some("Font #1"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_relay() {
        let err = parse_config_str(r#"relay_url = "ftp://relay.example/""#)
            .expect_err("ftp relay must be rejected");
        assert!(format!("{err:#}").contains("relay_url"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_policy() {
        let err = parse_config_str(r#"github_policy = "mirror""#)
            .expect_err("unknown policy expected");
        assert!(err.to_string().contains("github_policy"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("connect_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_font_size_out_of_range() {
        let err = parse_config_str("font_size_percent = 20").expect_err("below range");
        assert!(err.to_string().contains("font_size_percent"));
        let err = parse_config_str("font_size_percent = 70000").expect_err("above u16");
        assert!(err.to_string().contains("font_size_percent"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("theme = dark").expect_err("strings must be quoted");
        assert!(err.to_string().contains("theme"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("eye_care = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("eye_care"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("min_book_bytes = 4 trailing")
            .expect_err("expected trailing token error");
        assert!(err.to_string().contains("min_book_bytes"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("relay_url").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_literal_parsing_by_kind() {
        assert_eq!(Literal::parse(r#""a b""#).unwrap(), Literal::Text("a b".to_string()));
        assert_eq!(Literal::parse("\"\"").unwrap(), Literal::Text(String::new()));
        assert_eq!(Literal::parse("42").unwrap(), Literal::Number(42));
        assert_eq!(Literal::parse("false").unwrap(), Literal::Flag(false));
        assert!(Literal::parse(r#""open"#).is_err());
        assert!(Literal::parse(r#""a"b""#).is_err());
        assert!(Literal::parse("-1").is_err());
        assert!(Literal::parse("1.5").is_err());
    }

    #[test]
    fn test_parse_config_reports_kind_mismatch() {
        let err = parse_config_str(r#"eye_care = "true""#).expect_err("quoted boolean");
        assert!(format!("{err:#}").contains("expected true or false, found a string"));
        let err = parse_config_str("relay_url = 8080").expect_err("bare number");
        assert!(format!("{err:#}").contains("found a number"));
    }

    #[test]
    fn test_without_comment_respects_quotes() {
        assert_eq!(without_comment(r#"a = "x#y" # note"#), r#"a = "x#y" "#);
        assert_eq!(without_comment("# whole line"), "");
        assert_eq!(without_comment("a = 1"), "a = 1");
    }

    #[test]
    fn test_parse_config_verbosity_label() {
        let cfg = parse_config_str(r#"verbosity = "quiet""#).unwrap();
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
        let err = parse_config_str(r#"verbosity = "loud""#).expect_err("unknown label");
        assert!(format!("{err:#}").contains("default, verbose, quiet, debug"));
    }

    #[test]
    fn test_verbosity_labels_and_levels() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Quiet.log_level(), "error");
        assert_eq!(VerbositySetting::Verbose.log_level(), "debug");
        assert_eq!(VerbositySetting::Debug.log_level(), "trace");
    }

    #[test]
    fn test_load_default_file_config_reads_xdg_path() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("bookfetch");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "theme = \"dark\"\n").unwrap();

        let _restore = RestoreEnv::set("XDG_CONFIG_HOME", Some(temp.path().as_os_str()));
        let loaded = load_default_file_config().unwrap();
        assert!(loaded.loaded_from_file);
        assert_eq!(loaded.path, Some(dir.join("config.toml")));
        assert_eq!(loaded.config.unwrap().theme, Some(Theme::Dark));
    }

    #[test]
    fn test_load_default_file_config_missing_file_is_not_an_error() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let _restore = RestoreEnv::set("XDG_CONFIG_HOME", Some(temp.path().as_os_str()));
        let loaded = load_default_file_config().unwrap();
        assert!(!loaded.loaded_from_file);
        assert!(loaded.config.is_none());
    }

    #[test]
    fn test_resolve_default_config_path_falls_back_to_home() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _xdg = RestoreEnv::set("XDG_CONFIG_HOME", None);
        let _home = RestoreEnv::set("HOME", Some(std::ffi::OsStr::new("/home/reader")));
        assert_eq!(
            resolve_default_config_path(),
            Some(PathBuf::from("/home/reader/.config/bookfetch/config.toml"))
        );
    }

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    /// Restores an env var to its previous value (or removes it) when dropped.
    struct RestoreEnv {
        key: &'static str,
        value: Option<std::ffi::OsString>,
    }

    impl RestoreEnv {
        fn set(key: &'static str, value: Option<&std::ffi::OsStr>) -> Self {
            let previous = std::env::var_os(key);
            // SAFETY: env mutation is serialized by ENV_LOCK and restored on drop.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
            Self {
                key,
                value: previous,
            }
        }
    }

    impl Drop for RestoreEnv {
        fn drop(&mut self) {
            // SAFETY: test restores env to prior state.
            match &self.value {
                Some(v) => unsafe { std::env::set_var(self.key, v) },
                None => unsafe { std::env::remove_var(self.key) },
            }
        }
    }
}
