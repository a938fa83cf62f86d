//! HTTP client for downloading and validating books.

use std::io::ErrorKind;
use std::panic::{AssertUnwindSafe, catch_unwind, set_hook, take_hook};
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Proxy};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_MAX_BOOK_BYTES, DEFAULT_MIN_BOOK_BYTES, MAX_SAVE_ATTEMPTS,
    READ_TIMEOUT_SECS, ZIP_SIGNATURE,
};
use super::error::FetchError;
use super::filename::{filename_from_reference, resolve_unique_path, sanitize_filename};
use crate::resolver::FetchTarget;
use crate::user_agent;

/// Client tuning: timeouts and body size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
    /// Bodies shorter than this are rejected as broken links.
    pub min_bytes: u64,
    /// Bodies longer than this are rejected without buffering the rest.
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            min_bytes: DEFAULT_MIN_BOOK_BYTES,
            max_bytes: DEFAULT_MAX_BOOK_BYTES,
        }
    }
}

/// A downloaded, validated book held in memory.
#[derive(Debug, Clone)]
pub struct FetchedBook {
    /// Raw archive bytes.
    pub bytes: Vec<u8>,
    /// Content-Type header as sent by the server.
    pub content_type: Option<String>,
    /// URL after redirects.
    pub final_url: String,
}

impl FetchedBook {
    /// Size in KiB with two decimals, e.g. `"1.46 KB"`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kib(&self) -> String {
        format!("{:.2} KB", self.bytes.len() as f64 / 1024.0)
    }

    /// Number of bytes received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no bytes were received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of [`BookClient::fetch_to_file`].
#[derive(Debug, Clone, Serialize)]
pub struct SavedBook {
    /// Where the book was written.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// URL after redirects.
    pub final_url: String,
}

/// HTTP client for fetching resolved books.
///
/// Create once and reuse; the inner reqwest client pools connections and is
/// cheap to clone.
///
/// # Example
///
/// ```no_run
/// use bookfetch_core::fetch::BookClient;
/// use bookfetch_core::resolver::{ResolverSettings, build_default_link_resolver};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = build_default_link_resolver(&ResolverSettings::default());
/// let target = resolver.resolve("https://example.com/book.epub").ok_or("empty link")?;
/// let book = BookClient::new()?.fetch(&target).await?;
/// println!("fetched {}", book.size_kib());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BookClient {
    client: Client,
    settings: FetchSettings,
}

impl BookClient {
    /// Creates a client with default timeouts and limits.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend or proxy
    /// configuration cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend or proxy
    /// configuration cannot be initialized.
    #[instrument(level = "debug")]
    pub fn with_settings(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_client(settings.connect_timeout_secs, settings.read_timeout_secs)?;
        Ok(Self { client, settings })
    }

    /// Returns the active settings.
    #[must_use]
    pub fn settings(&self) -> FetchSettings {
        self.settings
    }

    /// Downloads the target into memory and validates it as an EPUB container.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - the URL is invalid
    /// - the request fails (network error, timeout)
    /// - the server returns a non-success status
    /// - the body is shorter than `min_bytes` or longer than `max_bytes`
    /// - the body does not start with a ZIP local file header
    #[instrument(skip(self, target), fields(url = %target.url, rule = %target.rule))]
    pub async fn fetch(&self, target: &FetchTarget) -> Result<FetchedBook, FetchError> {
        let url = target.url.as_str();
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let declared_len = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if declared_len.is_some_and(|len| len > self.settings.max_bytes) {
            return Err(FetchError::too_large(url, self.settings.max_bytes));
        }

        let bytes = read_capped(response, url, self.settings.max_bytes).await?;
        let received = bytes.len() as u64;
        debug!(bytes = received, content_type = ?content_type, "body received");

        if received < self.settings.min_bytes {
            return Err(FetchError::too_small(url, received, self.settings.min_bytes));
        }
        if !bytes.starts_with(&ZIP_SIGNATURE) {
            return Err(FetchError::not_an_archive(url, content_type.as_deref()));
        }

        let book = FetchedBook {
            bytes,
            content_type,
            final_url,
        };
        info!(size = %book.size_kib(), "book fetched");
        Ok(book)
    }

    /// Fetches the target and writes it under `dir`.
    ///
    /// The filename is `preferred_name` when given, otherwise derived from
    /// the reference's last path segment (`book.epub` as fallback). An
    /// existing file is never overwritten; `name_2.epub`, `name_3.epub`, ...
    /// are tried instead. Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// Everything [`BookClient::fetch`] returns, plus [`FetchError::Io`] when
    /// the directory cannot be created or the file cannot be written.
    #[instrument(skip(self, target), fields(url = %target.url, dir = %dir.display()))]
    pub async fn fetch_to_file(
        &self,
        target: &FetchTarget,
        dir: &Path,
        preferred_name: Option<&str>,
    ) -> Result<SavedBook, FetchError> {
        let book = self.fetch(target).await?;

        let filename = preferred_name
            .map(sanitize_filename)
            .filter(|name| !name.trim_matches('_').is_empty())
            .unwrap_or_else(|| filename_from_reference(&target.reference));

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| FetchError::io(dir, e))?;
        let path = save_new_file(dir, &filename, &book.bytes).await?;

        info!(path = %path.display(), size = %book.size_kib(), "book saved");
        Ok(SavedBook {
            path,
            bytes: book.bytes.len() as u64,
            final_url: book.final_url,
        })
    }
}

/// Writes `bytes` under a name in `dir` that did not exist before.
///
/// The file is opened with `create_new`, so a name claimed between the
/// uniqueness check and the open is skipped rather than truncated.
async fn save_new_file(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
    let mut last_taken = None;
    for _ in 0..MAX_SAVE_ATTEMPTS {
        let path = resolve_unique_path(dir, filename);
        debug!(filename = %filename, path = %path.display(), "resolved output path");
        match write_new_file(&path, bytes).await {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "output path was taken; trying the next name");
                last_taken = Some((path, e));
            }
            Err(e) => return Err(FetchError::io(path, e)),
        }
    }
    Err(match last_taken {
        Some((path, e)) => FetchError::io(path, e),
        None => FetchError::io(dir, ErrorKind::AlreadyExists.into()),
    })
}

/// Creates `path` exclusively and writes `bytes`; a partial file is removed.
async fn write_new_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial file");
        }
        return Err(e);
    }
    Ok(())
}

/// Buffers the body, stopping as soon as `max_bytes` is exceeded.
async fn read_capped(
    response: reqwest::Response,
    url: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, FetchError> {
    let mut stream = response.bytes_stream();
    let mut buffer = Vec::new();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;
        if (buffer.len() + chunk.len()) as u64 > max_bytes {
            return Err(FetchError::too_large(url, max_bytes));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

fn build_client(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Client, FetchError> {
    match try_build_client(connect_timeout_secs, read_timeout_secs, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!(
                "HTTP client builder panicked while loading system proxy settings; retrying with env-proxy fallback"
            );
            match try_build_client(connect_timeout_secs, read_timeout_secs, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(FetchError::client_build(
                    "builder panicked while applying env-proxy fallback",
                )),
                Err(BuildClientFailure::Build(error)) => {
                    Err(FetchError::client_build(error.to_string()))
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(FetchError::client_build(error.to_string())),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

// `catch_unwind` does not silence the panic hook; keep stderr clean while a
// system-proxy panic is being recovered.
static CLIENT_BUILD_PANIC_HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn try_build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let _guard = CLIENT_BUILD_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(AssertUnwindSafe(move || {
        #[cfg(test)]
        maybe_inject_client_build_panic();

        let mut builder = base_client_builder(connect_timeout_secs, read_timeout_secs);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }));
    set_hook(previous_hook);
    outcome.map_err(|_| BuildClientFailure::Panic)?
}

fn base_client_builder(connect_timeout_secs: u64, read_timeout_secs: u64) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_fetch_user_agent())
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    proxy_for_scheme(scheme, |name| std::env::var(name).ok())
}

/// Scheme-specific variables win over `ALL_PROXY`; upper case wins over lower.
fn proxy_for_scheme(scheme: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

// Per thread, so parallel tests building their own clients are unaffected.
#[cfg(test)]
thread_local! {
    static CLIENT_BUILD_PANIC_INJECTION_COUNT: std::cell::Cell<usize> =
        const { std::cell::Cell::new(0) };
}

#[cfg(test)]
fn inject_client_build_panics(count: usize) {
    CLIENT_BUILD_PANIC_INJECTION_COUNT.with(|remaining| remaining.set(count));
}

#[cfg(test)]
fn maybe_inject_client_build_panic() {
    let remaining = CLIENT_BUILD_PANIC_INJECTION_COUNT.with(std::cell::Cell::get);
    if remaining > 0 {
        CLIENT_BUILD_PANIC_INJECTION_COUNT.with(|cell| cell.set(remaining - 1));
        panic!("injected HTTP client builder panic");
    }
}
