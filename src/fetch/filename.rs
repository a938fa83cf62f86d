//! Filename derivation and unique path resolution for saved books.

use std::path::{Component, Path, PathBuf};

use crate::resolver::utils::parse_lenient;

use super::constants::DEFAULT_BOOK_FILENAME;

/// Derives a filename from the (decoded) reference's last path segment.
///
/// Segments without an extension (`/view`, `/edit`, bare ids) are not
/// useful as names and yield [`DEFAULT_BOOK_FILENAME`].
#[must_use]
pub fn filename_from_reference(reference: &str) -> String {
    let Some(url) = parse_lenient(reference) else {
        return DEFAULT_BOOK_FILENAME.to_string();
    };
    if let Some(mut segments) = url.path_segments()
        && let Some(last) = segments.next_back()
        && has_extension(last)
    {
        let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |s| s.into_owned());
        let sanitized = sanitize_filename(&decoded);
        if has_extension(&sanitized) {
            return sanitized;
        }
    }
    DEFAULT_BOOK_FILENAME.to_string()
}

fn has_extension(segment: &str) -> bool {
    segment
        .rfind('.')
        .is_some_and(|dot| dot > 0 && dot + 1 < segment.len())
}

/// Sanitizes a filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > | and control characters.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Resolves a path in `dir` that does not exist yet.
///
/// `book.epub`, then `book_2.epub`, `book_3.epub`, ...
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if sanitized.trim_matches('_').is_empty() {
            DEFAULT_BOOK_FILENAME.to_string()
        } else {
            sanitized
        }
    };
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };

    for i in 2..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}
