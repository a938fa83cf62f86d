//! Plain-text extraction from the EPUB spine.

use std::io::{Cursor, Read, Seek};

use epub::doc::EpubDoc;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::MAX_EXTRACTED_CHAPTERS;
use super::error::BookError;

/// Text of one spine item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterText {
    /// Zero-based spine position.
    pub index: usize,
    /// Manifest id of the item.
    pub id: String,
    /// Body text, one line per source line, whitespace collapsed.
    pub text: String,
}

/// A spine item that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterFailure {
    /// Zero-based spine position.
    pub index: usize,
    /// Manifest id of the item.
    pub id: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of [`extract_text`].
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedBook {
    /// `dc:title`, when present.
    pub title: Option<String>,
    /// Spine items in the book.
    pub spine_len: usize,
    /// Spine items looked at (at most the chapter limit).
    pub scanned: usize,
    /// Non-empty chapters in spine order.
    pub chapters: Vec<ChapterText>,
    /// Chapters that failed to load.
    pub failures: Vec<ChapterFailure>,
}

impl ExtractedBook {
    /// All chapter texts separated by blank lines.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.chapters
            .iter()
            .map(|chapter| chapter.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Extracts text from the first [`MAX_EXTRACTED_CHAPTERS`] spine items.
///
/// # Errors
///
/// See [`extract_text_with_limit`].
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedBook, BookError> {
    extract_text_with_limit(bytes, MAX_EXTRACTED_CHAPTERS)
}

/// Extracts text from the first `max_chapters` spine items.
///
/// Empty chapters are skipped. A chapter whose resource is missing or is not
/// UTF-8 is logged, recorded in [`ExtractedBook::failures`] and skipped.
///
/// # Errors
///
/// - [`BookError::Open`] when the buffer is not a readable EPUB
/// - [`BookError::NoText`] when no scanned chapter produced any text
#[instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn extract_text_with_limit(
    bytes: &[u8],
    max_chapters: usize,
) -> Result<ExtractedBook, BookError> {
    let mut doc =
        EpubDoc::from_reader(Cursor::new(bytes)).map_err(|e| BookError::open(e.to_string()))?;
    let spine = doc.spine.clone();
    let title = doc.mdata("title");
    info!(spine_len = spine.len(), title = ?title, "book opened");

    let mut chapters = Vec::new();
    let mut failures = Vec::new();
    for (index, id) in spine.iter().take(max_chapters).enumerate() {
        match read_chapter(&mut doc, id) {
            Ok(text) if text.is_empty() => debug!(index, id = %id, "empty chapter skipped"),
            Ok(text) => {
                debug!(index, id = %id, chars = text.len(), "chapter extracted");
                chapters.push(ChapterText {
                    index,
                    id: id.clone(),
                    text,
                });
            }
            Err(reason) => {
                warn!(index, id = %id, reason = %reason, "chapter unreadable; continuing");
                failures.push(ChapterFailure {
                    index,
                    id: id.clone(),
                    reason,
                });
            }
        }
    }

    let scanned = spine.len().min(max_chapters);
    if chapters.is_empty() {
        return Err(BookError::no_text(spine.len(), scanned));
    }
    info!(chapters = chapters.len(), failed = failures.len(), "text extracted");

    Ok(ExtractedBook {
        title,
        spine_len: spine.len(),
        scanned,
        chapters,
        failures,
    })
}

fn read_chapter<R: Read + Seek>(doc: &mut EpubDoc<R>, id: &str) -> Result<String, String> {
    let (content, _mime) = doc
        .get_resource(id)
        .ok_or_else(|| format!("resource `{id}` is missing from the archive"))?;
    let markup = String::from_utf8(content).map_err(|e| format!("not UTF-8 text: {e}"))?;
    Ok(body_text(&markup))
}

/// Visible text of the `<body>`, blank lines dropped.
fn body_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let raw: String = match Selector::parse("body") {
        Ok(body) => document.select(&body).flat_map(|el| el.text()).collect(),
        Err(_) => document.root_element().text().collect(),
    };
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
