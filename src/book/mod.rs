//! Reading fetched books: open the EPUB container and pull plain text out of
//! its spine.
//!
//! - [`extract_text`] - text of the first [`MAX_EXTRACTED_CHAPTERS`] spine items
//! - [`ExtractedBook`] - chapters, per-chapter failures and spine size
//! - [`BookError`] - the container cannot be opened, or nothing readable came out
//!
//! Extraction works on an in-memory buffer, so a [`FetchedBook`](crate::fetch::FetchedBook)
//! can be read without touching the disk. A chapter that cannot be read is
//! logged and recorded; the remaining chapters are still extracted.

mod error;
mod extract;

pub use error::BookError;
pub use extract::{
    ChapterFailure, ChapterText, ExtractedBook, extract_text, extract_text_with_limit,
};

/// Spine items read by default; long books are cut here.
pub const MAX_EXTRACTED_CHAPTERS: usize = 50;
