//! Parsing of user-supplied values.
//!
//! - [`reference_from_query`] - pulls the book reference out of a reader page URL
//! - [`validate_relay_endpoint`] - checks a CORS relay prefix
//! - [`ParseError`] - errors for rejected labels and endpoints

mod error;
mod query;
mod url;

pub use error::{MAX_ENDPOINT_LENGTH, ParseError};
pub use query::{DEFAULT_REFERENCE_PARAM, decoded_reference_from_query, reference_from_query};
pub use url::validate_relay_endpoint;
