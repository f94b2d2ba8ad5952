//! Utility functions shared by both pipelines.
//!
//! This module provides reusable utilities for:
//!
//! - **URL resolution**: Relative-to-absolute resolution used by discovery and extraction
//! - **URL validation**: Security-focused validation to prevent SSRF attacks
//! - **Text processing**: Stripping characters that cannot appear in an XML document
//!
//! # Examples
//!
//! ```
//! use pagefeed::util::{resolve_url, strip_invalid_xml_chars, validate_url};
//!
//! let url = validate_url("https://example.com/blog", false).unwrap();
//! assert_eq!(
//!     resolve_url("/feed.xml", url.as_str()).as_deref(),
//!     Some("https://example.com/feed.xml")
//! );
//! assert_eq!(strip_invalid_xml_chars("a\x00b"), "ab");
//! ```

mod text;
mod url_resolver;
mod url_validator;

pub use text::strip_invalid_xml_chars;
pub use url_resolver::resolve_url;
pub use url_validator::{validate_url, UrlValidationError};
