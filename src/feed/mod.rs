//! Feed discovery and feed synthesis.
//!
//! This module holds the two engines that turn web pages into syndication data:
//!
//! - **Discovery**: Find the RSS/Atom feeds a page advertises in its `<link>` tags
//! - **Extraction**: Scrape repeated article blocks into [`Article`] records using CSS selectors
//! - **Serialization**: Render articles as an RSS 2.0 document
//! - **Fetching**: Retrieve page markup over HTTP(S)
//!
//! # Architecture
//!
//! - [`discovery`] - Tolerant lexical scan for feed `<link>` tags (no HTML parser)
//! - [`extractor`] - Selector-driven scraping on top of the `scraper` DOM
//! - [`dates`] - Permissive parsing of scraped publication dates
//! - [`serializer`] - RSS 2.0 output via `quick-xml`
//! - [`fetcher`] - [`MarkupSource`] trait and its `reqwest` implementation
//!
//! # Example
//!
//! ```
//! use pagefeed::feed::{discover, extract, serialize, ChannelInfo, SelectorSet};
//!
//! let html = r#"<html><head>
//!     <link rel="alternate" type="application/rss+xml" href="/feed.xml">
//! </head><body>
//!     <article><h2>Hello</h2><a href="/hello">more</a></article>
//! </body></html>"#;
//!
//! let links = discover(html, "https://example.com/");
//! assert_eq!(links[0].href, "https://example.com/feed.xml");
//!
//! let selectors = SelectorSet {
//!     article: "article".into(),
//!     title: Some("h2".into()),
//!     link: "a".into(),
//!     ..Default::default()
//! };
//! let articles = extract(html, &selectors, "https://example.com/").unwrap();
//! let rss = serialize(&articles, &ChannelInfo {
//!     title: "Example".into(),
//!     link: "https://example.com/".into(),
//!     description: String::new(),
//! });
//! assert!(rss.contains("<link>https://example.com/hello</link>"));
//! ```

pub mod dates;
pub mod discovery;
pub mod extractor;
pub mod fetcher;
pub mod serializer;

pub use dates::parse_pub_date;
pub use discovery::{discover, FeedKind, FeedLink};
pub use extractor::{extract, Article, ExtractError, MarkupDocument, SelectorField, SelectorSet};
pub use fetcher::{FetchError, HttpFetcher, MarkupSource};
pub use serializer::{format_rfc1123, serialize, ChannelInfo};
