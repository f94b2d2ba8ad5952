//! Turn web pages into syndication data.
//!
//! Two flows are exposed through [`pipeline`]:
//!
//! - [`pipeline::discover_feeds`] fetches a page and lists the RSS/Atom feeds
//!   it advertises in `<link>` tags.
//! - [`pipeline::generate_feed`] fetches a page that has no feed, scrapes its
//!   repeated article blocks with CSS selectors and renders an RSS 2.0 document.
//!
//! The building blocks live in [`feed`]; [`request`] handles the
//! query-string form of generator requests and [`config`] the optional
//! TOML configuration.

pub mod config;
pub mod feed;
pub mod pipeline;
pub mod request;
pub mod util;
