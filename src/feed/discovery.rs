use crate::util::resolve_url;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

const LINK_TAG: &str = "<link";

/// The two syndication formats a page can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeedKind {
    #[serde(rename = "application/rss+xml")]
    Rss,
    #[serde(rename = "application/atom+xml")]
    Atom,
}

impl FeedKind {
    /// MIME type advertised in the `type` attribute.
    pub fn mime_type(self) -> &'static str {
        match self {
            FeedKind::Rss => "application/rss+xml",
            FeedKind::Atom => "application/atom+xml",
        }
    }

    fn from_mime_type(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(FeedKind::Rss.mime_type()) {
            Some(FeedKind::Rss)
        } else if value.eq_ignore_ascii_case(FeedKind::Atom.mime_type()) {
            Some(FeedKind::Atom)
        } else {
            None
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A feed advertised by a page through a `<link>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedLink {
    /// Absolute URL of the feed
    pub href: String,
    /// Advertised feed format
    #[serde(rename = "mimeType")]
    pub mime_type: FeedKind,
}

/// Scans markup for `<link>` tags advertising RSS or Atom feeds.
///
/// Uses simple string scanning rather than an HTML parser so that pages with
/// broken markup elsewhere still yield their feed links. Tag and attribute
/// names and the `type` value are matched case-insensitively, attributes may
/// come in any order, and values may be double-quoted, single-quoted or bare.
///
/// Each `href` is resolved against `base_url`. Links without an `href`, or
/// whose `href` cannot be resolved, are skipped. Results follow document
/// order and duplicates are kept.
///
/// # Examples
///
/// ```
/// use pagefeed::feed::{discover, FeedKind};
///
/// let html = r#"<link type="application/rss+xml" href="/feed.xml">"#;
/// let links = discover(html, "https://example.com/blog");
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].href, "https://example.com/feed.xml");
/// assert_eq!(links[0].mime_type, FeedKind::Rss);
/// ```
pub fn discover(markup: &str, base_url: &str) -> Vec<FeedLink> {
    // ASCII lowering keeps byte offsets aligned with `markup`
    let markup_lower = markup.to_ascii_lowercase();
    let mut links = Vec::new();
    let mut search_from = 0;

    while let Some(found) = markup_lower[search_from..].find(LINK_TAG) {
        let attrs_start = search_from + found + LINK_TAG.len();
        search_from = attrs_start;

        // `<linker>` and friends are not link tags
        match markup.as_bytes().get(attrs_start) {
            Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
            Some(_) => continue,
            None => break,
        }

        let Some((attributes, tag_end)) = parse_attributes(&markup[attrs_start..]) else {
            tracing::trace!(offset = attrs_start, "Skipping unterminated <link> tag");
            continue;
        };
        search_from = attrs_start + tag_end + 1;

        if let Some(link) = feed_link_from_attributes(&attributes, base_url) {
            links.push(link);
        }
    }

    tracing::debug!(base = %base_url, found = links.len(), "Scanned markup for feed links");
    links
}

fn feed_link_from_attributes(attributes: &[Attribute<'_>], base_url: &str) -> Option<FeedLink> {
    let kind = FeedKind::from_mime_type(attribute_value(attributes, "type")?)?;

    let Some(raw_href) = attribute_value(attributes, "href") else {
        tracing::debug!(kind = %kind, "Feed link without href, skipping");
        return None;
    };

    // `&amp;` and friends show up in hrefs of otherwise sane pages
    let href = quick_xml::escape::unescape(raw_href).unwrap_or(Cow::Borrowed(raw_href));

    match resolve_url(&href, base_url) {
        Some(resolved) => Some(FeedLink {
            href: resolved,
            mime_type: kind,
        }),
        None => {
            tracing::debug!(href = %href, base = %base_url, "Unresolvable feed href, skipping");
            None
        }
    }
}

/// A single `name[=value]` pair from inside a tag.
#[derive(Debug, PartialEq, Eq)]
struct Attribute<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

/// Returns the value of the first attribute named `name` (ASCII case-insensitive).
fn attribute_value<'a>(attributes: &[Attribute<'a>], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attr| attr.name.eq_ignore_ascii_case(name))
        .and_then(|attr| attr.value)
}

/// Tokenizes the attribute list of a tag, starting just after the tag name.
///
/// Returns the attributes together with the offset of the closing `>`, or
/// `None` if the input ends first or a quoted value runs into another tag.
/// A `>` inside a quoted value does not close the tag.
fn parse_attributes(input: &str) -> Option<(Vec<Attribute<'_>>, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let skip_whitespace = |mut pos: usize| {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        pos
    };

    let mut attributes = Vec::new();
    let mut pos = 0;

    loop {
        while pos < len && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b'/') {
            pos += 1;
        }
        if pos >= len {
            return None;
        }
        if bytes[pos] == b'>' {
            return Some((attributes, pos));
        }

        let name_start = pos;
        while pos < len
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let name = &input[name_start..pos];

        let after_name = skip_whitespace(pos);
        if after_name >= len || bytes[after_name] != b'=' {
            attributes.push(Attribute { name, value: None });
            pos = after_name;
            continue;
        }

        let value_start = skip_whitespace(after_name + 1);
        if value_start >= len {
            return None;
        }

        match bytes[value_start] {
            quote @ (b'"' | b'\'') => {
                let inner_start = value_start + 1;
                let inner_len = input[inner_start..].find(quote as char)?;
                let value = &input[inner_start..inner_start + inner_len];
                // A quote left open runs into the next tag; give up on this one
                if value.contains('<') {
                    return None;
                }
                attributes.push(Attribute {
                    name,
                    value: Some(value),
                });
                pos = inner_start + inner_len + 1;
            }
            _ => {
                let mut value_end = value_start;
                while value_end < len
                    && !bytes[value_end].is_ascii_whitespace()
                    && bytes[value_end] != b'>'
                {
                    value_end += 1;
                }
                attributes.push(Attribute {
                    name,
                    value: Some(&input[value_start..value_end]),
                });
                pos = value_end;
            }
        }
    }
}
