use crate::feed::extractor::Article;
use crate::util::strip_invalid_xml_chars;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// RFC 1123 / HTTP-date layout. Always rendered in UTC.
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Feed-level metadata wrapping the generated items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// Renders a date as an RFC 1123 string in GMT, e.g. `Fri, 05 Jan 2024 10:30:00 GMT`.
///
/// A missing date renders as the Unix epoch so that `<pubDate>` stays
/// syntactically valid.
pub fn format_rfc1123(date: Option<&DateTime<Utc>>) -> String {
    date.copied()
        .unwrap_or_default()
        .format(RFC1123_FORMAT)
        .to_string()
}

/// Renders articles as an RSS 2.0 document.
///
/// Produces `<?xml version="1.0" encoding="UTF-8"?>`, a `<rss version="2.0">`
/// root and a single `<channel>` holding the channel's `title`, `link` and
/// `description` followed by one `<item>` per article, in input order. Each
/// item carries `title`, `link`, `description` and `pubDate`.
///
/// All text is escaped here; callers pass raw strings. Output is
/// deterministic for identical input.
///
/// # Panics
///
/// Only if writing to an in-memory buffer fails, which would be a bug.
///
/// # Examples
///
/// ```
/// use pagefeed::feed::{serialize, ChannelInfo};
///
/// let channel = ChannelInfo {
///     title: "Blog".into(),
///     link: "https://example.com".into(),
///     description: "Posts".into(),
/// };
/// let xml = serialize(&[], &channel);
/// assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
/// assert!(xml.contains("<title>Blog</title>"));
/// ```
pub fn serialize(articles: &[Article], channel: &ChannelInfo) -> String {
    let xml = write_rss(articles, channel).expect("RSS serialization into memory failed");
    tracing::debug!(items = articles.len(), bytes = xml.len(), "Serialized RSS feed");
    xml
}

fn write_rss(articles: &[Article], channel: &ChannelInfo) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer
        .write_event(Event::Start(rss))
        .context("Failed to write rss element")?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .context("Failed to write channel element")?;

    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;

    for article in articles {
        writer
            .write_event(Event::Start(BytesStart::new("item")))
            .context("Failed to write item element")?;
        write_text_element(&mut writer, "title", &article.title)?;
        write_text_element(&mut writer, "link", &article.link)?;
        write_text_element(&mut writer, "description", &article.description)?;
        write_text_element(
            &mut writer,
            "pubDate",
            &format_rfc1123(article.pub_date.as_ref()),
        )?;
        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .context("Failed to write item end")?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .context("Failed to write channel end")?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .context("Failed to write rss end")?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).context("Generated RSS contains invalid UTF-8")
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    let text = strip_invalid_xml_chars(text);
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to write {name} element"))?;
    writer
        .write_event(Event::Text(BytesText::from_escaped(
            quick_xml::escape::escape(text.as_ref()),
        )))
        .with_context(|| format!("Failed to write {name} text"))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to write {name} end"))?;
    Ok(())
}
