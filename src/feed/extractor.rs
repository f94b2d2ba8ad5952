use crate::feed::dates::parse_pub_date;
use crate::util::resolve_url;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use thiserror::Error;

/// Selectors describing where articles and their fields live on a page.
///
/// `article` picks the repeated article containers; the remaining selectors
/// are evaluated inside each container. `article` and `link` are required,
/// the others may be `None` (or blank), in which case the field stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSet {
    pub article: String,
    pub title: Option<String>,
    pub link: String,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

impl SelectorSet {
    /// Compiles every selector without touching a page.
    ///
    /// Lets callers reject a bad selector before paying for a fetch.
    pub fn validate(&self) -> Result<(), ExtractError> {
        CompiledSelectors::compile(self).map(|_| ())
    }
}

/// One article scraped from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Absolute URL (the page address itself when the article had no link)
    pub link: String,
    pub description: String,
    /// `None` when the date was missing or could not be parsed
    pub pub_date: Option<DateTime<Utc>>,
}

/// Which selector of a [`SelectorSet`] an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorField {
    Article,
    Title,
    Link,
    Description,
    PubDate,
}

impl fmt::Display for SelectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorField::Article => "articleSelector",
            SelectorField::Title => "titleSelector",
            SelectorField::Link => "linkSelector",
            SelectorField::Description => "descriptionSelector",
            SelectorField::PubDate => "pubDateSelector",
        };
        f.write_str(name)
    }
}

/// Errors raised while preparing an extraction.
///
/// A selector that matches nothing is not an error; only selectors that
/// cannot be compiled are.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {field} {selector:?}: {reason}")]
    InvalidSelector {
        field: SelectorField,
        selector: String,
        reason: String,
    },
}

struct CompiledSelectors {
    article: Selector,
    title: Option<Selector>,
    link: Selector,
    description: Option<Selector>,
    pub_date: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(set: &SelectorSet) -> Result<Self, ExtractError> {
        Ok(Self {
            article: compile(SelectorField::Article, &set.article)?,
            title: compile_optional(SelectorField::Title, set.title.as_deref())?,
            link: compile(SelectorField::Link, &set.link)?,
            description: compile_optional(
                SelectorField::Description,
                set.description.as_deref(),
            )?,
            pub_date: compile_optional(SelectorField::PubDate, set.pub_date.as_deref())?,
        })
    }
}

fn compile(field: SelectorField, selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector.trim()).map_err(|e| ExtractError::InvalidSelector {
        field,
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

fn compile_optional(
    field: SelectorField,
    selector: Option<&str>,
) -> Result<Option<Selector>, ExtractError> {
    match selector {
        Some(s) if !s.trim().is_empty() => compile(field, s).map(Some),
        _ => Ok(None),
    }
}

/// A parsed page together with the address it was fetched from.
pub struct MarkupDocument {
    html: Html,
    base_url: String,
}

impl MarkupDocument {
    /// Parses markup into a traversable tree.
    ///
    /// The HTML parser recovers from malformed input the way browsers do, so
    /// this never fails.
    pub fn parse(markup: &str, base_url: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            base_url: base_url.to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs the selectors against this document.
    ///
    /// Every element matched by the article selector yields exactly one
    /// [`Article`], in document order, whether or not its fields matched.
    pub fn extract(&self, selectors: &SelectorSet) -> Result<Vec<Article>, ExtractError> {
        let compiled = CompiledSelectors::compile(selectors)?;
        Ok(self.extract_compiled(&compiled))
    }

    fn extract_compiled(&self, selectors: &CompiledSelectors) -> Vec<Article> {
        let articles: Vec<Article> = self
            .html
            .select(&selectors.article)
            .map(|scope| self.extract_article(scope, selectors))
            .collect();

        tracing::debug!(
            articles = articles.len(),
            undated = articles.iter().filter(|a| a.pub_date.is_none()).count(),
            "Extracted articles"
        );
        articles
    }

    fn extract_article(&self, scope: ElementRef<'_>, selectors: &CompiledSelectors) -> Article {
        let title = selectors
            .title
            .as_ref()
            .and_then(|s| first_match(scope, s))
            .map(trimmed_text)
            .unwrap_or_default();

        let description = selectors
            .description
            .as_ref()
            .and_then(|s| first_match(scope, s))
            .map(trimmed_text)
            .unwrap_or_default();

        let href = first_match(scope, &selectors.link)
            .and_then(|el| el.value().attr("href"))
            .unwrap_or("");
        let link = resolve_url(href, &self.base_url).unwrap_or_else(|| {
            tracing::debug!(
                href = %href,
                base = %self.base_url,
                "Unresolvable article link, keeping as-is"
            );
            href.to_owned()
        });

        let pub_date = selectors
            .pub_date
            .as_ref()
            .and_then(|s| first_match(scope, s))
            .and_then(element_date);

        Article {
            title,
            link,
            description,
            pub_date,
        }
    }
}

/// Extracts one [`Article`] per element matched by `selectors.article`.
///
/// Field selectors are evaluated inside each article element only. Missing
/// title or description matches produce empty strings, a missing link
/// resolves to `base_url`, and a missing or unparsable date becomes `None`.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidSelector`] if any selector fails to compile.
/// All selectors are compiled before the page is touched.
///
/// # Examples
///
/// ```
/// use pagefeed::feed::{extract, SelectorSet};
///
/// let html = r#"<div class="post"><h2>Hello</h2><a href="/hello">read</a></div>"#;
/// let selectors = SelectorSet {
///     article: ".post".into(),
///     title: Some("h2".into()),
///     link: "a".into(),
///     ..Default::default()
/// };
/// let articles = extract(html, &selectors, "https://example.com/").unwrap();
/// assert_eq!(articles[0].title, "Hello");
/// assert_eq!(articles[0].link, "https://example.com/hello");
/// assert_eq!(articles[0].description, "");
/// ```
pub fn extract(
    markup: &str,
    selectors: &SelectorSet,
    base_url: &str,
) -> Result<Vec<Article>, ExtractError> {
    let compiled = CompiledSelectors::compile(selectors)?;
    Ok(MarkupDocument::parse(markup, base_url).extract_compiled(&compiled))
}

/// First element matching `selector` within `scope`, counting `scope` itself.
fn first_match<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if selector.matches(&scope) {
        return Some(scope);
    }
    scope.select(selector).next()
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// A `<time datetime="...">` attribute wins over the visible text.
fn element_date(element: ElementRef<'_>) -> Option<DateTime<Utc>> {
    element
        .value()
        .attr("datetime")
        .and_then(parse_pub_date)
        .or_else(|| parse_pub_date(&trimmed_text(element)))
}
