//! The two end-to-end flows: discovering a page's feeds and generating a feed
//! from a page.
//!
//! Each call performs at most one fetch and runs everything else
//! synchronously once the markup has arrived. Failures surface as a single
//! [`PipelineError`]; there are no partial results.
use crate::feed::{
    discover, serialize, ExtractError, FeedLink, FetchError, MarkupDocument, MarkupSource,
};
use crate::request::{FeedRequest, ValidationError, PARAM_URL};
use thiserror::Error;

/// Any failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl PipelineError {
    /// HTTP status a front end should answer with for this error.
    ///
    /// Caller mistakes map to 400, upstream failures to 502 and upstream
    /// timeouts to 504.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::Validation(_) | PipelineError::Extract(_) => 400,
            PipelineError::Fetch(FetchError::InvalidUrl(_)) => 400,
            PipelineError::Fetch(FetchError::Timeout(_)) => 504,
            PipelineError::Fetch(
                FetchError::HttpStatus(_)
                | FetchError::Transport(_)
                | FetchError::ResponseTooLarge(_),
            ) => 502,
        }
    }
}

/// Fetches the page at `address` and lists the feeds it advertises.
///
/// A page without feed links yields an empty list.
pub async fn discover_feeds<S>(source: &S, address: &str) -> Result<Vec<FeedLink>, PipelineError>
where
    S: MarkupSource,
{
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::MissingField(PARAM_URL).into());
    }

    let markup = source.fetch(address).await?;
    let links = discover(&markup, address);
    tracing::info!(url = %address, feeds = links.len(), "Discovered feeds");
    Ok(links)
}

/// Fetches the requested page, scrapes it and renders an RSS 2.0 document.
///
/// Selectors are compiled before the fetch, so a bad selector never costs a
/// request.
pub async fn generate_feed<S>(source: &S, request: &FeedRequest) -> Result<String, PipelineError>
where
    S: MarkupSource,
{
    request.selectors.validate()?;

    let markup = source.fetch(&request.url).await?;
    let document = MarkupDocument::parse(&markup, &request.url);
    let articles = document.extract(&request.selectors)?;

    let rss = serialize(&articles, &request.channel);
    tracing::info!(
        url = %request.url,
        items = articles.len(),
        "Generated feed"
    );
    Ok(rss)
}
