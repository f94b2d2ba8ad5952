//! Integration tests for feed generation: fetch, scrape, serialize.
//!
//! Each test serves its page from a dedicated wiremock server and runs the
//! full pipeline through a configured `HttpFetcher`. Generated documents are
//! read back with feed-rs to confirm that a real feed parser accepts them.

use chrono::{TimeZone, Utc};
use pagefeed::config::Config;
use pagefeed::feed::{ChannelInfo, FetchError, HttpFetcher, SelectorSet};
use pagefeed::pipeline::{generate_feed, PipelineError};
use pagefeed::request::FeedRequest;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOG: &str = r#"<!DOCTYPE html>
<html>
<head><title>Example Blog</title></head>
<body>
  <main>
    <article class="post">
      <h2>Shipping 1.0</h2>
      <a href="/posts/shipping-1-0">Read more</a>
      <p>We made it &amp; it works.</p>
      <time datetime="2024-01-05T10:30:00+02:00">5 January</time>
    </article>
    <article class="post">
      <h2>Why <em>tabs</em> &lt; spaces</h2>
      <a href="posts/tabs">Read more</a>
      <p>An opinion.</p>
      <time>Jan 3, 2024</time>
    </article>
    <article class="post">
      <h2>Hello world</h2>
      <a href="https://elsewhere.example.org/hello">Read more</a>
      <time>sometime last year</time>
    </article>
  </main>
</body>
</html>"#;

fn fetcher() -> HttpFetcher {
    Config {
        allow_private_hosts: true,
        ..Config::default()
    }
    .http_fetcher()
    .unwrap()
}

async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

fn blog_request(server: &MockServer) -> FeedRequest {
    FeedRequest {
        url: format!("{}/blog/", server.uri()),
        selectors: SelectorSet {
            article: "article.post".into(),
            title: Some("h2".into()),
            link: "a".into(),
            description: Some("p".into()),
            pub_date: Some("time".into()),
        },
        channel: ChannelInfo {
            title: "Example Blog".into(),
            link: "https://example.com".into(),
            description: "Posts".into(),
        },
    }
}

// ============================================================================
// End-to-end generation
// ============================================================================

#[tokio::test]
async fn test_generated_feed_parses_with_feed_rs() {
    let server = serve(BLOG).await;
    let request = blog_request(&server);

    let rss = generate_feed(&fetcher(), &request).await.unwrap();
    let feed = feed_rs::parser::parse(rss.as_bytes()).unwrap();

    assert_eq!(
        feed.title.map(|t| t.content).as_deref(),
        Some("Example Blog")
    );
    assert_eq!(feed.entries.len(), 3);

    let titles: Vec<String> = feed
        .entries
        .iter()
        .map(|e| e.title.as_ref().map(|t| t.content.clone()).unwrap_or_default())
        .collect();
    assert_eq!(
        titles,
        vec!["Shipping 1.0", "Why tabs < spaces", "Hello world"]
    );

    let links: Vec<String> = feed
        .entries
        .iter()
        .map(|e| e.links[0].href.clone())
        .collect();
    assert_eq!(
        links,
        vec![
            format!("{}/posts/shipping-1-0", server.uri()),
            format!("{}/blog/posts/tabs", server.uri()),
            "https://elsewhere.example.org/hello".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_generated_dates_are_normalized_to_utc() {
    let server = serve(BLOG).await;
    let rss = generate_feed(&fetcher(), &blog_request(&server))
        .await
        .unwrap();
    let feed = feed_rs::parser::parse(rss.as_bytes()).unwrap();

    assert_eq!(
        feed.entries[0].published,
        Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap())
    );
    assert_eq!(
        feed.entries[1].published,
        Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
    );
    // Unparsable dates fall back to the epoch
    assert!(rss.contains("<pubDate>Thu, 01 Jan 1970 00:00:00 GMT</pubDate>"));
}

#[tokio::test]
async fn test_missing_description_renders_empty_element() {
    let server = serve(BLOG).await;
    let rss = generate_feed(&fetcher(), &blog_request(&server))
        .await
        .unwrap();
    let feed = feed_rs::parser::parse(rss.as_bytes()).unwrap();

    let third = &feed.entries[2];
    assert!(third.summary.as_ref().map_or(true, |s| s.content.is_empty()));
}

#[tokio::test]
async fn test_request_from_query_string() {
    let server = serve(BLOG).await;
    let query = blog_request(&server).to_query();
    let request = FeedRequest::from_query(&query).unwrap();

    let rss = generate_feed(&fetcher(), &request).await.unwrap();
    assert_eq!(rss.matches("<item>").count(), 3);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_upstream_404_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = generate_feed(&fetcher(), &blog_request(&server))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::HttpStatus(404))
    ));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_invalid_selector_never_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BLOG))
        .expect(0)
        .mount(&server)
        .await;

    let mut request = blog_request(&server);
    request.selectors.article = "article..post".into();

    let err = generate_feed(&fetcher(), &request).await.unwrap_err();
    assert!(matches!(err, PipelineError::Extract(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_private_host_blocked_by_default_config() {
    let server = serve(BLOG).await;
    let fetcher = Config::default().http_fetcher().unwrap();

    let err = generate_feed(&fetcher, &blog_request(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Fetch(FetchError::InvalidUrl(_))));
    assert_eq!(err.status_code(), 400);
}

// ============================================================================
// Properties
// ============================================================================

fn page_with_posts(count: usize) -> String {
    let posts: String = (0..count)
        .map(|i| format!(r#"<div class="post"><h3>Post {i}</h3><a href="/p/{i}">go</a></div>"#))
        .collect();
    format!("<html><body>{posts}</body></html>")
}

proptest! {
    #[test]
    fn prop_one_item_per_article_in_order(count in 0usize..40) {
        let selectors = SelectorSet {
            article: ".post".into(),
            title: Some("h3".into()),
            link: "a".into(),
            ..Default::default()
        };
        let articles =
            pagefeed::feed::extract(&page_with_posts(count), &selectors, "https://example.com/")
                .unwrap();
        prop_assert_eq!(articles.len(), count);
        for (i, article) in articles.iter().enumerate() {
            prop_assert_eq!(&article.title, &format!("Post {i}"));
            prop_assert_eq!(&article.link, &format!("https://example.com/p/{i}"));
        }

        let rss = pagefeed::feed::serialize(&articles, &ChannelInfo::default());
        prop_assert_eq!(rss.matches("<item>").count(), count);
    }
}
