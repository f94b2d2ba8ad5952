//! Generator requests and their query-string form.
//!
//! A [`FeedForm`] holds raw, possibly incomplete input exactly as a user
//! typed it. It can be rendered one way into a query string
//! ([`FeedForm::to_query`]) and read back explicitly
//! ([`FeedForm::from_query`]). Validation turns a form into a
//! [`FeedRequest`], the only shape the generator pipeline accepts.
use crate::feed::{ChannelInfo, SelectorSet};
use thiserror::Error;
use url::form_urlencoded;

pub const PARAM_URL: &str = "url";
pub const PARAM_ARTICLE_SELECTOR: &str = "articleSelector";
pub const PARAM_TITLE_SELECTOR: &str = "titleSelector";
pub const PARAM_LINK_SELECTOR: &str = "linkSelector";
pub const PARAM_DESCRIPTION_SELECTOR: &str = "descriptionSelector";
pub const PARAM_PUB_DATE_SELECTOR: &str = "pubDateSelector";
pub const PARAM_CHANNEL_TITLE: &str = "channelTitle";
pub const PARAM_CHANNEL_LINK: &str = "channelLink";
pub const PARAM_CHANNEL_DESCRIPTION: &str = "channelDescription";

/// Errors for requests missing required input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter: {0}")]
    MissingField(&'static str),
}

/// Raw generator input, one optional value per form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedForm {
    pub url: Option<String>,
    pub article_selector: Option<String>,
    pub title_selector: Option<String>,
    pub link_selector: Option<String>,
    pub description_selector: Option<String>,
    pub pub_date_selector: Option<String>,
    pub channel_title: Option<String>,
    pub channel_link: Option<String>,
    pub channel_description: Option<String>,
}

impl FeedForm {
    fn fields(&self) -> [(&'static str, Option<&str>); 9] {
        [
            (PARAM_URL, self.url.as_deref()),
            (PARAM_ARTICLE_SELECTOR, self.article_selector.as_deref()),
            (PARAM_TITLE_SELECTOR, self.title_selector.as_deref()),
            (PARAM_LINK_SELECTOR, self.link_selector.as_deref()),
            (PARAM_DESCRIPTION_SELECTOR, self.description_selector.as_deref()),
            (PARAM_PUB_DATE_SELECTOR, self.pub_date_selector.as_deref()),
            (PARAM_CHANNEL_TITLE, self.channel_title.as_deref()),
            (PARAM_CHANNEL_LINK, self.channel_link.as_deref()),
            (PARAM_CHANNEL_DESCRIPTION, self.channel_description.as_deref()),
        ]
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        let field = match name {
            PARAM_URL => &mut self.url,
            PARAM_ARTICLE_SELECTOR => &mut self.article_selector,
            PARAM_TITLE_SELECTOR => &mut self.title_selector,
            PARAM_LINK_SELECTOR => &mut self.link_selector,
            PARAM_DESCRIPTION_SELECTOR => &mut self.description_selector,
            PARAM_PUB_DATE_SELECTOR => &mut self.pub_date_selector,
            PARAM_CHANNEL_TITLE => &mut self.channel_title,
            PARAM_CHANNEL_LINK => &mut self.channel_link,
            PARAM_CHANNEL_DESCRIPTION => &mut self.channel_description,
            _ => return None,
        };
        Some(field)
    }

    /// Renders the form as a URL query string (without the leading `?`).
    ///
    /// Parameters appear in a fixed order; blank fields are left out.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagefeed::request::FeedForm;
    ///
    /// let form = FeedForm {
    ///     url: Some("https://example.com/blog".into()),
    ///     article_selector: Some("div.post".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     form.to_query(),
    ///     "url=https%3A%2F%2Fexample.com%2Fblog&articleSelector=div.post"
    /// );
    /// ```
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.fields() {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }

    /// Reads a form back from a query string, with or without a leading `?`.
    ///
    /// Unknown parameters are ignored. When a parameter repeats, the first
    /// occurrence wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut form = FeedForm::default();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match form.field_mut(&name) {
                Some(slot) if slot.is_none() => *slot = Some(value.into_owned()),
                Some(_) => {}
                None => tracing::debug!(param = %name, "Ignoring unknown query parameter"),
            }
        }
        form
    }

    /// Checks required fields and builds a [`FeedRequest`].
    ///
    /// `url`, `articleSelector`, `linkSelector` and `channelTitle` are
    /// required; blank values count as missing. A missing channel link
    /// defaults to the page URL and a missing channel description to an
    /// empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] naming the first missing
    /// parameter.
    pub fn validate(&self) -> Result<FeedRequest, ValidationError> {
        let url = required(PARAM_URL, &self.url)?;
        let article = required(PARAM_ARTICLE_SELECTOR, &self.article_selector)?;
        let link = required(PARAM_LINK_SELECTOR, &self.link_selector)?;
        let channel_title = required(PARAM_CHANNEL_TITLE, &self.channel_title)?;

        Ok(FeedRequest {
            selectors: SelectorSet {
                article,
                title: optional(&self.title_selector),
                link,
                description: optional(&self.description_selector),
                pub_date: optional(&self.pub_date_selector),
            },
            channel: ChannelInfo {
                title: channel_title,
                link: optional(&self.channel_link).unwrap_or_else(|| url.clone()),
                description: optional(&self.channel_description).unwrap_or_default(),
            },
            url,
        })
    }
}

fn required(name: &'static str, value: &Option<String>) -> Result<String, ValidationError> {
    optional(value).ok_or(ValidationError::MissingField(name))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// A validated feed-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Address of the page to scrape
    pub url: String,
    pub selectors: SelectorSet,
    pub channel: ChannelInfo,
}

impl FeedRequest {
    /// Parses and validates a query string in one step.
    pub fn from_query(query: &str) -> Result<Self, ValidationError> {
        FeedForm::from_query(query).validate()
    }

    /// Renders the request as a query string that [`FeedRequest::from_query`] accepts.
    pub fn to_query(&self) -> String {
        FeedForm::from(self).to_query()
    }
}

impl From<&FeedRequest> for FeedForm {
    fn from(request: &FeedRequest) -> Self {
        FeedForm {
            url: Some(request.url.clone()),
            article_selector: Some(request.selectors.article.clone()),
            title_selector: request.selectors.title.clone(),
            link_selector: Some(request.selectors.link.clone()),
            description_selector: request.selectors.description.clone(),
            pub_date_selector: request.selectors.pub_date.clone(),
            channel_title: Some(request.channel.title.clone()),
            channel_link: Some(request.channel.link.clone()),
            channel_description: Some(request.channel.description.clone()),
        }
    }
}
