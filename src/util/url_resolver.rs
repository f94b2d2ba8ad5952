use url::Url;

/// Resolves a potentially relative URL against a base URL.
///
/// Follows standard relative-reference resolution: an absolute `href` comes
/// back in its normalized form, a relative one is joined to `base_url`, and an
/// empty `href` resolves to the base itself.
///
/// Returns `None` if the base cannot be parsed or the join fails.
///
/// # Examples
///
/// ```
/// use pagefeed::util::resolve_url;
///
/// assert_eq!(
///     resolve_url("/feed.xml", "https://example.com/blog").as_deref(),
///     Some("https://example.com/feed.xml")
/// );
/// assert_eq!(
///     resolve_url("", "https://example.com/blog").as_deref(),
///     Some("https://example.com/blog")
/// );
/// ```
pub fn resolve_url(href: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    base.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve_url("https://other.com/feed", "https://example.com").as_deref(),
            Some("https://other.com/feed")
        );
    }

    #[test]
    fn test_resolve_root_relative_url() {
        assert_eq!(
            resolve_url("/feed.xml", "https://example.com/blog").as_deref(),
            Some("https://example.com/feed.xml")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve_url("feed.xml", "https://example.com/blog/").as_deref(),
            Some("https://example.com/blog/feed.xml")
        );
        assert_eq!(
            resolve_url("feed.xml", "https://example.com/blog").as_deref(),
            Some("https://example.com/feed.xml")
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve_url("//cdn.example.com/feed", "https://example.com").as_deref(),
            Some("https://cdn.example.com/feed")
        );
    }

    #[test]
    fn test_resolve_empty_href_is_base() {
        assert_eq!(
            resolve_url("", "https://example.com/blog?page=2").as_deref(),
            Some("https://example.com/blog?page=2")
        );
    }

    #[test]
    fn test_resolve_normalizes_dot_segments() {
        let resolved = resolve_url("../../etc/feed", "https://example.com/a/b/c").unwrap();
        assert_eq!(resolved, "https://example.com/etc/feed");
    }

    #[test]
    fn test_resolve_invalid_base_is_none() {
        assert_eq!(resolve_url("/feed.xml", "not a url"), None);
    }

    proptest! {
        #[test]
        fn prop_resolution_is_idempotent(
            segments in proptest::collection::vec("[a-z0-9_-]{1,8}", 0..4),
            leading_slash in any::<bool>(),
            query in proptest::option::of("[a-z]{1,5}=[a-z0-9]{1,5}"),
        ) {
            let mut href = segments.join("/");
            if leading_slash {
                href.insert(0, '/');
            }
            if let Some(q) = query {
                href.push('?');
                href.push_str(&q);
            }

            let resolved = resolve_url(&href, "https://example.com/blog/post").unwrap();
            prop_assert_eq!(resolve_url(&resolved, &resolved), Some(resolved.clone()));
        }
    }
}
