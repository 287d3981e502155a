//! Path and page patterns for Reddit links.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{is_plausible_post_id, PostReference};

static POST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/r/([A-Za-z0-9_]+)/comments/([^/?#]+)").unwrap());

static SHARE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/r/([A-Za-z0-9_]+)/s/([^/?#]+)").unwrap());

static BARE_COMMENTS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/comments/([^/?#]+)").unwrap());

static SUBREDDIT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/r/([A-Za-z0-9_]+)(?:/(?:hot|new|top|rising|best|controversial))?/?$").unwrap()
});

static SHORT_LINK_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([A-Za-z0-9]+)/?$").unwrap());

/// Patterns that locate the post link inside a share page, in priority order.
static PAGE_LINK_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("canonical", r#"(?i)canonical"\s+href="([^"]+)""#),
        ("meta refresh", r#"(?i)content="0;\s*URL=([^"]+)""#),
        ("comments href", r#"(?i)href="(/r/[^/"]+/comments/[^/"]+)"#),
        ("permalink", r#""permalink":"([^"]+)""#),
        ("post url", r#""url":"([^"]+/comments/[^"]+)""#),
        ("link tag", r#"(?i)<link[^>]+href="([^"]+/comments/[^"]+)""#),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Match a URL path against the supported link shapes, most specific first.
pub fn reference_from_path(path: &str) -> Option<PostReference> {
    if let Some(caps) = POST_PATH.captures(path) {
        return Some(PostReference::post(Some(caps[1].to_string()), &caps[2]));
    }
    if let Some(caps) = SHARE_PATH.captures(path) {
        return Some(PostReference::share(&caps[1], &caps[2]));
    }
    if let Some(caps) = BARE_COMMENTS_PATH.captures(path) {
        return Some(PostReference::post(None, &caps[1]));
    }
    if let Some(caps) = SUBREDDIT_PATH.captures(path) {
        return Some(PostReference::subreddit(&caps[1]));
    }
    None
}

/// Post id from a `redd.it/<id>` path.
pub fn short_link_post_id(path: &str) -> Option<String> {
    SHORT_LINK_PATH
        .captures(path)
        .map(|caps| caps[1].to_ascii_lowercase())
}

/// A post reference from a link found in a page or redirect. Only links that
/// point at a post with a plausible id are accepted.
pub fn post_from_link(link: &str) -> Option<PostReference> {
    let reference = reference_from_path(link)?;
    let post_id = reference.post_id.as_deref()?;
    is_plausible_post_id(post_id).then_some(reference)
}

/// Turn a matched link into an absolute, unescaped URL.
pub fn clean_link(raw: &str, base_url: &str) -> String {
    let unescaped = raw.replace("\\/", "/");
    if unescaped.starts_with("http") {
        unescaped
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), unescaped)
    }
}

/// Every candidate post link in `page`, in pattern priority order.
pub fn page_links<'a>(page: &'a str) -> impl Iterator<Item = (&'static str, &'a str)> + 'a {
    PAGE_LINK_PATTERNS.iter().flat_map(move |(name, pattern)| {
        pattern
            .captures_iter(page)
            .filter_map(|caps| caps.get(1))
            .map(move |m| (*name, m.as_str()))
    })
}
