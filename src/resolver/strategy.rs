use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::app::{HearsayError, Result};
use crate::domain::{is_plausible_post_id, PostReference};
use crate::fetcher::Fetcher;
use crate::normalizer::{Normalizer, ThingData};
use crate::resolver::config::{RelayConfig, RelayMode};
use crate::resolver::patterns::{clean_link, page_links, post_from_link};

/// A short share link waiting to be resolved.
#[derive(Debug, Clone)]
pub struct ShareLink {
    pub url: Url,
    pub subreddit: String,
    pub share_id: String,
}

impl ShareLink {
    /// Fill in the share link's subreddit when the found link had none.
    fn complete(&self, mut reference: PostReference) -> PostReference {
        if reference.subreddit.is_none() {
            reference.subreddit = Some(self.subreddit.clone());
        }
        reference
    }
}

/// One way of turning a share link into a post reference.
#[async_trait]
pub trait ShareStrategy: Send + Sync {
    /// Name reported when every strategy failed
    fn name(&self) -> String;

    async fn resolve(&self, fetcher: &dyn Fetcher, share: &ShareLink) -> Result<PostReference>;
}

fn not_found(strategy: &str, detail: impl std::fmt::Display) -> HearsayError {
    HearsayError::NoMatch(format!("{}: {}", strategy, detail))
}

/// Reads the post link from wherever the share link redirects to.
pub struct FollowRedirect;

#[async_trait]
impl ShareStrategy for FollowRedirect {
    fn name(&self) -> String {
        "follow-redirect".to_string()
    }

    async fn resolve(&self, fetcher: &dyn Fetcher, share: &ShareLink) -> Result<PostReference> {
        // the post page itself may refuse us; its URL is all that is needed
        let final_url = match fetcher.fetch(share.url.as_str(), &[]).await {
            Ok(page) => page.final_url,
            Err(HearsayError::HttpStatus {
                final_url, status, ..
            }) => {
                debug!("Share link redirect ended with status {}", status);
                final_url
            }
            Err(e) => return Err(e),
        };
        debug!("Share link redirected to {}", final_url);

        post_from_link(&final_url)
            .map(|reference| share.complete(reference))
            .ok_or_else(|| not_found("follow-redirect", "redirect did not land on a post"))
    }
}

#[derive(Deserialize)]
struct RelayEnvelope {
    contents: Option<String>,
}

/// Fetches the share page through a relay and scans it for the post link.
pub struct PageScan {
    relay: RelayConfig,
    base_url: String,
}

impl PageScan {
    pub fn new(relay: RelayConfig, base_url: impl Into<String>) -> Self {
        Self {
            relay,
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, target: &Url) -> String {
        if self.relay.is_direct() {
            return target.to_string();
        }
        let encoded: String = byte_serialize(target.as_str().as_bytes()).collect();
        format!("{}{}", self.relay.prefix, encoded)
    }
}

#[async_trait]
impl ShareStrategy for PageScan {
    fn name(&self) -> String {
        format!("page-scan ({})", self.relay.name)
    }

    async fn resolve(&self, fetcher: &dyn Fetcher, share: &ShareLink) -> Result<PostReference> {
        let page = fetcher.fetch(&self.request_url(&share.url), &[]).await?;

        let html = match self.relay.mode {
            RelayMode::Raw => page.text(),
            RelayMode::JsonContents => serde_json::from_slice::<RelayEnvelope>(&page.body)
                .ok()
                .and_then(|envelope| envelope.contents)
                .ok_or_else(|| not_found(&self.name(), "relay response had no contents"))?,
        };
        debug!("Got {} bytes from {}", html.len(), self.relay.name);

        for (pattern, link) in page_links(&html) {
            let url = clean_link(link, &self.base_url);
            if let Some(reference) = post_from_link(&url) {
                debug!("Pattern {:?} found {}", pattern, url);
                return Ok(share.complete(reference));
            }
        }

        Err(not_found(&self.name(), "no post link in page"))
    }
}

/// Looks for the share id among a subreddit's recent posts.
pub struct ListingSearch {
    listings: Vec<String>,
    base_url: String,
    limit: u32,
    normalizer: Normalizer,
}

impl ListingSearch {
    pub fn new(listings: Vec<String>, base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            listings,
            base_url: base_url.into(),
            limit,
            normalizer: Normalizer::new(),
        }
    }

    fn matches(post: &ThingData, share_id: &str) -> bool {
        let share_path = format!("/s/{}", share_id);
        post.id.as_deref().is_some_and(|id| id == share_id)
            || post
                .name
                .as_deref()
                .is_some_and(|name| name.strip_prefix("t3_") == Some(share_id))
            || post
                .permalink
                .as_deref()
                .is_some_and(|p| p.contains(&share_path))
            || post.url.as_deref().is_some_and(|u| u.contains(share_id))
    }
}

#[async_trait]
impl ShareStrategy for ListingSearch {
    fn name(&self) -> String {
        format!("listing-search ({})", self.listings.join(", "))
    }

    async fn resolve(&self, fetcher: &dyn Fetcher, share: &ShareLink) -> Result<PostReference> {
        let headers = [("Accept".to_string(), "application/json".to_string())];

        for listing in &self.listings {
            let url = format!(
                "{}/r/{}/{}.json?limit={}",
                self.base_url.trim_end_matches('/'),
                share.subreddit,
                listing,
                self.limit
            );

            let page = match fetcher.fetch(&url, &headers).await {
                Ok(page) => page,
                Err(e) => {
                    debug!("Listing {} unavailable: {}", listing, e);
                    continue;
                }
            };

            let posts = match self.normalizer.posts(&page.body) {
                Ok(posts) => posts,
                Err(e) => {
                    debug!("Listing {} unreadable: {}", listing, e);
                    continue;
                }
            };

            let found = posts
                .into_iter()
                .find(|post| Self::matches(post, &share.share_id))
                .and_then(|post| post.id)
                .filter(|id| is_plausible_post_id(id));

            if let Some(post_id) = found {
                return Ok(PostReference::post(Some(share.subreddit.clone()), post_id));
            }
        }

        Err(not_found(&self.name(), "share id not found in listings"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StaticFetcher;

    fn share() -> ShareLink {
        ShareLink {
            url: Url::parse("https://www.reddit.com/r/rust/s/AbCdEf1234").unwrap(),
            subreddit: "rust".into(),
            share_id: "AbCdEf1234".into(),
        }
    }

    #[test]
    fn test_relay_request_url() {
        let scan = PageScan::new(
            RelayConfig::new("corsproxy", "https://corsproxy.io/?", RelayMode::Raw),
            "https://www.reddit.com",
        );
        assert_eq!(
            scan.request_url(&share().url),
            "https://corsproxy.io/?https%3A%2F%2Fwww.reddit.com%2Fr%2Frust%2Fs%2FAbCdEf1234"
        );
    }

    #[test]
    fn test_direct_request_url() {
        let scan = PageScan::new(
            RelayConfig::new("direct", "", RelayMode::Raw),
            "https://www.reddit.com",
        );
        assert_eq!(
            scan.request_url(&share().url),
            "https://www.reddit.com/r/rust/s/AbCdEf1234"
        );
    }

    #[test]
    fn test_listing_match() {
        let post = ThingData {
            id: Some("abc123".into()),
            permalink: Some("/r/rust/comments/abc123/title/".into()),
            ..ThingData::default()
        };
        assert!(ListingSearch::matches(&post, "abc123"));
        assert!(!ListingSearch::matches(&post, "AbCdEf1234"));

        let named = ThingData {
            name: Some("t3_AbCdEf1234".into()),
            ..ThingData::default()
        };
        assert!(ListingSearch::matches(&named, "AbCdEf1234"));
    }

    #[tokio::test]
    async fn test_redirect_to_refused_post_page() {
        let fetcher = StaticFetcher::new().with_status(
            "https://www.reddit.com/r/rust/s/AbCdEf1234",
            "https://www.reddit.com/r/rust/comments/abc123/title/",
            403,
        );

        let reference = FollowRedirect.resolve(&fetcher, &share()).await.unwrap();

        assert_eq!(reference.post_id.as_deref(), Some("abc123"));
        assert_eq!(reference.subreddit.as_deref(), Some("rust"));
    }

    #[tokio::test]
    async fn test_refused_without_redirect_is_no_match() {
        let fetcher = StaticFetcher::new();

        let err = FollowRedirect.resolve(&fetcher, &share()).await.unwrap_err();

        assert!(matches!(err, HearsayError::NoMatch(_)));
    }

    #[tokio::test]
    async fn test_listing_search_skips_unreadable_listing() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://www.reddit.com/r/rust/new.json?limit=100",
                "<html>rate limited</html>",
            )
            .with_page(
                "https://www.reddit.com/r/rust/hot.json?limit=100",
                r#"{"kind": "Listing", "data": {"children": [
                    {"kind": "t3", "data": {"id": "abc123", "name": "t3_AbCdEf1234", "title": "Match"}}
                ]}}"#,
            );
        let search = ListingSearch::new(
            vec!["new".into(), "hot".into()],
            "https://www.reddit.com",
            100,
        );

        let reference = search.resolve(&fetcher, &share()).await.unwrap();

        assert_eq!(reference.post_id.as_deref(), Some("abc123"));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[test]
    fn test_complete_fills_subreddit() {
        let reference = share().complete(PostReference::post(None, "abc123"));
        assert_eq!(reference.subreddit.as_deref(), Some("rust"));

        let reference = share().complete(PostReference::post(Some("other".into()), "abc123"));
        assert_eq!(reference.subreddit.as_deref(), Some("other"));
    }
}
