//! Link resolution: free-form input → canonical JSON endpoint.
//!
//! ```text
//! input → normalize_input → parse_link → PostReference
//!                                          ├─ post      → endpoint
//!                                          ├─ share     → ShareStrategy chain → endpoint
//!                                          └─ subreddit → hot listing → endpoint
//! ```

mod config;
pub mod patterns;
mod strategy;

pub use config::{RelayConfig, RelayMode, ResolverConfig};
pub use strategy::{FollowRedirect, ListingSearch, PageScan, ShareLink, ShareStrategy};

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::app::{HearsayError, Result};
use crate::domain::{is_plausible_post_id, ContentRequest, PostReference};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

const TOP_POST_LIMIT: u32 = 10;

/// Trim the input, force HTTPS and check it points at Reddit.
pub fn normalize_input(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(HearsayError::InvalidInput("Please enter a Reddit URL.".into()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("https://") {
        trimmed.to_string()
    } else if lower.starts_with("http://") {
        format!("https://{}", &trimmed["http://".len()..])
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| HearsayError::InvalidInput(format!("Invalid Reddit URL {}: {}", trimmed, e)))?;

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let is_reddit = host == "reddit.com" || host.ends_with(".reddit.com") || host == "redd.it";
    if !is_reddit {
        return Err(HearsayError::InvalidInput(format!(
            "Invalid Reddit URL {}: not a reddit.com link",
            trimmed
        )));
    }

    Ok(url)
}

/// Work out which post (or share link, or subreddit) a URL refers to.
pub fn parse_link(url: &Url) -> Result<PostReference> {
    let path = url.path();

    if url.host_str().is_some_and(|h| h.eq_ignore_ascii_case("redd.it")) {
        if let Some(post_id) = patterns::short_link_post_id(path) {
            return Ok(PostReference::post(None, post_id));
        }
    }

    patterns::reference_from_path(path).ok_or_else(|| {
        HearsayError::InvalidInput(format!(
            "Invalid Reddit URL {}: use a post, share or subreddit link",
            url
        ))
    })
}

pub struct LinkResolver {
    fetcher: Arc<dyn Fetcher>,
    strategies: Vec<Box<dyn ShareStrategy>>,
    base_url: String,
    normalizer: Normalizer,
}

impl LinkResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &ResolverConfig) -> Self {
        let mut strategies: Vec<Box<dyn ShareStrategy>> = Vec::new();

        if config.follow_redirects {
            strategies.push(Box::new(FollowRedirect));
        }
        for relay in &config.relays {
            strategies.push(Box::new(PageScan::new(relay.clone(), &config.base_url)));
        }
        if !config.search_listings.is_empty() {
            strategies.push(Box::new(ListingSearch::new(
                config.search_listings.clone(),
                &config.base_url,
                config.listing_limit,
            )));
        }

        Self::with_strategies(fetcher, &config.base_url, strategies)
    }

    pub fn with_strategies(
        fetcher: Arc<dyn Fetcher>,
        base_url: &str,
        strategies: Vec<Box<dyn ShareStrategy>>,
    ) -> Self {
        Self {
            fetcher,
            strategies,
            base_url: base_url.trim_end_matches('/').to_string(),
            normalizer: Normalizer::new(),
        }
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve raw user input into the request for the post's JSON.
    pub async fn resolve(&self, raw: &str) -> Result<ContentRequest> {
        let url = normalize_input(raw)?;
        let parsed = parse_link(&url)?;
        debug!("Parsed {} as {:?}", url, parsed);

        let reference = match parsed {
            resolved if resolved.is_resolved() => resolved,
            PostReference {
                share_id: Some(share_id),
                subreddit: Some(subreddit),
                ..
            } => {
                let share = ShareLink {
                    url: url.clone(),
                    subreddit,
                    share_id,
                };
                self.resolve_share(&share).await?
            }
            PostReference {
                subreddit: Some(subreddit),
                ..
            } => self.top_post(&subreddit).await?,
            _ => {
                return Err(HearsayError::InvalidInput(format!(
                    "Invalid Reddit URL {}: no post found in link",
                    url
                )))
            }
        };

        let request = self.request_for(reference)?;
        info!("Resolved {} to {}", url, request.endpoint);
        Ok(request)
    }

    /// Run the share strategies in order; the first plausible post wins.
    pub async fn resolve_share(&self, share: &ShareLink) -> Result<PostReference> {
        let mut attempted = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let name = strategy.name();
            debug!("Trying {} for {}", name, share.url);

            match strategy.resolve(self.fetcher.as_ref(), share).await {
                Ok(reference) if reference.post_id.as_deref().is_some_and(is_plausible_post_id) => {
                    debug!("{} resolved {} to {:?}", name, share.share_id, reference.post_id);
                    return Ok(reference);
                }
                Ok(reference) => {
                    debug!("{} returned implausible post id {:?}", name, reference.post_id);
                }
                Err(e) if e.is_timeout() => debug!("{} timed out", name),
                Err(e) => debug!("{} failed: {}", name, e),
            }

            attempted.push(name);
        }

        Err(HearsayError::ResolutionFailure {
            url: share.url.to_string(),
            attempted,
        })
    }

    /// The first non-stickied post in a subreddit's hot listing.
    async fn top_post(&self, subreddit: &str) -> Result<PostReference> {
        let url = format!(
            "{}/r/{}/hot.json?limit={}",
            self.base_url, subreddit, TOP_POST_LIMIT
        );
        let page = self.fetcher.fetch(&url, &json_headers()).await?;

        self.normalizer
            .posts(&page.body)?
            .into_iter()
            .filter(|post| !post.stickied)
            .filter_map(|post| post.id)
            .find(|id| is_plausible_post_id(id))
            .map(|post_id| PostReference::post(Some(subreddit.to_string()), post_id))
            .ok_or_else(|| HearsayError::ResolutionFailure {
                url,
                attempted: vec!["hot listing".to_string()],
            })
    }

    fn request_for(&self, reference: PostReference) -> Result<ContentRequest> {
        let endpoint = reference.endpoint(&self.base_url).ok_or_else(|| {
            HearsayError::InvalidInput("Could not determine the post id".into())
        })?;

        Ok(ContentRequest {
            reference,
            endpoint,
            headers: json_headers(),
        })
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("Accept".to_string(), "application/json".to_string())]
}
