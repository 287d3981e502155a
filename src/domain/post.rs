/// Identifies a Reddit post, as far as the input link tells us.
///
/// A parsed link fills in whatever it carries: a post link gives
/// `post_id` (and usually `subreddit`), a share link gives `share_id`,
/// and a subreddit link gives only `subreddit`. Resolution turns every
/// shape into a reference with a `post_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostReference {
    pub subreddit: Option<String>,
    pub post_id: Option<String>,
    pub share_id: Option<String>,
}

impl PostReference {
    pub fn post(subreddit: Option<String>, post_id: impl Into<String>) -> Self {
        Self {
            subreddit,
            post_id: Some(post_id.into()),
            share_id: None,
        }
    }

    pub fn share(subreddit: impl Into<String>, share_id: impl Into<String>) -> Self {
        Self {
            subreddit: Some(subreddit.into()),
            post_id: None,
            share_id: Some(share_id.into()),
        }
    }

    pub fn subreddit(subreddit: impl Into<String>) -> Self {
        Self {
            subreddit: Some(subreddit.into()),
            post_id: None,
            share_id: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.post_id.is_some()
    }

    /// JSON endpoint for this post, or `None` until a post id is known.
    pub fn endpoint(&self, base_url: &str) -> Option<String> {
        let post_id = self.post_id.as_deref()?;
        let base = base_url.trim_end_matches('/');
        Some(match self.subreddit.as_deref() {
            Some(sub) => format!("{}/r/{}/comments/{}.json", base, sub, post_id),
            None => format!("{}/comments/{}.json", base, post_id),
        })
    }
}

/// A fully resolved content fetch: the endpoint plus the headers it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub reference: PostReference,
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
}

/// Post ids are lowercase base-36 strings.
pub fn is_plausible_post_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 12
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}
