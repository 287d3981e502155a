use serde::{Deserialize, Serialize};

/// How a relay returns the page it fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// The response body is the page itself
    Raw,
    /// The response is JSON with the page in its `contents` field
    JsonContents,
}

/// A CORS relay that fetches a page on our behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub name: String,

    /// Prepended to the percent-encoded target URL; empty fetches directly
    #[serde(default)]
    pub prefix: String,

    #[serde(default = "default_relay_mode")]
    pub mode: RelayMode,
}

fn default_relay_mode() -> RelayMode {
    RelayMode::Raw
}

impl RelayConfig {
    pub fn new(name: &str, prefix: &str, mode: RelayMode) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            mode,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.prefix.is_empty()
    }
}

/// Configuration for link resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Origin used for every API request (default: "https://www.reddit.com")
    pub base_url: String,

    /// Try reading the post link from the share link's redirect (default: true)
    pub follow_redirects: bool,

    /// Relays used to fetch share pages, tried in order
    pub relays: Vec<RelayConfig>,

    /// Subreddit listings searched for a share id, tried in order
    pub search_listings: Vec<String>,

    /// Posts requested per listing page (default: 100)
    pub listing_limit: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            follow_redirects: true,
            relays: vec![
                RelayConfig::new("direct", "", RelayMode::Raw),
                RelayConfig::new(
                    "allorigins raw",
                    "https://api.allorigins.win/raw?url=",
                    RelayMode::Raw,
                ),
                RelayConfig::new(
                    "allorigins get",
                    "https://api.allorigins.win/get?url=",
                    RelayMode::JsonContents,
                ),
                RelayConfig::new("corsproxy", "https://corsproxy.io/?", RelayMode::Raw),
            ],
            search_listings: vec!["new".to_string(), "hot".to_string()],
            listing_limit: 100,
        }
    }
}
