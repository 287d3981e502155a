use serde::{Deserialize, Serialize};

pub const CLIENT_ID_ENV: &str = "HEARSAY_CLIENT_ID";
pub const USER_AGENT_ENV: &str = "HEARSAY_USER_AGENT";

/// Outbound HTTP settings shared by every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent sent with every request (default: "hearsay/0.1.0")
    pub user_agent: String,

    /// Per-request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// Name of the client identification header (default: "X-Client-Id")
    pub client_id_header: String,

    /// Value of the client identification header; no header when unset
    pub client_id: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("hearsay/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
            client_id_header: "X-Client-Id".to_string(),
            client_id: None,
        }
    }
}

impl HttpConfig {
    /// The client identification header, if one is configured.
    pub fn client_header(&self) -> Option<(&str, &str)> {
        let value = self.client_id.as_deref().filter(|v| !v.is_empty())?;
        if self.client_id_header.is_empty() {
            return None;
        }
        Some((self.client_id_header.as_str(), value))
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = lookup(CLIENT_ID_ENV).filter(|v| !v.is_empty()) {
            self.client_id = Some(client_id);
        }
        if let Some(user_agent) = lookup(USER_AGENT_ENV).filter(|v| !v.is_empty()) {
            self.user_agent = user_agent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_client_header_by_default() {
        assert_eq!(HttpConfig::default().client_header(), None);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = HttpConfig::default();
        config.apply_env(|key| match key {
            CLIENT_ID_ENV => Some("my-app".to_string()),
            _ => None,
        });

        assert_eq!(config.client_header(), Some(("X-Client-Id", "my-app")));
        assert!(config.user_agent.starts_with("hearsay/"));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = HttpConfig {
            client_id: Some("from-file".into()),
            ..HttpConfig::default()
        };
        config.apply_env(|_| Some(String::new()));

        assert_eq!(config.client_id.as_deref(), Some("from-file"));
    }
}
