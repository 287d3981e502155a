pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the response was finally served from, after redirects
    pub final_url: String,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// GET-only HTTP seam. Non-success statuses are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<FetchedPage>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::app::HearsayError;

    /// Serves canned pages keyed by URL and records every request.
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, FetchedPage>,
        /// URL -> (final URL, status) for requests that end in an error status
        statuses: HashMap<String, (String, u16)>,
        pub requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                FetchedPage {
                    final_url: url.to_string(),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        pub fn with_redirect(mut self, url: &str, final_url: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                FetchedPage {
                    final_url: final_url.to_string(),
                    body: Vec::new(),
                },
            );
            self
        }

        pub fn with_status(mut self, url: &str, final_url: &str, status: u16) -> Self {
            self.statuses
                .insert(url.to_string(), (final_url.to_string(), status));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> Result<FetchedPage> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some((final_url, status)) = self.statuses.get(url) {
                return Err(HearsayError::HttpStatus {
                    url: url.to_string(),
                    final_url: final_url.clone(),
                    status: *status,
                });
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| HearsayError::HttpStatus {
                    url: url.to_string(),
                    final_url: url.to_string(),
                    status: 404,
                })
        }
    }
}
