use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::{debug, warn};

use crate::app::{HearsayError, Result};
use crate::config::HttpConfig;
use crate::fetcher::{FetchedPage, Fetcher};

const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();

        if let Some((name, value)) = config.client_header() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    default_headers.insert(name, value);
                }
                _ => warn!("Ignoring invalid client id header {:?}", name),
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<FetchedPage> {
        let mut header_map = HeaderMap::new();

        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                header_map.insert(name, value);
            }
        }

        debug!("GET {}", url);
        let response = self.client.get(url).headers(header_map).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(HearsayError::HttpStatus {
                url: url.to_string(),
                final_url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?.to_vec();

        Ok(FetchedPage { final_url, body })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    use super::*;
    use crate::resolver::{FollowRedirect, LinkResolver, ShareLink, ShareStrategy};

    type Requests = Arc<Mutex<Vec<String>>>;

    fn reply(status: &str, headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
            status,
            body.len(),
            headers,
            body
        )
    }

    fn routes(path: &str) -> String {
        match path {
            "/ok" => reply("200 OK", "", "hello"),
            "/missing" => reply("404 Not Found", "", ""),
            "/r/rust/s/AbCdEf1234" => reply(
                "301 Moved Permanently",
                "Location: /r/rust/comments/abc123/title/\r\n",
                "",
            ),
            "/moved" => reply("302 Found", "Location: /ok\r\n", ""),
            "/r/rust/comments/abc123/title/" => reply("403 Forbidden", "", "blocked"),
            _ => reply("404 Not Found", "", ""),
        }
    }

    /// Serve `routes` on a local port, answering after `delay`.
    async fn serve(delay: Duration) -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests: Requests = Arc::default();
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let seen = seen.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&request).into_owned();
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(request);

                    tokio::time::sleep(delay).await;
                    let _ = socket.write_all(routes(&path).as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (base, requests)
    }

    fn fetcher(timeout_secs: u64) -> HttpFetcher {
        let config = HttpConfig {
            timeout_secs,
            client_id: Some("hearsay-test".into()),
            ..HttpConfig::default()
        };
        HttpFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_client_headers() {
        let (base, requests) = serve(Duration::ZERO).await;
        let headers = [("Accept".to_string(), "application/json".to_string())];

        let page = fetcher(5).fetch(&format!("{}/ok", base), &headers).await.unwrap();

        assert_eq!(page.body, b"hello");
        let request = requests.lock().unwrap()[0].to_ascii_lowercase();
        assert!(request.contains("x-client-id: hearsay-test"));
        assert!(request.contains("accept: application/json"));
        assert!(request.contains("user-agent: hearsay/"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (base, _) = serve(Duration::ZERO).await;
        let url = format!("{}/missing", base);

        let err = fetcher(5).fetch(&url, &[]).await.unwrap_err();

        match err {
            HearsayError::HttpStatus {
                url: requested,
                final_url,
                status,
            } => {
                assert_eq!(status, 404);
                assert_eq!(requested, url);
                assert_eq!(final_url, url);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_final_url_follows_redirects() {
        let (base, _) = serve(Duration::ZERO).await;

        let page = fetcher(5).fetch(&format!("{}/moved", base), &[]).await.unwrap();

        assert_eq!(page.final_url, format!("{}/ok", base));
    }

    #[tokio::test]
    async fn test_share_redirect_to_forbidden_page() {
        let (base, _) = serve(Duration::ZERO).await;
        let share = ShareLink {
            url: Url::parse(&format!("{}/r/rust/s/AbCdEf1234", base)).unwrap(),
            subreddit: "rust".into(),
            share_id: "AbCdEf1234".into(),
        };

        let reference = FollowRedirect.resolve(&fetcher(5), &share).await.unwrap();

        assert_eq!(reference.post_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_timeout_fails_the_share_strategy() {
        let (base, _) = serve(Duration::from_secs(3)).await;
        let share = ShareLink {
            url: Url::parse(&format!("{}/r/rust/s/AbCdEf1234", base)).unwrap(),
            subreddit: "rust".into(),
            share_id: "AbCdEf1234".into(),
        };

        let err = fetcher(1).fetch(share.url.as_str(), &[]).await.unwrap_err();
        assert!(err.is_timeout());

        let resolver = LinkResolver::with_strategies(
            Arc::new(fetcher(1)),
            &base,
            vec![Box::new(FollowRedirect) as Box<dyn ShareStrategy>],
        );
        match resolver.resolve_share(&share).await.unwrap_err() {
            HearsayError::ResolutionFailure { attempted, .. } => {
                assert_eq!(attempted, vec!["follow-redirect".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
