// src/fetch.rs
//! Proxy failover fetcher. Target sites refuse cross-origin requests, so
//! every fetch goes through one of an ordered list of CORS proxy endpoints.
//! A shared rotation cursor remembers which endpoint worked last; calls
//! start there and wrap around the list until one answers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

/// All proxies failed for one target URL. Recoverable: callers treat the
/// source as having produced zero records.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid target url: {0}")]
    InvalidUrl(String),
    #[error("all {attempts} proxy endpoints exhausted for {url}")]
    Exhausted { url: String, attempts: usize },
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the failover logic and the actual HTTP stack, so tests can
/// stub responses and count calls.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(TransportResponse { status, body })
    }
}

pub struct ProxyFetcher {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
    transport: Arc<dyn Transport>,
}

impl ProxyFetcher {
    pub fn new(endpoints: Vec<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
            transport,
        }
    }

    /// Index of the proxy that will be tried first on the next call.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Fetch the raw text body of `target_url` through the proxy chain.
    ///
    /// Endpoints are tried starting at the rotation cursor, wrapping around.
    /// The first 2xx response with a non-empty body wins and the cursor
    /// sticks to that endpoint for future calls. Cursor updates are
    /// last-writer-wins across concurrent aggregations; it only biases
    /// which proxy is tried first.
    pub async fn fetch_text(&self, target_url: &str) -> Result<String, FetchError> {
        if url::Url::parse(target_url).is_err() {
            return Err(FetchError::InvalidUrl(target_url.to_string()));
        }

        let n = self.endpoints.len();
        let start = self.cursor.load(Ordering::Relaxed) % n.max(1);
        let encoded: String = url::form_urlencoded::byte_serialize(target_url.as_bytes()).collect();

        for step in 0..n {
            let idx = (start + step) % n;
            let proxied = format!("{}{}", self.endpoints[idx], encoded);
            counter!("aggregate_fetch_attempts_total").increment(1);

            match self.transport.get(&proxied).await {
                Ok(resp) if (200..300).contains(&resp.status) && !resp.body.is_empty() => {
                    self.cursor.store(idx, Ordering::Relaxed);
                    return Ok(resp.body);
                }
                Ok(resp) => {
                    tracing::warn!(
                        target: "aggregate",
                        proxy = idx,
                        status = resp.status,
                        url = target_url,
                        "proxy returned unusable response"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        target: "aggregate",
                        proxy = idx,
                        url = target_url,
                        error = ?e,
                        "proxy request failed"
                    );
                }
            }
        }

        counter!("aggregate_fetch_exhausted_total").increment(1);
        Err(FetchError::Exhausted {
            url: target_url.to_string(),
            attempts: n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted transport: answers per-endpoint by substring match, records
    /// every requested URL.
    struct ScriptedTransport {
        calls: Mutex<Vec<String>>,
        ok_marker: Option<String>,
    }

    impl ScriptedTransport {
        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                ok_marker: None,
            }
        }
        fn ok_on(marker: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                ok_marker: Some(marker.to_string()),
            }
        }
        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            match &self.ok_marker {
                Some(m) if url.contains(m.as_str()) => Ok(TransportResponse {
                    status: 200,
                    body: "<rss></rss>".to_string(),
                }),
                _ => Ok(TransportResponse {
                    status: 503,
                    body: String::new(),
                }),
            }
        }
    }

    fn endpoints() -> Vec<String> {
        vec![
            "https://proxy-a.test/?".to_string(),
            "https://proxy-b.test/?".to_string(),
            "https://proxy-c.test/?".to_string(),
        ]
    }

    #[tokio::test]
    async fn exhaustion_is_an_error_not_a_panic() {
        let transport = Arc::new(ScriptedTransport::failing());
        let fetcher = ProxyFetcher::new(endpoints(), transport.clone());
        let err = fetcher.fetch_text("https://example.test/feed").await;
        match err {
            Err(FetchError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn cursor_sticks_to_the_endpoint_that_worked() {
        let transport = Arc::new(ScriptedTransport::ok_on("proxy-b"));
        let fetcher = ProxyFetcher::new(endpoints(), transport.clone());

        let body = fetcher.fetch_text("https://example.test/feed").await.unwrap();
        assert!(!body.is_empty());
        assert_eq!(fetcher.cursor(), 1);

        // Second call starts at proxy-b directly: exactly one more request.
        fetcher.fetch_text("https://example.test/feed").await.unwrap();
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn invalid_target_url_is_rejected_before_any_request() {
        let transport = Arc::new(ScriptedTransport::failing());
        let fetcher = ProxyFetcher::new(endpoints(), transport.clone());
        let err = fetcher.fetch_text("not a url").await;
        assert!(matches!(err, Err(FetchError::InvalidUrl(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn target_url_is_percent_encoded_into_the_proxy_template() {
        let transport = Arc::new(ScriptedTransport::ok_on("proxy-a"));
        let fetcher = ProxyFetcher::new(endpoints(), transport.clone());
        fetcher
            .fetch_text("https://example.test/scores?league=epl&day=1")
            .await
            .unwrap();
        let first = transport.calls.lock().unwrap()[0].clone();
        assert!(first.starts_with("https://proxy-a.test/?"));
        assert!(first.contains("https%3A%2F%2Fexample.test%2Fscores%3Fleague%3Depl%26day%3D1"));
    }
}
