//! Upstream HTTP client.

use std::time::Duration;

use axum::body::Bytes;
use futures::future::BoxFuture;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::config::ProxyConfig;

use super::error::FetchError;

/// Maximum characters of an error body kept in [`FetchError::Status`].
const ERROR_BODY_EXCERPT: usize = 200;

/// Anything that can fetch raw upstream bytes for a URL.
pub trait FareFetcher: Send + Sync {
    /// GET `url` and return the body untouched.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, FetchError>>;
}

/// Fare search client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    timeout_secs: u64,
}

impl UpstreamClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            timeout_secs: config.timeout_secs,
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.http.get(url).send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body)
                    .chars()
                    .take(ERROR_BODY_EXCERPT)
                    .collect(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(
            len = body.len(),
            head = %body[..body.len().min(100)].escape_ascii(),
            "received upstream response"
        );

        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            FetchError::Http(err)
        }
    }
}

impl FareFetcher for UpstreamClient {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, FetchError>> {
        Box::pin(self.get_bytes(url))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::Router;
    use axum::extract::RawQuery;
    use axum::http::{StatusCode, header};
    use axum::response::{IntoResponse, Redirect};
    use axum::routing::get;

    use super::*;

    /// Serve `router` on an ephemeral port and return its address.
    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client(timeout_secs: u64) -> UpstreamClient {
        UpstreamClient::new(&ProxyConfig::default().with_timeout(timeout_secs)).unwrap()
    }

    #[test]
    fn client_creation() {
        assert!(UpstreamClient::new(&ProxyConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn returns_raw_bytes_ignoring_charset() {
        let router = Router::new().route(
            "/search",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json; charset=Shift_JIS")],
                    &b"{\"Name\":\"\x93\x8c\x8b\x9e\"}"[..],
                )
            }),
        );
        let addr = serve(router).await;

        let body = client(5)
            .fetch(&format!("http://{addr}/search"))
            .await
            .unwrap();

        assert_eq!(&body[..], b"{\"Name\":\"\x93\x8c\x8b\x9e\"}");
    }

    #[tokio::test]
    async fn follows_redirects_and_keeps_query() {
        let router = Router::new()
            .route(
                "/old",
                get(|RawQuery(q): RawQuery| async move {
                    Redirect::temporary(&format!("/new?{}", q.unwrap_or_default()))
                }),
            )
            .route(
                "/new",
                get(|RawQuery(q): RawQuery| async move { q.unwrap_or_default() }),
            );
        let addr = serve(router).await;

        let body = client(5)
            .fetch(&format!("http://{addr}/old?viaList=%E6%9D%B1%E4%BA%AC:A"))
            .await
            .unwrap();

        assert_eq!(&body[..], b"viaList=%E6%9D%B1%E4%BA%AC:A");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            "/search",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down").into_response() }),
        );
        let addr = serve(router).await;

        let err = client(5)
            .fetch(&format!("http://{addr}/search"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { status: 502, ref body } if body == "upstream down"
        ));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/search",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let addr = serve(router).await;

        let err = client(1)
            .fetch(&format!("http://{addr}/search"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { secs: 1 }));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(5)
            .fetch(&format!("http://{addr}/search"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Http(_)));
    }
}
