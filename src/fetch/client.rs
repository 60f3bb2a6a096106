//! HTTP client used to download source files.
//!
//! # Responsibilities
//! - Build one reqwest client from `FetchConfig`
//! - Issue a single GET per source with the configured deadline
//! - Classify non-200 answers as failures before any body is read

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::config::FetchConfig;
use crate::fetch::types::FetchError;

/// Immutable download client shared by all requests.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, timeout })
    }

    /// GET `url` once. Only a 200 response is returned; its body is left unread.
    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::debug!(
                        url = %url,
                        timeout_secs = self.timeout.as_secs(),
                        "Source did not answer in time"
                    );
                }
                FetchError::Request(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(url = %url, status = %status, "Source answered with non-200 status");
            return Err(FetchError::Status { status });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/file", addr)
    }

    #[tokio::test]
    async fn silent_source_hits_configured_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(10)).await;
                drop(socket);
            }
        });

        let config = FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        let started = std::time::Instant::now();
        let err = fetcher.get(&format!("http://{}/slow", addr)).await.unwrap_err();

        assert!(matches!(err, FetchError::Request(ref e) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn ok_response_is_returned() {
        let url = serve_once("200 OK", "hello").await;
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let response = fetcher.get(&url).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn non_200_is_a_failure() {
        let url = serve_once("404 Not Found", "missing").await;
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.get(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.get(&format!("http://{}/gone", addr)).await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
