//! Source loading: local files or HTTP(S) downloads.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Downloads `url` with `client`, failing on non-success status codes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Whether `source` names a remote table rather than a local path.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads a source table from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client that counts calls and always fails, to prove local paths never hit it.
    #[derive(Default)]
    struct CountingClient(AtomicUsize);

    #[async_trait]
    impl HttpClient for CountingClient {
        async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.0.fetch_add(1, Ordering::SeqCst);
            // nothing listens on the discard port, so the request errors out
            *req.url_mut() = "http://127.0.0.1:9/".parse().unwrap();
            reqwest::Client::new().execute(req).await
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/energy.csv"));
        assert!(is_remote("http://example.org/energy.csv"));
        assert!(!is_remote("data/energy.csv"));
        assert!(!is_remote("httpdata.csv"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let path = env::temp_dir().join("energy_resampler_test_source.csv");
        std::fs::write(&path, "timestamp,coal\n").unwrap();

        let client = CountingClient::default();
        let bytes = load_source(&client, path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"timestamp,coal\n");
        assert_eq!(client.0.load(Ordering::SeqCst), 0);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let client = CountingClient::default();
        assert!(load_source(&client, "/nonexistent/energy.csv").await.is_err());
    }

    #[tokio::test]
    async fn test_remote_source_goes_through_client() {
        let client = CountingClient::default();
        let result = load_source(&client, "http://example.org/energy.csv").await;
        assert!(result.is_err());
        assert_eq!(client.0.load(Ordering::SeqCst), 1);
    }
}
