//! Network fetch.
//!
//! A single GET per call; the body is returned as text.  Non-2xx responses
//! are not errors, their body is returned like any other.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::HostConfig;
use crate::error::{OpError, OpResult};
use crate::marshal;

/// Host implementation of `fetch`.
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &HostConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();

        Self {
            client,
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub async fn fetch(&self, args: Vec<Value>) -> OpResult<Value> {
        let raw: String = marshal::arg(&args, 0, "url")?;
        let url = parse_url(&raw)?;
        debug!(url = %url, "fetching");

        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(&raw, e))?;

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(self.too_large(&raw));
            }
        }

        let status = response.status().as_u16();
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(&raw, e))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.too_large(&raw));
            }
            body.extend_from_slice(&chunk);
        }
        debug!(status, bytes = body.len(), "fetch complete");

        Ok(Value::String(String::from_utf8_lossy(&body).into_owned()))
    }

    fn transport_error(&self, raw: &str, err: reqwest::Error) -> OpError {
        if err.is_timeout() {
            OpError::network(format!(
                "request to `{raw}` timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            OpError::network(format!("request to `{raw}` failed: {err}"))
        }
    }

    fn too_large(&self, raw: &str) -> OpError {
        OpError::network(format!(
            "response from `{raw}` exceeds {} bytes",
            self.max_body_bytes
        ))
    }
}

/// Parse and vet a script-supplied URL.
fn parse_url(raw: &str) -> OpResult<url::Url> {
    let url = url::Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OpError::invalid_url(format!(
            "unsupported scheme `{other}` in `{raw}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parse_url_accepts_http_and_https() {
        assert!(parse_url("http://localhost:8080/x").is_ok());
        assert!(parse_url("https://deno.land/std@0.177.0/examples/welcome.ts").is_ok());
    }

    #[test]
    fn parse_url_rejects_other_schemes() {
        let err = parse_url("file:///etc/passwd").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUrl);
        assert!(err.message.contains("unsupported scheme `file`"));
    }

    #[tokio::test]
    async fn malformed_url_is_invalid_url() {
        let fetcher = Fetcher::new(&HostConfig::default());
        let err = fetcher.fetch(vec![json!("not a url")]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUrl);
    }

    #[tokio::test]
    async fn refused_connection_is_network() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = Fetcher::new(&HostConfig::default().with_fetch_timeout_secs(5));
        let err = fetcher
            .fetch(vec![json!(format!("http://127.0.0.1:{port}/"))])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
    }
}
