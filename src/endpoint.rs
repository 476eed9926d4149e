//! Client for the service's `/process-audio` endpoint.
//!
//! One request asks the service to record from its microphone and analyse the take.
//! The request has no body; the answer is a [`RequestOutcome`] JSON object.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::outcome::RequestOutcome;

/// Something that can run one capture-and-analysis cycle.
#[async_trait]
pub trait AnalysisEndpoint: Send + Sync {
    /// Issues exactly one request and returns the parsed outcome.
    ///
    /// # Errors
    /// - If the request cannot be sent or completed
    /// - If the response body is not the expected JSON structure
    async fn process_audio(&self) -> anyhow::Result<RequestOutcome>;
}

/// `AnalysisEndpoint` backed by an HTTP POST.
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    /// Builds an endpoint for the configured server.
    ///
    /// # Errors
    /// - If the HTTP client cannot be constructed
    pub fn new(server: &ServerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(server.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            url: server.endpoint_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisEndpoint for HttpEndpoint {
    async fn process_audio(&self) -> anyhow::Result<RequestOutcome> {
        tracing::debug!("Analysis request:\n  URL: {}\n  Method: POST", self.url);

        let response = match self.client.post(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    format!("Failed to connect to {}", self.url)
                } else if e.is_timeout() {
                    "Request timed out".to_string()
                } else {
                    format!("Network error: {e}")
                };
                return Err(anyhow::anyhow!(error_msg));
            }
        };

        // The service reports its own failures inside the body, so the status is only logged.
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Analysis service answered with status {status}");
        }

        let outcome: RequestOutcome = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse response: {e}"))?;

        tracing::debug!("Analysis response: {:#?}", outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response and returns the request head it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn endpoint_for(url: String) -> HttpEndpoint {
        let server = ServerConfig {
            url,
            endpoint: "/process-audio".to_string(),
            timeout_secs: 5,
        };
        HttpEndpoint::new(&server).unwrap()
    }

    #[tokio::test]
    async fn test_posts_without_body() {
        let (url, server) = serve_once("200 OK", r#"{"success": true, "tone_intervals": [1, 2]}"#).await;
        let endpoint = endpoint_for(url);

        let outcome = endpoint.process_audio().await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.tone_intervals.len(), 2);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /process-audio HTTP/1.1"));
        let lower = request.to_ascii_lowercase();
        assert!(!lower.contains("content-length") || lower.contains("content-length: 0"));
    }

    #[tokio::test]
    async fn test_error_body_is_parsed_regardless_of_status() {
        let (url, _server) =
            serve_once("500 INTERNAL SERVER ERROR", r#"{"success": false, "error": "mic unavailable"}"#).await;
        let outcome = endpoint_for(url).process_audio().await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("mic unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport_failure() {
        let (url, _server) = serve_once("200 OK", "<html>oops</html>").await;
        let err = endpoint_for(url).process_audio().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse response"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = endpoint_for(format!("http://{addr}")).process_audio().await.unwrap_err();
        assert!(err.to_string().contains("Failed to connect"));
    }
}
