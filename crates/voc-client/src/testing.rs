//! Test utilities for voc-client
//!
//! Two ways to stand in for the remote API:
//!
//! - [`TestServer`] serves an axum router on an ephemeral port and hands out a
//!   [`VocClient`] pointed at it. Exercises the real HTTP transport.
//! - [`ScriptedTransport`] answers from an in-memory queue and records every
//!   request. No sockets, so it works under `tokio::test(start_paused = true)`.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Result, VocError};
use crate::transport::{is_success, Method, Transport};
use crate::VocClient;

/// Credentials the [`TestServer`] client signs in with
pub const TEST_USERNAME: &str = "test-user";
pub const TEST_PASSWORD: &str = "test-pass";

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: VocClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve `router` and create a client whose API root is the server address.
    ///
    /// Routes are therefore registered without the `/customerapi/rest/v3.0`
    /// prefix, e.g. `/vehicles/{vin}/attributes`. The poll interval is
    /// shortened to 10ms.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use voc_client::testing::TestServer;
    ///
    /// let router = Router::new().route(
    ///     "/vehicles/{vin}/status",
    ///     get(|| async { Json(serde_json::json!({ "carLocked": true })) }),
    /// );
    /// let server = TestServer::start(router).await?;
    /// let status = server.client.get_vehicle_status("YV1").await?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with_config(router, ClientConfig::builder().poll_interval_ms(10)).await
    }

    /// Serve `router` with a client built from `config`; the base URL is
    /// overridden with the server address.
    pub async fn start_with_config<S>(
        router: axum::Router<S>,
        config: crate::config::ClientConfigBuilder,
    ) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let config = config
            .base_url(format!("http://{}", addr))
            .request_timeout_ms(5_000)
            .build();
        let client = VocClient::with_config(TEST_USERNAME, TEST_PASSWORD, config)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a reference to the client
    pub fn client(&self) -> &VocClient {
        &self.client
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Scripted Transport
// =============================================================================

/// A request seen by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
struct ScriptedResponse {
    status: u16,
    body: Option<Bytes>,
}

/// In-memory transport answering from a queue of canned responses.
///
/// Responses are consumed in order. The last one is sticky: once it is the
/// only response left it is answered to every further request, which keeps
/// a "still Started" service status coming for as long as a poll runs.
/// Statuses outside the success set are reported as [`VocError::Server`],
/// the same way the HTTP transport reports them.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_raw(status, body.to_string());
    }

    /// Queue a response with a raw text body
    pub fn push_raw(&self, status: u16, body: impl Into<String>) {
        self.responses.lock().push_back(ScriptedResponse {
            status,
            body: Some(Bytes::from(body.into())),
        });
    }

    /// Queue a 204 No Content response
    pub fn push_no_content(&self) {
        self.responses.lock().push_back(ScriptedResponse {
            status: 204,
            body: None,
        });
    }

    /// Queue a failure status with a raw body
    pub fn push_error(&self, status: u16, body: impl Into<String>) {
        self.push_raw(status, body);
    }

    /// Every request executed so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests executed so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next_response(&self) -> Option<ScriptedResponse> {
        let mut responses = self.responses.lock();
        if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<Option<Bytes>> {
        self.requests.lock().push(RecordedRequest {
            method,
            url: url.to_string(),
            payload: payload.cloned(),
        });

        let response = self.next_response().ok_or_else(|| {
            VocError::server_error(404, format!("no scripted response for {} {}", method, url))
        })?;

        if !is_success(response.status) {
            let body = response
                .body
                .map(|b| String::from_utf8_lossy(&b).into_owned())
                .unwrap_or_default();
            return Err(VocError::server_error(response.status, body));
        }

        if response.status == 204 {
            return Ok(None);
        }
        Ok(response.body)
    }
}

/// Build a client on top of a fresh [`ScriptedTransport`]
pub fn scripted_client(config: ClientConfig) -> (Arc<ScriptedTransport>, VocClient) {
    let transport = Arc::new(ScriptedTransport::new());
    let client = VocClient::with_transport(transport.clone(), config);
    (transport, client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_last_response_is_sticky() {
        let transport = ScriptedTransport::new();
        transport.push_raw(200, "first");
        transport.push_raw(200, "last");

        let u = url("http://voc.test/a");
        for expected in ["first", "last", "last", "last"] {
            let body = transport.execute(Method::Get, &u, None).await.unwrap();
            assert_eq!(body, Some(Bytes::from(expected)));
        }
        assert_eq!(transport.request_count(), 4);
    }

    #[tokio::test]
    async fn test_failure_status_becomes_server_error() {
        let transport = ScriptedTransport::new();
        transport.push_error(403, "forbidden by policy");

        let err = transport
            .execute(Method::Post, &url("http://voc.test/a"), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("forbidden by policy"));
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let transport = ScriptedTransport::new();
        let result = transport
            .execute(Method::Get, &url("http://voc.test/a"), None)
            .await;
        assert!(result.is_err());
        assert_eq!(transport.request_count(), 1);
    }
}
