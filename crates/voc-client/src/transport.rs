//! HTTP transport: fixed headers, basic auth and status classification
//!
//! The transport only moves bytes. JSON decoding happens in
//! [`VocClient`](crate::VocClient) so that decode failures stay distinct from
//! transport failures.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, CLIENT_HEADERS};
use crate::error::{Result, VocError};

/// Status codes treated as success. Anything else is a failure.
pub const SUCCESS_CODES: [u16; 4] = [200, 201, 202, 204];

/// HTTP methods understood by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Request/response contract between the client and the network.
///
/// `Ok(None)` means the server answered 204 No Content. `Ok(Some(body))` is
/// the raw body of any other success status. Non-success statuses must be
/// reported as [`VocError::Server`] carrying the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<Option<Bytes>>;
}

/// Check whether a status code counts as success
pub fn is_success(status: u16) -> bool {
    SUCCESS_CODES.contains(&status)
}

/// Encode `username:password` for the `Authorization: Basic` header
pub fn basic_auth(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// Build the header set sent with every request
pub fn default_headers(username: &str, password: &str, config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in CLIENT_HEADERS {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| VocError::Config(format!("Invalid header name {}: {}", name, e)))?;
        headers.insert(name, HeaderValue::from_static(value));
    }

    let credential = HeaderValue::from_str(&format!("Basic {}", basic_auth(username, password)))
        .map_err(|e| VocError::Config(format!("Invalid credentials: {}", e)))?;
    headers.insert(AUTHORIZATION, credential);

    for (name, value) in &config.connection.extra_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| VocError::Config(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| VocError::Config(format!("Invalid value for header {}: {}", name, e)))?;
        headers.append(name, value);
    }

    Ok(headers)
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport that sends `headers` with every request
    pub fn new(headers: HeaderMap, config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<Option<Bytes>> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.into(), url.clone());
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !is_success(status.as_u16()) {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(VocError::server_error(status.as_u16(), body));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        Ok(Some(response.bytes().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes() {
        for code in [200, 201, 202, 204] {
            assert!(is_success(code));
        }
        for code in [203, 206, 301, 400, 403, 404, 500] {
            assert!(!is_success(code));
        }
    }

    #[test]
    fn test_basic_auth_encoding() {
        assert_eq!(basic_auth("user", "pass"), "dXNlcjpwYXNz");
    }

    #[test]
    fn test_default_headers() {
        let config = ClientConfig::builder().header("X-Extra", "yes").build();
        let headers = default_headers("user", "pass", &config).unwrap();

        assert_eq!(headers["authorization"], "Basic dXNlcjpwYXNz");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-app-name"], "Volvo On Call");
        assert_eq!(headers["x-os-version"], "22");
        assert_eq!(headers["x-extra"], "yes");
    }

    #[test]
    fn test_invalid_extra_header_is_config_error() {
        let config = ClientConfig::builder().header("bad header", "x").build();
        let err = default_headers("user", "pass", &config).unwrap_err();
        assert!(matches!(err, VocError::Config(_)));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Put), reqwest::Method::PUT);
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
