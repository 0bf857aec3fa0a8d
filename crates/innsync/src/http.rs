use async_trait::async_trait;
use thiserror::Error;

/// HTTP headers represented as key/value pairs.
pub type HttpHeaders = Vec<(String, String)>;

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for {url}")]
    NoMockResponse { url: String },
}

/// Transport boundary for all upstream HTTP I/O.
///
/// The content API is read-only, so the transport only needs GET. Keeping
/// the boundary this narrow lets unit tests swap in [`MockTransport`]
/// without sockets or loopback servers.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse, HttpError>;
}

/// A real HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse, HttpError> {
        let mut builder = self.client.get(url);
        for (k, v) in headers {
            builder = builder.header(k, v);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
pub use mock::MockTransport;

#[cfg(test)]
mod mock {
    use super::*;

    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// In-memory mock transport for unit and integration tests.
    ///
    /// Responses are registered per URL and returned in FIFO order; every
    /// request is recorded so tests can assert on headers and pacing.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        inner: Arc<Mutex<MockTransportInner>>,
    }

    #[derive(Default)]
    struct MockTransportInner {
        routes: HashMap<String, VecDeque<HttpResponse>>,
        requests: Vec<(String, HttpHeaders)>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a response for a URL.
        ///
        /// Multiple responses for the same URL are returned in FIFO order.
        pub fn push_response(&self, url: impl Into<String>, response: HttpResponse) {
            let mut inner = self
                .inner
                .lock()
                .expect("mock transport lock should not be poisoned");
            inner
                .routes
                .entry(url.into())
                .or_default()
                .push_back(response);
        }

        /// Register a 200 response with a JSON body.
        pub fn push_json(&self, url: impl Into<String>, body: &serde_json::Value) {
            self.push_response(
                url,
                HttpResponse {
                    status: 200,
                    body: serde_json::to_vec(body).expect("mock body should serialize"),
                },
            );
        }

        /// Register an error-status response with an empty body.
        pub fn push_status(&self, url: impl Into<String>, status: u16) {
            self.push_response(
                url,
                HttpResponse {
                    status,
                    body: Vec::new(),
                },
            );
        }

        #[must_use]
        pub fn requests(&self) -> Vec<(String, HttpHeaders)> {
            let inner = self
                .inner
                .lock()
                .expect("mock transport lock should not be poisoned");
            inner.requests.clone()
        }

        #[must_use]
        pub fn request_count(&self) -> usize {
            self.inner
                .lock()
                .expect("mock transport lock should not be poisoned")
                .requests
                .len()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse, HttpError> {
            let mut inner = self
                .inner
                .lock()
                .expect("mock transport lock should not be poisoned");

            inner.requests.push((url.to_string(), headers.clone()));

            match inner.routes.get_mut(url).and_then(|q| q.pop_front()) {
                Some(resp) => Ok(resp),
                None => Err(HttpError::NoMockResponse {
                    url: url.to_string(),
                }),
            }
        }
    }
}
