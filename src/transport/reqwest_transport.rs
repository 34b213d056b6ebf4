//! reqwest-backed transport
//!
//! The client is built with `Policy::none()` so 3xx responses come back to the
//! resolver untouched and each hop can be re-issued with the App Link header.

use crate::config::TransportConfig;
use crate::transport::{Request, ResponseMeta, Transport, TransportError, TransportOutcome};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

static SHARED: OnceLock<Arc<ReqwestTransport>> = OnceLock::new();

/// Transport that executes requests with a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport with its own client
    ///
    /// # Arguments
    ///
    /// * `config` - User agent and timeouts for the client
    ///
    /// # Returns
    ///
    /// * `Ok(ReqwestTransport)` - Successfully built transport
    /// * `Err(reqwest::Error)` - Failed to build the underlying client
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(Policy::none()) // Handle redirects manually
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Wraps an existing client
    ///
    /// The client should be built with `redirect::Policy::none()`; otherwise
    /// reqwest follows redirects itself and later hops lose the App Link header.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns the process-wide default transport, creating it on first use
    pub fn shared() -> Result<Arc<Self>, reqwest::Error> {
        if let Some(transport) = SHARED.get() {
            return Ok(Arc::clone(transport));
        }

        let transport = Arc::new(Self::new(&TransportConfig::default())?);
        // Another thread may have won the race; keep whichever got stored
        Ok(Arc::clone(SHARED.get_or_init(|| transport)))
    }
}

/// Copies status, final URL and headers out of a reqwest response
///
/// Header values are decoded lossily: servers send raw UTF-8 in `Location`,
/// which `Url::parse` percent-encodes on the next hop.
fn response_meta(response: &reqwest::Response) -> ResponseMeta {
    let mut meta = ResponseMeta::new(response.status().as_u16(), response.url().clone());

    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes());
        meta.append_header(name.as_str(), &value);
    }

    meta
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &Request) -> TransportOutcome {
        let mut builder = self.client.get(request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("GET {} failed: {}", request.url(), e);
                return TransportOutcome::failed(TransportError::from(e));
            }
        };

        let meta = response_meta(&response);

        match response.bytes().await {
            Ok(body) if body.is_empty() => TransportOutcome::without_body(meta),
            Ok(body) => TransportOutcome::completed(meta, body),
            Err(e) => {
                tracing::debug!("Reading body of {} failed: {}", request.url(), e);
                TransportOutcome {
                    body: None,
                    response: Some(meta),
                    error: Some(TransportError::from(e)),
                }
            }
        }
    }
}
