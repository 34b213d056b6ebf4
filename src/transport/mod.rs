//! Transport layer for App Link resolution
//!
//! This module defines the seam between the resolver and whatever actually
//! performs HTTP requests:
//! - `Request`, the immutable description of one hop
//! - `ResponseMeta` and `TransportOutcome`, what a hop produced
//! - the `Transport` trait and its reqwest-backed implementation

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Header telling App Link aware servers which meta tags to favour
pub const PREFER_HTML_META_TAGS: &str = "Prefer-Html-Meta-Tags";

/// Value sent with [`PREFER_HTML_META_TAGS`]
pub const APP_LINK_META_TAGS: &str = "al";

/// Opaque failure reported by a transport
///
/// Network, DNS and TLS failures all end up here. The wrapped error is kept
/// intact so callers can inspect it with [`TransportError::downcast_ref`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    /// Wraps any error (or message) as a transport failure
    pub fn new(inner: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    /// Returns the underlying error if it is of type `E`
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err)
    }
}

/// A single GET request issued for one hop
///
/// Requests are only built through [`Request::app_link`], so every hop carries
/// the App Link preference header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Builds the request for `url` with `Prefer-Html-Meta-Tags: al`
    pub fn app_link(url: Url) -> Self {
        Self {
            url,
            headers: vec![(
                PREFER_HTML_META_TAGS.to_string(),
                APP_LINK_META_TAGS.to_string(),
            )],
        }
    }

    /// Target of the request
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers in the order they are sent
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Looks up a header value, ignoring case in the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// Status and headers of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    /// HTTP status code
    pub status_code: u16,
    /// URL that produced this response
    pub url: Url,
    /// Header name to value; repeated headers are joined with ", "
    pub headers: BTreeMap<String, String>,
}

impl ResponseMeta {
    /// Creates response metadata without headers
    pub fn new(status_code: u16, url: Url) -> Self {
        Self {
            status_code,
            url,
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header, joining it onto an existing value of the same name
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.append_header(name, value);
        self
    }

    pub(crate) fn append_header(&mut self, name: &str, value: &str) {
        let existing = self
            .headers
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned();

        match existing {
            Some(key) => {
                if let Some(current) = self.headers.get_mut(&key) {
                    current.push_str(", ");
                    current.push_str(value);
                }
            }
            None => {
                self.headers.insert(name.to_string(), value.to_string());
            }
        }
    }

    /// Looks up a header value, ignoring case in the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true for status codes 300 through 399
    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status_code)
    }
}

/// Everything a transport reports when a hop completes
///
/// Mirrors the `(body, response, error)` triple of a completion handler. When
/// `error` is set the other two slots are informational only.
#[derive(Debug, Default)]
pub struct TransportOutcome {
    pub body: Option<Bytes>,
    pub response: Option<ResponseMeta>,
    pub error: Option<TransportError>,
}

impl TransportOutcome {
    /// A response with a body
    pub fn completed(response: ResponseMeta, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            response: Some(response),
            error: None,
        }
    }

    /// A response that carried no body at all
    pub fn without_body(response: ResponseMeta) -> Self {
        Self {
            body: None,
            response: Some(response),
            error: None,
        }
    }

    /// A failed transfer
    pub fn failed(error: TransportError) -> Self {
        Self {
            body: None,
            response: None,
            error: Some(error),
        }
    }
}

/// Something that can execute a single HTTP request
///
/// Awaiting the returned future starts the transfer. A future runs to
/// completion at most once, so each call maps to exactly one request and one
/// outcome. Implementations must not follow redirects themselves.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> TransportOutcome;
}
