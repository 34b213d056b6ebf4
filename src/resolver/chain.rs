//! The resolver driving a chain of hops
//!
//! Hops are strictly sequential: the next request is only built after the
//! previous outcome has been classified. The resolver keeps no state between
//! calls, so one instance can serve any number of concurrent resolutions.

use crate::config::Config;
use crate::resolver::hop::{classify, HopAction};
use crate::resolver::{MissingLocationPolicy, RedirectLimit, Resolution};
use crate::transport::{ReqwestTransport, Request, Transport, TransportError};
use crate::ResolveError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Resolves URLs to their terminal HTML response
#[derive(Clone)]
pub struct Resolver {
    transport: Arc<dyn Transport>,
    redirect_limit: RedirectLimit,
    missing_location: MissingLocationPolicy,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("redirect_limit", &self.redirect_limit)
            .field("missing_location", &self.missing_location)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Creates a resolver on top of the shared default transport
    ///
    /// # Returns
    ///
    /// * `Ok(Resolver)` - Resolver with default policies
    /// * `Err(ResolveError)` - The shared HTTP client could not be built
    pub fn new() -> crate::Result<Self> {
        let transport = ReqwestTransport::shared().map_err(TransportError::from)?;
        Ok(Self::with_transport(transport))
    }

    /// Creates a resolver on top of the given transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            redirect_limit: RedirectLimit::default(),
            missing_location: MissingLocationPolicy::default(),
        }
    }

    /// Creates a resolver with its own reqwest transport built from `config`
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let transport = ReqwestTransport::new(&config.transport).map_err(TransportError::from)?;
        Ok(Self::with_transport(Arc::new(transport))
            .with_redirect_limit(config.resolver.redirect_limit())
            .with_missing_location(config.resolver.missing_location))
    }

    /// Sets how many redirects one resolution may follow
    pub fn with_redirect_limit(mut self, limit: RedirectLimit) -> Self {
        self.redirect_limit = limit;
        self
    }

    /// Sets the handling of redirects without a usable `Location`
    pub fn with_missing_location(mut self, policy: MissingLocationPolicy) -> Self {
        self.missing_location = policy;
        self
    }

    /// Transport every hop is executed on
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn redirect_limit(&self) -> RedirectLimit {
        self.redirect_limit
    }

    pub fn missing_location(&self) -> MissingLocationPolicy {
        self.missing_location
    }

    /// Fetches `url`, following redirects, and returns the terminal response
    ///
    /// # Request Flow
    ///
    /// 1. Build a GET with `Prefer-Html-Meta-Tags: al` and execute it
    /// 2. Classify the outcome
    ///    - Transport error → returned unchanged
    ///    - No body → `MissingData`
    ///    - Status outside 300..=399 → `Resolution`
    ///    - Status inside 300..=399 → next hop
    /// 3. For a redirect, request `Location`; if it is missing or not an
    ///    absolute URL, apply the missing-location policy
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to resolve
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution)` - The terminal response and its body
    /// * `Err(ResolveError)` - The first failure encountered on any hop
    pub async fn resolve(&self, url: &Url) -> crate::Result<Resolution> {
        let mut target = url.clone();
        let mut redirects: u32 = 0;

        loop {
            let request = Request::app_link(target);
            tracing::debug!("Hop {}: GET {}", redirects, request.url());

            let outcome = self.transport.execute(&request).await;

            let location = match classify(outcome) {
                HopAction::Complete(mut resolution) => {
                    resolution.redirects = redirects;
                    tracing::info!(
                        "Resolved {} -> {} ({}, {} redirects)",
                        url,
                        resolution.response.url,
                        resolution.response.status_code,
                        redirects
                    );
                    return Ok(resolution);
                }
                HopAction::Fail(err) => {
                    tracing::debug!("Resolution of {} failed at {}: {}", url, request.url(), err);
                    return Err(err);
                }
                HopAction::Redirect { location } => location,
            };

            // The missing-location policy decides before the limit does
            let next = match location {
                Some(next) => next,
                None => self.fallback_target(request.url())?,
            };

            if self.redirect_limit.is_exhausted(redirects) {
                tracing::warn!("Giving up on {} after {} redirects", url, redirects);
                return Err(ResolveError::TooManyRedirects {
                    url: url.to_string(),
                    limit: redirects,
                });
            }

            target = next;
            redirects += 1;
        }
    }

    /// Resolves `url` in the background and hands the result to `on_complete`
    ///
    /// `on_complete` runs exactly once, on a Tokio worker, after the terminal
    /// hop. Must be called from within a Tokio runtime.
    pub fn resolve_with<F>(&self, url: Url, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(crate::Result<Resolution>) + Send + 'static,
    {
        let resolver = self.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(&url).await;
            on_complete(result);
        })
    }

    /// Target for a redirect that named no usable `Location`
    fn fallback_target(&self, current: &Url) -> crate::Result<Url> {
        match self.missing_location {
            MissingLocationPolicy::RetrySameUrl => {
                tracing::warn!("Redirect from {} has no usable Location, retrying it", current);
                Ok(current.clone())
            }
            MissingLocationPolicy::Fail => Err(ResolveError::MissingLocation {
                url: current.to_string(),
            }),
        }
    }
}
