use crate::resolver::{MissingLocationPolicy, RedirectLimit};
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub transport: TransportConfig,
}

/// Redirect-following behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Maximum number of redirects followed for one resolution
    pub max_redirects: u32,

    /// Follow redirects without any limit (ignores `max_redirects`)
    pub unbounded_redirects: bool,

    /// What to do when a redirect carries no usable `Location`
    pub missing_location: MissingLocationPolicy,
}

impl ResolverConfig {
    /// The redirect limit described by this configuration
    pub fn redirect_limit(&self) -> RedirectLimit {
        if self.unbounded_redirects {
            RedirectLimit::Unbounded
        } else {
            RedirectLimit::Bounded(self.max_redirects)
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_redirects: RedirectLimit::DEFAULT_MAX,
            unbounded_redirects: false,
            missing_location: MissingLocationPolicy::default(),
        }
    }
}

/// HTTP client settings for the reqwest transport
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransportConfig {
    /// User-Agent header sent on every hop
    pub user_agent: String,

    /// Total time allowed for one hop (seconds)
    pub timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("applink-resolver/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}
