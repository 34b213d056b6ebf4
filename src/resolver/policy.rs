//! Redirect policies
//!
//! Both knobs here cover cases where a server misbehaves: a redirect loop,
//! or a 3xx status that names no target.

use serde::Deserialize;
use std::fmt;

/// How many redirects a single resolution may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectLimit {
    /// Follow at most this many redirects, then fail
    Bounded(u32),
    /// Follow redirects for as long as the server keeps sending them
    Unbounded,
}

impl RedirectLimit {
    /// Default number of redirects followed
    pub const DEFAULT_MAX: u32 = 10;

    /// Returns true if `followed` redirects already use up the limit
    pub fn is_exhausted(&self, followed: u32) -> bool {
        match self {
            Self::Bounded(max) => followed >= *max,
            Self::Unbounded => false,
        }
    }
}

impl Default for RedirectLimit {
    fn default() -> Self {
        Self::Bounded(Self::DEFAULT_MAX)
    }
}

impl fmt::Display for RedirectLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{}", max),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// What to do with a redirect status that has no usable `Location` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingLocationPolicy {
    /// Request the same URL again
    ///
    /// A server that keeps answering the same way turns this into a loop,
    /// which only the redirect limit stops.
    #[default]
    RetrySameUrl,
    /// Stop with `ResolveError::MissingLocation`
    Fail,
}
