//! Redirect-following resolution
//!
//! This module contains the resolver itself:
//! - hop classification (error, missing data, redirect, success)
//! - the redirect and missing-`Location` policies
//! - the `Resolver` that drives one chain of hops per call

mod chain;
mod hop;
mod policy;

pub use chain::Resolver;
#[cfg(test)]
pub(crate) use hop::redirect_target;
pub use policy::{MissingLocationPolicy, RedirectLimit};

use crate::transport::ResponseMeta;
use bytes::Bytes;

/// Final answer of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Status and headers of the terminal response
    pub response: ResponseMeta,
    /// Body of the terminal response, never empty
    pub data: Bytes,
    /// Number of redirects followed before the terminal response
    pub redirects: u32,
}

impl Resolution {
    /// URL that produced the terminal response
    pub fn final_url(&self) -> &url::Url {
        &self.response.url
    }
}
