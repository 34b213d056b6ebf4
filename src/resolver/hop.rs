//! Classification of a single hop
//!
//! The checks run in a fixed order: transport error, then missing body, then
//! the status code. A 3xx response with an empty body is therefore a
//! missing-data failure, not a redirect.

use crate::resolver::Resolution;
use crate::transport::{ResponseMeta, TransportOutcome};
use crate::ResolveError;
use url::Url;

/// What the resolver should do after a hop completes
#[derive(Debug)]
pub(crate) enum HopAction {
    /// Terminal success
    Complete(Resolution),
    /// Terminal failure
    Fail(ResolveError),
    /// Request another hop; `None` means the response named no usable target
    Redirect { location: Option<Url> },
}

/// Decides the next step from what the transport reported
pub(crate) fn classify(outcome: TransportOutcome) -> HopAction {
    if let Some(error) = outcome.error {
        return HopAction::Fail(ResolveError::Transport(error));
    }

    let body = match outcome.body {
        Some(body) if !body.is_empty() => body,
        _ => return HopAction::Fail(ResolveError::MissingData),
    };

    // Without response metadata there is no status to act on
    let Some(response) = outcome.response else {
        return HopAction::Fail(ResolveError::MissingData);
    };

    if response.is_redirect() {
        return HopAction::Redirect {
            location: redirect_target(&response),
        };
    }

    HopAction::Complete(Resolution {
        response,
        data: body,
        redirects: 0,
    })
}

/// Reads `Location` and parses it as an absolute URL
pub(crate) fn redirect_target(response: &ResponseMeta) -> Option<Url> {
    let location = response.header("Location")?;
    match Url::parse(location.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Ignoring unusable Location '{}': {}", location, e);
            None
        }
    }
}
