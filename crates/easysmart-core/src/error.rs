// ── Core error types ──
//
// The closed set of outcomes a caller has to handle. Consumers never see
// HTTP status codes or regex misses directly: the `From<easysmart_api::Error>`
// impl folds every transport and page failure into one of three kinds.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Network, DNS or timeout failure. Worth another try on the next
    /// scheduled poll.
    #[error("Cannot connect to switch: {reason}")]
    CannotConnect { reason: String },

    /// The switch refused an authenticated page. Retrying with the same
    /// credentials will not help.
    #[error("Authentication failed: {message}")]
    InvalidAuth { message: String },

    /// A page arrived but its data could not be recovered: the firmware
    /// layout or a code table is not one this crate knows.
    #[error("Unrecognized switch response: {message}")]
    MalformedResponse { message: String },
}

impl CoreError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Returns `true` for failures the next poll may not repeat.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CannotConnect { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<easysmart_api::Error> for CoreError {
    fn from(err: easysmart_api::Error) -> Self {
        match err {
            easysmart_api::Error::Authentication { message } => CoreError::InvalidAuth { message },
            easysmart_api::Error::Transport(ref e) => CoreError::CannotConnect {
                reason: match e.url() {
                    Some(url) => format!("{e} ({})", url.host_str().unwrap_or("<unknown>")),
                    None => e.to_string(),
                },
            },
            easysmart_api::Error::Timeout { timeout_secs } => CoreError::CannotConnect {
                reason: format!("request timed out after {timeout_secs}s"),
            },
            easysmart_api::Error::InvalidUrl(e) => CoreError::CannotConnect {
                reason: format!("invalid switch address: {e}"),
            },
            easysmart_api::Error::ClientBuild(reason) => CoreError::CannotConnect { reason },
            err @ easysmart_api::Error::MalformedResponse { .. } => CoreError::MalformedResponse {
                message: err.to_string(),
            },
        }
    }
}
