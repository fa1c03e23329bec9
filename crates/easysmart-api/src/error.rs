use thiserror::Error;

/// Top-level error type for the `easysmart-api` crate.
///
/// Covers every failure mode of the switch's web management surface:
/// transport, authentication, and page scraping. `easysmart-core`
/// folds these into its closed three-way error kind.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// An authenticated page came back with a non-200 status. The switch
    /// accepts any login POST, so this is where bad credentials or an
    /// expired session actually surface.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A page was fetched but the expected script variables were missing
    /// or could not be converted. Usually means an unrecognized firmware.
    #[error("Malformed {page} response: {message}")]
    MalformedResponse { page: &'static str, message: String },
}

impl Error {
    /// Classify a `reqwest` failure, lifting timeouts into [`Error::Timeout`].
    pub(crate) fn from_transport(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            Self::Transport(err)
        }
    }

    pub(crate) fn malformed(page: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            page,
            message: message.into(),
        }
    }

    /// Returns `true` if this error indicates the session was rejected
    /// and logging in again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next scheduled poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
