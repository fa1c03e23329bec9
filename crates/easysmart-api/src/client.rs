// Easy Smart switch HTTP client
//
// Wraps `reqwest::Client` with the switch's URL layout, the headers its
// web server insists on, and status handling. Page endpoints are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderValue, REFERER};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Raw HTTP client for one switch's web management interface.
///
/// Holds the cookie-bearing session. Cloning shares the underlying
/// connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct EasySmartClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl EasySmartClient {
    /// Create a client for `host` (a hostname or `host:port`, with or
    /// without an `http://` scheme).
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically: the login session lives in a cookie.
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: base_url_for(host)?,
            timeout: config.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for giving it a cookie store; `timeout`
    /// is applied to every request regardless of the client's own setting.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The switch base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Base URL as text without a trailing slash, for `Referer` values.
    pub(crate) fn origin(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub(crate) fn page_url(&self, page: &str) -> Result<Url, Error> {
        self.base_url.join(page).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET an authenticated page and return its body.
    ///
    /// Anything but `200 OK` means the switch did not accept our session.
    pub(crate) async fn get_page(&self, page: &str) -> Result<String, Error> {
        let url = self.page_url(page)?;
        debug!("GET {}", url);

        let referer = format!("{}/", self.origin());
        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .header(REFERER, referer)
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_HTML))
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Authentication {
                message: format!("{page} returned HTTP {status}"),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        trace!(page, bytes = body.len(), "page received");
        Ok(body)
    }
}

fn base_url_for(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        Ok(Url::parse(host)?)
    } else {
        Ok(Url::parse(&format!("http://{host}"))?)
    }
}
