// ── Switch connection configuration ──
//
// Everything the facade needs to reach one switch. Values typically come
// from easysmart-config (profiles, keyring, env) but can be constructed
// directly by library consumers.

use std::time::Duration;

use secrecy::SecretString;

/// Per-request bound on the HTTP round trip.
pub const DEFAULT_TIMEOUT: Duration = easysmart_api::transport::DEFAULT_TIMEOUT;

/// Period between scheduled polls.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Factory username on every Easy Smart switch.
pub const DEFAULT_USERNAME: &str = "admin";

/// Configuration for connecting to a single switch.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    /// Hostname or IP address; a bare host is reached over plain HTTP.
    pub host: String,
    pub username: String,
    pub password: SecretString,
    pub timeout: Duration,
    pub scan_interval: Duration,
}

impl SwitchConfig {
    /// A config with default username, timeout and scan interval.
    pub fn new(host: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            password,
            ..Self::default()
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.1".into(),
            username: DEFAULT_USERNAME.into(),
            password: SecretString::from(String::new()),
            timeout: DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}
