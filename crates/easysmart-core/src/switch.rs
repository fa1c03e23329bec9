// ── Switch facade ──
//
// Ties session, page parsing, port decoding and the clock together behind
// a cheaply cloneable handle. All HTTP goes through one shared client so
// the session cookie from `login()` is reused by every fetch.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use easysmart_api::{EasySmartClient, FirmwareLayout, TransportConfig};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::SwitchConfig;
use crate::decode::decode_ports;
use crate::error::CoreError;
use crate::model::{DeviceIdentity, PollResult};

/// Handle to one Easy Smart switch.
///
/// Cloning is cheap; clones share the HTTP session, the cached identity
/// and the discovered port count.
#[derive(Clone)]
pub struct Switch {
    inner: Arc<SwitchInner>,
}

struct SwitchInner {
    config: SwitchConfig,
    client: EasySmartClient,
    clock: Arc<dyn Clock>,
    identity: Mutex<Option<DeviceIdentity>>,
    layout: Mutex<Option<FirmwareLayout>>,
    port_count: AtomicUsize,
    /// Held for the whole of a statistics fetch so concurrent callers
    /// never interleave requests on the shared session.
    poll_lock: Mutex<()>,
}

impl fmt::Debug for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("host", &self.inner.config.host)
            .field("username", &self.inner.config.username)
            .field("port_count", &self.port_count())
            .finish_non_exhaustive()
    }
}

impl Switch {
    /// Build a switch handle with its own cookie-holding HTTP client.
    /// Does not touch the network.
    pub fn new(config: SwitchConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = EasySmartClient::new(&config.host, &transport)?;
        Ok(Self::with_client(config, client, Arc::new(SystemClock)))
    }

    /// Build a switch handle around an existing client and clock.
    pub fn with_client(config: SwitchConfig, client: EasySmartClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(SwitchInner {
                config,
                client,
                clock,
                identity: Mutex::new(None),
                layout: Mutex::new(None),
                port_count: AtomicUsize::new(0),
                poll_lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.inner.config
    }

    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    // ── Session ──────────────────────────────────────────────────

    /// Submit credentials. Success only means the switch answered; bad
    /// credentials surface as `InvalidAuth` on the next fetch.
    pub async fn login(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        debug!(host = %config.host, username = %config.username, "logging in");
        self.inner
            .client
            .login(&config.username, &config.password)
            .await?;
        Ok(())
    }

    /// Log in and read the device identity.
    pub async fn connect(&self) -> Result<DeviceIdentity, CoreError> {
        self.login().await?;
        let identity = self.fetch_identity().await?;
        info!(
            host = %identity.host,
            hardware = %identity.hardware_version,
            firmware = %identity.firmware_version,
            "connected to switch"
        );
        Ok(identity)
    }

    /// Log in and fetch one round of port data, proving the credentials
    /// actually work.
    pub async fn verify(&self) -> Result<PollResult, CoreError> {
        self.login().await?;
        self.fetch_port_data().await
    }

    /// Release the handle. The session dies with the last clone.
    pub fn close(self) {
        debug!(host = %self.host(), "closing switch handle");
        drop(self);
    }

    /// One-shot: log in, run the closure, close.
    pub async fn oneshot<F, Fut, T>(config: SwitchConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Switch) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let switch = Switch::new(config)?;
        switch.login().await?;
        let result = f(switch.clone()).await;
        switch.close();
        result
    }

    // ── Data ─────────────────────────────────────────────────────

    /// Read the system info page and cache the result.
    pub async fn fetch_identity(&self) -> Result<DeviceIdentity, CoreError> {
        let info = self.inner.client.get_system_info().await?;
        let identity = DeviceIdentity {
            host: self.inner.config.host.clone(),
            mac_address: info.mac_address,
            firmware_version: info.firmware_version,
            hardware_version: info.hardware_version,
        };
        *self.inner.identity.lock().await = Some(identity.clone());
        Ok(identity)
    }

    /// Fetch and decode every port's state and counters.
    ///
    /// Concurrent calls are serialized. The port count is only updated
    /// after the whole page decoded.
    pub async fn fetch_port_data(&self) -> Result<PollResult, CoreError> {
        let _guard = self.inner.poll_lock.lock().await;

        let stats = self.inner.client.get_port_statistics().await?;
        let ports = decode_ports(&stats.fields, stats.port_count)?;
        let timestamp = self.inner.clock.now();

        self.inner.port_count.store(stats.port_count, Ordering::Relaxed);
        *self.inner.layout.lock().await = Some(stats.layout);

        debug!(
            host = %self.inner.config.host,
            layout = ?stats.layout,
            ports = ports.len(),
            "port statistics decoded"
        );
        Ok(PollResult { timestamp, ports })
    }

    // ── Cached state ─────────────────────────────────────────────

    /// Identity from the last successful `fetch_identity()`.
    pub async fn identity(&self) -> Option<DeviceIdentity> {
        self.inner.identity.lock().await.clone()
    }

    /// Page layout seen on the last successful statistics fetch.
    pub async fn firmware_layout(&self) -> Option<FirmwareLayout> {
        *self.inner.layout.lock().await
    }

    /// Port count from the last successful statistics fetch; 0 before any.
    pub fn port_count(&self) -> usize {
        self.inner.port_count.load(Ordering::Relaxed)
    }
}
