// easysmart-core: Domain layer for TP-Link Easy Smart switch monitoring
//
// Decodes port pages into typed snapshots, derives packet rates, and
// wraps the HTTP session in a `Switch` facade with optional background
// polling.

pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod monitor;
pub mod rate;
pub mod switch;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_SCAN_INTERVAL, DEFAULT_TIMEOUT, DEFAULT_USERNAME, SwitchConfig};
pub use decode::decode_ports;
pub use error::CoreError;
pub use model::{DeviceIdentity, LinkStatus, PollResult, PortIndex, PortSnapshot, PortState};
pub use monitor::{MIN_PERIOD, Monitor, MonitorState, Sample};
pub use rate::{Direction, PortRates, RateEstimator, RateTracker};
pub use switch::Switch;

pub use easysmart_api::FirmwareLayout;
