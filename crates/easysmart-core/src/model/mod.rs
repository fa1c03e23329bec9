// ── Domain model ──
//
// Types handed to consumers. Everything here is decoded; raw page text
// never leaves easysmart-api.

pub mod device;
pub mod port;

pub use device::DeviceIdentity;
pub use port::{LinkStatus, PollResult, PortIndex, PortSnapshot, PortState};
