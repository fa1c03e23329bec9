// easysmart-api: Async Rust client for TP-Link Easy Smart switch web pages

pub mod auth;
pub mod client;
pub mod error;
pub mod page;
pub mod system;
pub mod transport;

pub use client::EasySmartClient;
pub use error::Error;
pub use page::{FirmwareLayout, PortStatistics, RawFields, SystemInfo};
pub use transport::TransportConfig;
