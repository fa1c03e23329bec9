// ── Port domain types ──

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 1-based physical port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortIndex(u16);

impl PortIndex {
    /// `None` for 0; port numbering starts at 1.
    pub fn new(number: u16) -> Option<Self> {
        (number >= 1).then_some(Self(number))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PortIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Administrative state of a port.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Disabled,
    Enabled,
}

impl PortState {
    /// Decode the firmware's numeric state code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Disabled),
            "1" => Some(Self::Enabled),
            _ => None,
        }
    }
}

/// Negotiated link of a port.
///
/// Codes 1 and 4 exist in the firmware's table but carry no documented
/// meaning; they are kept under their literal labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum LinkStatus {
    #[strum(to_string = "Link Down")]
    #[serde(rename = "link_down")]
    LinkDown,
    #[strum(to_string = "LS 1")]
    #[serde(rename = "reserved_1")]
    Reserved1,
    #[strum(to_string = "10M Half")]
    #[serde(rename = "half_10m")]
    Half10M,
    #[strum(to_string = "10M Full")]
    #[serde(rename = "full_10m")]
    Full10M,
    #[strum(to_string = "LS 4")]
    #[serde(rename = "reserved_4")]
    Reserved4,
    #[strum(to_string = "100M Full")]
    #[serde(rename = "full_100m")]
    Full100M,
    #[strum(to_string = "1000M Full")]
    #[serde(rename = "full_1000m")]
    Full1000M,
}

impl LinkStatus {
    /// Decode the firmware's numeric link status code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::LinkDown),
            "1" => Some(Self::Reserved1),
            "2" => Some(Self::Half10M),
            "3" => Some(Self::Full10M),
            "4" => Some(Self::Reserved4),
            "5" => Some(Self::Full100M),
            "6" => Some(Self::Full1000M),
            _ => None,
        }
    }

    pub fn is_link_down(self) -> bool {
        matches!(self, Self::LinkDown)
    }

    /// Negotiated speed, where the code names one.
    pub fn speed_mbps(self) -> Option<u32> {
        match self {
            Self::Half10M | Self::Full10M => Some(10),
            Self::Full100M => Some(100),
            Self::Full1000M => Some(1000),
            Self::LinkDown | Self::Reserved1 | Self::Reserved4 => None,
        }
    }

    pub fn is_full_duplex(self) -> bool {
        matches!(self, Self::Full10M | Self::Full100M | Self::Full1000M)
    }
}

/// Decoded status and counters of one port at one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSnapshot {
    pub state: PortState,
    pub link_status: LinkStatus,
    pub tx_good_packets: u64,
    pub tx_bad_packets: u64,
    pub rx_good_packets: u64,
    pub rx_bad_packets: u64,
}

impl PortSnapshot {
    /// Enabled and carrying a link.
    pub fn is_up(&self) -> bool {
        self.state == PortState::Enabled && !self.link_status.is_link_down()
    }
}

/// Every port's snapshot from one statistics fetch, stamped with the
/// instant the data was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResult {
    pub timestamp: DateTime<Utc>,
    pub ports: BTreeMap<PortIndex, PortSnapshot>,
}

impl PollResult {
    pub fn port(&self, index: PortIndex) -> Option<&PortSnapshot> {
        self.ports.get(&index)
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn ports_up(&self) -> usize {
        self.ports.values().filter(|p| p.is_up()).count()
    }
}
