// ── Device identity ──

use serde::{Deserialize, Serialize};

/// Static facts about a switch, read once from the system info page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Address the switch was reached at.
    pub host: String,
    pub mac_address: String,
    pub firmware_version: String,
    pub hardware_version: String,
}

impl DeviceIdentity {
    /// Human-facing name for the device.
    pub fn display_name(&self) -> String {
        format!("Switch {}", self.host)
    }

    /// Where the switch's own web UI lives.
    pub fn configuration_url(&self) -> String {
        if self.host.contains("://") {
            self.host.clone()
        } else {
            format!("http://{}", self.host)
        }
    }

    /// Vendor and model summary, e.g. `TP-Link TL-SG108E 3.0`.
    pub fn model(&self) -> String {
        format!("TP-Link {}", self.hardware_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(host: &str) -> DeviceIdentity {
        DeviceIdentity {
            host: host.into(),
            mac_address: "50:C7:BF:01:02:03".into(),
            firmware_version: "1.0.0 Build 20171214 Rel.70905".into(),
            hardware_version: "TL-SG108E 3.0".into(),
        }
    }

    #[test]
    fn names_derive_from_host() {
        let id = identity("192.168.0.1");
        assert_eq!(id.display_name(), "Switch 192.168.0.1");
        assert_eq!(id.configuration_url(), "http://192.168.0.1");
        assert_eq!(id.model(), "TP-Link TL-SG108E 3.0");
    }

    #[test]
    fn configuration_url_keeps_explicit_scheme() {
        let id = identity("http://switch.lan:8080");
        assert_eq!(id.configuration_url(), "http://switch.lan:8080");
    }
}
