// Page scraping for the switch's script-embedded data.
//
// Nothing here touches the network: every entry point takes the raw page
// text, so the parsers are exercised directly against fixtures.

mod document;
pub mod fields;
pub mod layout;
pub mod system_info;

pub use fields::RawFields;
pub use layout::{COUNTERS_PER_PORT, FirmwareLayout, PortStatistics, parse_port_statistics};
pub use system_info::{SystemInfo, parse_system_info};
