// `SystemInfoRpm.htm` scanning.
//
// The identity strings are single-element arrays spread over three lines:
//
//     macStr:[
//     "50:C7:BF:01:02:03"
//     ],
//
// so the value is the line after the one naming the field. When a marker
// shows up more than once, the last occurrence wins.

use tracing::debug;

use super::document::Document;
use crate::error::Error;

const PAGE: &str = "system info";

const MAC_MARKER: &str = "macStr";
const FIRMWARE_MARKER: &str = "firmwareStr";
const HARDWARE_MARKER: &str = "hardwareStr";

/// Identity strings as the switch reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub mac_address: String,
    pub firmware_version: String,
    pub hardware_version: String,
}

/// Parse a raw `SystemInfoRpm.htm` body.
pub fn parse_system_info(text: &str) -> Result<SystemInfo, Error> {
    let doc = Document::parse(text);
    let script = doc
        .first_script()
        .ok_or_else(|| Error::malformed(PAGE, "page has no script"))?;
    let lines: Vec<&str> = script.split('\n').collect();

    let info = SystemInfo {
        mac_address: value_after(&lines, MAC_MARKER)?,
        firmware_version: value_after(&lines, FIRMWARE_MARKER)?,
        hardware_version: value_after(&lines, HARDWARE_MARKER)?,
    };
    debug!(mac = %info.mac_address, firmware = %info.firmware_version, "parsed system info");
    Ok(info)
}

fn value_after(lines: &[&str], marker: &str) -> Result<String, Error> {
    let idx = lines
        .iter()
        .rposition(|line| line.contains(marker))
        .ok_or_else(|| Error::malformed(PAGE, format!("no `{marker}` field")))?;
    let value = lines
        .get(idx + 1)
        .ok_or_else(|| Error::malformed(PAGE, format!("`{marker}` has no value line")))?;
    Ok(value.replace('"', "").trim().to_owned())
}
