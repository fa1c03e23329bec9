// ── Port state decoding ──
//
// Turns the raw `state` / `link_status` / `pkts` arrays into typed port
// snapshots. Either every port decodes or the whole page is rejected.

use std::collections::BTreeMap;

use easysmart_api::RawFields;
use easysmart_api::page::COUNTERS_PER_PORT;
use easysmart_api::page::fields::{LINK_STATUS, PKTS, STATE};

use crate::error::CoreError;
use crate::model::{LinkStatus, PortIndex, PortSnapshot, PortState};

/// Decode `port_count` ports from the raw fields.
///
/// Cells beyond `port_count` are ignored. A short array, an unknown code
/// or a non-numeric counter fails the whole decode.
pub fn decode_ports(
    fields: &RawFields,
    port_count: usize,
) -> Result<BTreeMap<PortIndex, PortSnapshot>, CoreError> {
    let states = fields.cells(STATE)?;
    let links = fields.cells(LINK_STATUS)?;
    let pkts = fields.cells(PKTS)?;

    if port_count == 0 {
        return Ok(BTreeMap::new());
    }

    let counters_needed = port_count
        .checked_mul(COUNTERS_PER_PORT)
        .ok_or_else(|| CoreError::malformed(format!("{port_count} ports is not a port count")))?;
    if states.len() < port_count || links.len() < port_count || pkts.len() < counters_needed {
        return Err(CoreError::malformed(format!(
            "expected {port_count} ports ({counters_needed} counters) but found {} states, {} link statuses and {} counters",
            states.len(),
            links.len(),
            pkts.len()
        )));
    }

    let rows = states
        .iter()
        .zip(&links)
        .zip(pkts.chunks_exact(COUNTERS_PER_PORT))
        .take(port_count);

    let mut ports = BTreeMap::new();
    for (offset, ((state, link), counters)) in rows.enumerate() {
        let index = u16::try_from(offset + 1)
            .ok()
            .and_then(PortIndex::new)
            .ok_or_else(|| CoreError::malformed(format!("port number {} out of range", offset + 1)))?;

        let state = PortState::from_code(state).ok_or_else(|| {
            CoreError::malformed(format!("port {index}: unknown state code `{state}`"))
        })?;
        let link_status = LinkStatus::from_code(link).ok_or_else(|| {
            CoreError::malformed(format!("port {index}: unknown link status code `{link}`"))
        })?;

        let [tx_good, tx_bad, rx_good, rx_bad] = counters else {
            return Err(CoreError::malformed(format!("port {index}: incomplete counters")));
        };

        ports.insert(
            index,
            PortSnapshot {
                state,
                link_status,
                tx_good_packets: parse_counter(index, "TxGoodPkt", tx_good)?,
                tx_bad_packets: parse_counter(index, "TxBadPkt", tx_bad)?,
                rx_good_packets: parse_counter(index, "RxGoodPkt", rx_good)?,
                rx_bad_packets: parse_counter(index, "RxBadPkt", rx_bad)?,
            },
        );
    }

    Ok(ports)
}

fn parse_counter(index: PortIndex, name: &str, cell: &str) -> Result<u64, CoreError> {
    cell.parse().map_err(|_| {
        CoreError::malformed(format!("port {index}: {name} `{cell}` is not a counter"))
    })
}
