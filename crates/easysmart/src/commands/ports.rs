//! `ports`: one statistics poll, rendered per port.

use serde::Serialize;
use tabled::Tabled;

use easysmart_core::{LinkStatus, PortIndex, PortSnapshot, PortState, Switch, SwitchConfig};

use crate::cli::{GlobalOpts, PortsArgs};
use crate::error::CliError;
use crate::output;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PortView {
    port: u16,
    state: PortState,
    link_status: LinkStatus,
    up: bool,
    speed_mbps: Option<u32>,
    tx_good_packets: u64,
    tx_bad_packets: u64,
    rx_good_packets: u64,
    rx_bad_packets: u64,
}

impl PortView {
    fn new(index: PortIndex, p: &PortSnapshot) -> Self {
        Self {
            port: index.get(),
            state: p.state,
            link_status: p.link_status,
            up: p.is_up(),
            speed_mbps: p.link_status.speed_mbps(),
            tx_good_packets: p.tx_good_packets,
            tx_bad_packets: p.tx_bad_packets,
            rx_good_packets: p.rx_good_packets,
            rx_bad_packets: p.rx_bad_packets,
        }
    }
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "TX Good")]
    tx_good: u64,
    #[tabled(rename = "TX Bad")]
    tx_bad: u64,
    #[tabled(rename = "RX Good")]
    rx_good: u64,
    #[tabled(rename = "RX Bad")]
    rx_bad: u64,
}

fn to_row(v: &PortView, color: bool) -> PortRow {
    PortRow {
        port: v.port,
        status: output::paint_up(v.up, color),
        state: v.state.to_string(),
        link: v.link_status.to_string(),
        tx_good: v.tx_good_packets,
        tx_bad: v.tx_bad_packets,
        rx_good: v.rx_good_packets,
        rx_bad: v.rx_bad_packets,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: SwitchConfig,
    args: &PortsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let poll = Switch::oneshot(config, |switch| async move { switch.fetch_port_data().await }).await?;

    let views: Vec<PortView> = match args.port {
        Some(number) => {
            let snapshot = PortIndex::new(number)
                .and_then(|index| poll.port(index).map(|p| PortView::new(index, p)))
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "port".into(),
                    identifier: number.to_string(),
                    list_command: "ports".into(),
                })?;
            vec![snapshot]
        }
        None => poll
            .ports
            .iter()
            .map(|(&index, p)| PortView::new(index, p))
            .collect(),
    };
    let views: Vec<PortView> = views.into_iter().filter(|v| !args.up || v.up).collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &views,
        |v| to_row(v, color),
        |v| v.port.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
