//! `info`: device identity plus a one-line port summary.

use serde::Serialize;

use easysmart_core::{Switch, SwitchConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct SwitchInfo {
    name: String,
    host: String,
    model: String,
    mac_address: String,
    firmware_version: String,
    hardware_version: String,
    configuration_url: String,
    layout: Option<String>,
    port_count: usize,
    ports_up: usize,
}

fn detail(i: &SwitchInfo) -> String {
    [
        format!("Name:      {}", i.name),
        format!("Model:     {}", i.model),
        format!("MAC:       {}", i.mac_address),
        format!("Firmware:  {}", i.firmware_version),
        format!("Hardware:  {}", i.hardware_version),
        format!("Web UI:    {}", i.configuration_url),
        format!("Layout:    {}", i.layout.as_deref().unwrap_or("-")),
        format!("Ports:     {} ({} up)", i.port_count, i.ports_up),
    ]
    .join("\n")
}

pub async fn handle(config: SwitchConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let info = Switch::oneshot(config, |switch| async move {
        let identity = switch.fetch_identity().await?;
        let poll = switch.fetch_port_data().await?;
        let layout = switch.firmware_layout().await;

        Ok(SwitchInfo {
            name: identity.display_name(),
            model: identity.model(),
            configuration_url: identity.configuration_url(),
            host: identity.host,
            mac_address: identity.mac_address,
            firmware_version: identity.firmware_version,
            hardware_version: identity.hardware_version,
            layout: layout.as_ref().map(ToString::to_string),
            port_count: poll.port_count(),
            ports_up: poll.ports_up(),
        })
    })
    .await?;

    let out = output::render_single(&global.output, &info, detail, |i| i.mac_address.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
