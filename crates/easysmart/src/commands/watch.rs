//! `watch`: poll on an interval and print per-port packet rates.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use easysmart_core::{Monitor, MonitorState, Sample, Switch, SwitchConfig};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct RateView {
    port: u16,
    up: bool,
    rx_pps: Option<f64>,
    tx_pps: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SampleView {
    timestamp: DateTime<Utc>,
    ports: Vec<RateView>,
}

impl SampleView {
    fn new(sample: &Sample) -> Self {
        let ports = sample
            .poll
            .ports
            .iter()
            .map(|(index, port)| {
                let rates = sample.rates.get(index).copied().unwrap_or_default();
                RateView {
                    port: index.get(),
                    up: port.is_up(),
                    rx_pps: rates.ingress,
                    tx_pps: rates.egress,
                }
            })
            .collect();
        Self {
            timestamp: sample.poll.timestamp,
            ports,
        }
    }
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "RX pps")]
    rx: String,
    #[tabled(rename = "TX pps")]
    tx: String,
}

fn fmt_rate(rate: Option<f64>, color: bool) -> String {
    match rate {
        Some(r) => format!("{r:.2}"),
        None => output::paint_muted("-", color),
    }
}

fn to_row(v: &RateView, color: bool) -> RateRow {
    RateRow {
        port: v.port,
        status: output::paint_up(v.up, color),
        rx: fmt_rate(v.rx_pps, color),
        tx: fmt_rate(v.tx_pps, color),
    }
}

fn render_sample(view: &SampleView, format: &OutputFormat, color: bool) -> String {
    match format {
        // One object per line keeps the stream greppable
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(view),
        OutputFormat::Table => {
            let table = output::render_list(format, &view.ports, |v| to_row(v, color), |_| String::new());
            format!("{}\n{table}", view.timestamp.format("%Y-%m-%d %H:%M:%S UTC"))
        }
        _ => output::render_single(
            format,
            view,
            |_| String::new(),
            |v| {
                v.ports
                    .iter()
                    .map(|p| {
                        format!(
                            "{} {} {}",
                            p.port,
                            p.rx_pps.map_or_else(|| "-".into(), |r| format!("{r:.2}")),
                            p.tx_pps.map_or_else(|| "-".into(), |r| format!("{r:.2}")),
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        ),
    }
}

fn poll_period(args: &WatchArgs, config: &SwitchConfig) -> Result<Duration, CliError> {
    match args.interval {
        Some(0) => Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        }),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(config.scan_interval),
    }
}

pub async fn handle(
    config: SwitchConfig,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let period = poll_period(args, &config)?;
    let color = output::should_color(&global.color);

    let switch = Switch::new(config)?;
    switch.login().await?;
    let monitor = Monitor::spawn(switch, period);
    let mut rx = monitor.subscribe();

    let mut seen_attempts = 0;
    let mut printed = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    // Sender dropped: the poll task stopped on its own
                    return monitor.join().await.map_err(CliError::from);
                }
                let state: MonitorState = rx.borrow_and_update().clone();
                if state.attempts == seen_attempts {
                    continue;
                }
                seen_attempts = state.attempts;

                if state.last_update_success {
                    if let Some(sample) = state.latest {
                        let view = SampleView::new(&sample);
                        output::print_output(&render_sample(&view, &global.output, color), global.quiet);
                        printed += 1;
                        if args.count.is_some_and(|n| printed >= n) {
                            break;
                        }
                    }
                } else if let Some(err) = state.last_error {
                    if !global.quiet {
                        eprintln!("poll failed: {err}");
                    }
                }
            }
        }
    }

    monitor.shutdown().await?;
    Ok(())
}
