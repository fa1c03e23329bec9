#![allow(clippy::unwrap_used)]
// Integration tests for the `Switch` facade using wiremock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use easysmart_api::{EasySmartClient, TransportConfig};
use easysmart_core::{
    CoreError, FirmwareLayout, LinkStatus, ManualClock, PortIndex, PortState, Switch, SwitchConfig,
};

const SIMPLE: &str = include_str!("../../easysmart-api/tests/fixtures/port_stats_simple.htm");
const CONVOLUTED: &str =
    include_str!("../../easysmart-api/tests/fixtures/port_stats_convoluted.htm");
const SYSTEM_INFO: &str = include_str!("../../easysmart-api/tests/fixtures/system_info.htm");

// ── Helpers ─────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn config_for(server: &MockServer, timeout: Duration) -> SwitchConfig {
    SwitchConfig {
        timeout,
        ..SwitchConfig::new(server.uri(), SecretString::from("s3cret".to_owned()))
    }
}

async fn setup() -> (MockServer, Switch, Arc<ManualClock>) {
    setup_with_timeout(Duration::from_secs(5)).await
}

async fn setup_with_timeout(timeout: Duration) -> (MockServer, Switch, Arc<ManualClock>) {
    let server = MockServer::start().await;
    let config = config_for(&server, timeout);
    let client =
        EasySmartClient::new(&config.host, &TransportConfig::with_timeout(timeout)).unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let switch = Switch::with_client(config, client, clock.clone());
    (server, switch, clock)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(body)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/logon.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_stats(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn port(n: u16) -> PortIndex {
    PortIndex::new(n).unwrap()
}

// ── Port data ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_simple_page_decodes_all_ports() {
    let (server, switch, _clock) = setup().await;
    mount_stats(&server, SIMPLE).await;

    assert_eq!(switch.port_count(), 0);
    let poll = switch.fetch_port_data().await.unwrap();

    let indices: Vec<u16> = poll.ports.keys().map(|p| p.get()).collect();
    assert_eq!(indices, (1..=8).collect::<Vec<u16>>());
    assert_eq!(switch.port_count(), 8);
    assert_eq!(switch.firmware_layout().await, Some(FirmwareLayout::Simple));
    assert_eq!(poll.timestamp, t0());

    let p1 = poll.port(port(1)).unwrap();
    assert_eq!(p1.state, PortState::Enabled);
    assert_eq!(p1.link_status, LinkStatus::Full1000M);
    assert_eq!(
        (p1.tx_good_packets, p1.tx_bad_packets, p1.rx_good_packets, p1.rx_bad_packets),
        (1205, 0, 1302, 0)
    );

    let p3 = poll.port(port(3)).unwrap();
    assert_eq!(p3.link_status, LinkStatus::Full100M);
    assert_eq!((p3.tx_bad_packets, p3.rx_bad_packets), (1, 2));

    let p8 = poll.port(port(8)).unwrap();
    assert_eq!(p8.state, PortState::Disabled);
    assert!(!p8.is_up());

    assert_eq!(poll.ports_up(), 3);
}

#[tokio::test]
async fn test_both_layouts_decode_identically() {
    let (simple_server, simple_switch, _) = setup().await;
    mount_stats(&simple_server, SIMPLE).await;
    let (convoluted_server, convoluted_switch, _) = setup().await;
    mount_stats(&convoluted_server, CONVOLUTED).await;

    let simple = simple_switch.fetch_port_data().await.unwrap();
    let convoluted = convoluted_switch.fetch_port_data().await.unwrap();

    assert_eq!(
        convoluted_switch.firmware_layout().await,
        Some(FirmwareLayout::Convoluted)
    );
    assert_eq!(simple.ports, convoluted.ports);
}

#[tokio::test]
async fn test_timestamps_come_from_clock() {
    let (server, switch, clock) = setup().await;
    mount_stats(&server, SIMPLE).await;

    let first = switch.fetch_port_data().await.unwrap();
    clock.advance(TimeDelta::seconds(30));
    let second = switch.fetch_port_data().await.unwrap();

    assert_eq!(second.timestamp - first.timestamp, TimeDelta::seconds(30));
}

#[tokio::test]
async fn test_unknown_code_rejects_page_and_keeps_port_count() {
    let (server, switch, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(SIMPLE))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_stats(
        &server,
        "<script>\nvar max_port_num = 2;\nvar all_info = {\nstate:[1,9,0,0],\nlink_status:[6,6,0,0],\npkts:[0,0,0,0,0,0,0,0,0,0]\n};\n</script>",
    )
    .await;

    switch.fetch_port_data().await.unwrap();
    let result = switch.fetch_port_data().await;

    assert!(
        matches!(result, Err(CoreError::MalformedResponse { .. })),
        "expected MalformedResponse, got: {result:?}"
    );
    assert_eq!(switch.port_count(), 8);
}

// ── Session and errors ──────────────────────────────────────────────

#[tokio::test]
async fn test_rejected_session_is_invalid_auth() {
    let (server, switch, _) = setup().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    switch.login().await.unwrap();
    let result = switch.fetch_port_data().await;

    assert!(
        matches!(result, Err(CoreError::InvalidAuth { .. })),
        "expected InvalidAuth, got: {result:?}"
    );
}

#[tokio::test]
async fn test_timeout_is_cannot_connect_and_switch_stays_usable() {
    let (server, switch, _) = setup_with_timeout(Duration::from_millis(200)).await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(SIMPLE).set_delay(Duration::from_secs(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_stats(&server, SIMPLE).await;

    let first = switch.fetch_port_data().await;
    assert!(
        matches!(first, Err(CoreError::CannotConnect { .. })),
        "expected CannotConnect, got: {first:?}"
    );

    let second = switch.fetch_port_data().await.unwrap();
    assert_eq!(second.ports.len(), 8);
}

#[tokio::test]
async fn test_unreachable_host_is_cannot_connect() {
    let config = SwitchConfig {
        timeout: Duration::from_secs(2),
        ..SwitchConfig::new("127.0.0.1:1", SecretString::from(String::new()))
    };
    let switch = Switch::new(config).unwrap();

    let result = switch.login().await;

    assert!(
        matches!(result, Err(CoreError::CannotConnect { .. })),
        "expected CannotConnect, got: {result:?}"
    );
}

#[tokio::test]
async fn test_concurrent_fetches_both_succeed() {
    let (server, switch, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(SIMPLE).set_delay(Duration::from_millis(100)))
        .expect(2)
        .mount(&server)
        .await;

    let other = switch.clone();
    let (a, b) = tokio::join!(switch.fetch_port_data(), other.fetch_port_data());

    assert_eq!(a.unwrap().ports, b.unwrap().ports);
}

// ── Identity and lifecycle ──────────────────────────────────────────

#[tokio::test]
async fn test_connect_caches_identity() {
    let (server, switch, _) = setup().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/SystemInfoRpm.htm"))
        .respond_with(html(SYSTEM_INFO))
        .mount(&server)
        .await;

    assert_eq!(switch.identity().await, None);
    let identity = switch.connect().await.unwrap();

    assert_eq!(identity.mac_address, "50:C7:BF:01:02:03");
    assert_eq!(identity.hardware_version, "TL-SG108E 3.0");
    assert_eq!(identity.host, server.uri());
    assert_eq!(switch.identity().await, Some(identity));
}

#[tokio::test]
async fn test_verify_logs_in_then_fetches() {
    let (server, switch, _) = setup().await;
    Mock::given(method("POST"))
        .and(path("/logon.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_stats(&server, CONVOLUTED).await;

    let poll = switch.verify().await.unwrap();
    assert_eq!(poll.ports.len(), 8);
}

#[tokio::test]
async fn test_oneshot_runs_closure_after_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logon.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_stats(&server, SIMPLE).await;

    let config = config_for(&server, Duration::from_secs(5));
    let ports = Switch::oneshot(config, |switch| async move {
        let poll = switch.fetch_port_data().await?;
        Ok(poll.ports.len())
    })
    .await
    .unwrap();

    assert_eq!(ports, 8);
}
