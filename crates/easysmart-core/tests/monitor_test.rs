#![allow(clippy::unwrap_used)]
// Integration tests for the background poll monitor.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use easysmart_api::{EasySmartClient, TransportConfig};
use easysmart_core::{
    Clock, CoreError, MIN_PERIOD, Monitor, MonitorState, PortIndex, Switch, SwitchConfig,
};

/// Advances by a fixed step every time it is read.
#[derive(Debug)]
struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + self.step;
        now
    }
}

fn one_port_page(tx: u64, rx: u64) -> String {
    format!(
        "<script>\nvar max_port_num = 1;\nvar all_info = {{\nstate:[1,0,0],\nlink_status:[6,0,0],\npkts:[{tx},0,{rx},0,0,0]\n}};\n</script>"
    )
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(body)
}

async fn switch_for(server: &MockServer, timeout: Duration) -> Switch {
    let config = SwitchConfig {
        timeout,
        ..SwitchConfig::new(server.uri(), SecretString::from("pw".to_owned()))
    };
    let client =
        EasySmartClient::new(&config.host, &TransportConfig::with_timeout(timeout)).unwrap();
    let clock = Arc::new(SteppingClock {
        next: Mutex::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()),
        step: TimeDelta::seconds(10),
    });
    Switch::with_client(config, client, clock)
}

async fn wait_for(
    rx: &mut watch::Receiver<MonitorState>,
    done: impl Fn(&MonitorState) -> bool,
) -> MonitorState {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            {
                let state = rx.borrow_and_update();
                if done(&state) {
                    return state.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_monitor_publishes_rates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(&one_port_page(1000, 500)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(&one_port_page(1100, 700)))
        .mount(&server)
        .await;

    let switch = switch_for(&server, Duration::from_secs(5)).await;
    let monitor = Monitor::spawn(switch, MIN_PERIOD);
    let mut rx = monitor.subscribe();

    let first = wait_for(&mut rx, |s| s.attempts >= 1).await;
    assert!(first.last_update_success);
    let port1 = PortIndex::new(1).unwrap();
    let rates = first.latest.as_ref().unwrap().rates.get(&port1).copied().unwrap();
    assert_eq!(rates.ingress, None);
    assert_eq!(rates.egress, None);

    let second = wait_for(&mut rx, |s| s.attempts >= 2).await;
    let rates = second.latest.as_ref().unwrap().rates.get(&port1).copied().unwrap();
    assert_eq!(rates.egress, Some(10.0));
    assert_eq!(rates.ingress, Some(20.0));

    monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_monitor_keeps_last_sample_across_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(&one_port_page(1, 1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(&one_port_page(2, 2)).set_delay(Duration::from_secs(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(&one_port_page(3, 3)))
        .mount(&server)
        .await;

    let switch = switch_for(&server, Duration::from_millis(200)).await;
    let monitor = Monitor::spawn(switch, MIN_PERIOD);
    let mut rx = monitor.subscribe();

    let failed = wait_for(&mut rx, |s| s.attempts >= 2).await;
    assert!(!failed.last_update_success);
    assert!(failed.last_error.is_some());
    assert!(failed.latest.is_some(), "previous sample should survive");

    let recovered = wait_for(&mut rx, |s| s.attempts >= 3).await;
    assert!(recovered.last_update_success);
    assert_eq!(recovered.last_error, None);
    assert!(!monitor.is_finished());

    monitor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_monitor_stops_on_invalid_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let switch = switch_for(&server, Duration::from_secs(5)).await;
    let monitor = Monitor::spawn(switch, MIN_PERIOD);

    let result = tokio::time::timeout(Duration::from_secs(10), monitor.join())
        .await
        .unwrap();

    assert!(
        matches!(result, Err(CoreError::InvalidAuth { .. })),
        "expected InvalidAuth, got: {result:?}"
    );
}

#[tokio::test]
async fn test_monitor_raises_zero_period_to_minimum() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/PortStatisticsRpm.htm"))
        .respond_with(html(&one_port_page(1, 1)))
        .mount(&server)
        .await;

    let switch = switch_for(&server, Duration::from_secs(5)).await;
    let monitor = Monitor::spawn(switch, Duration::ZERO);
    let mut rx = monitor.subscribe();

    let first = wait_for(&mut rx, |s| s.attempts >= 1).await;
    assert!(first.last_update_success);
    assert!(!monitor.is_finished());

    monitor.shutdown().await.unwrap();
}
