// ── Packet rate derivation ──
//
// Packets-per-second from successive samples of a monotonic counter.
// One estimator per (port, direction) series; the tracker creates them
// lazily as ports appear in poll results.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{PollResult, PortIndex, PortSnapshot};

/// Per-series rate state: the last counter value and when it was seen.
#[derive(Debug, Clone, Default)]
pub struct RateEstimator {
    last: Option<(u64, DateTime<Utc>)>,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new sample, returning packets per second rounded to two
    /// decimal places.
    ///
    /// Returns `None` on the first sample, when the counter went
    /// backwards (wraparound or switch reboot), and when `at` is not
    /// later than the previous sample. The sample always becomes the new
    /// baseline.
    pub fn observe(&mut self, value: u64, at: DateTime<Utc>) -> Option<f64> {
        let (last_value, last_at) = self.last.replace((value, at))?;

        let delta = value.checked_sub(last_value)?;
        let elapsed = (at - last_at).num_microseconds()?;
        if elapsed <= 0 {
            return None;
        }

        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let rate = delta as f64 / (elapsed as f64 / 1_000_000.0);
        Some(round_hundredths(rate))
    }

    /// The baseline counter value, if any sample has been seen.
    pub fn last_value(&self) -> Option<u64> {
        self.last.map(|(value, _)| value)
    }

    /// Forget the baseline; the next sample yields `None`.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Directions and trackers ─────────────────────────────────────────

/// Which good-packet counter a rate is derived from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Received packets (`RxGoodPkt`).
    Ingress,
    /// Transmitted packets (`TxGoodPkt`).
    Egress,
}

impl Direction {
    pub const ALL: [Self; 2] = [Self::Ingress, Self::Egress];

    pub fn counter(self, port: &PortSnapshot) -> u64 {
        match self {
            Self::Ingress => port.rx_good_packets,
            Self::Egress => port.tx_good_packets,
        }
    }
}

/// Rates for one port at one poll. `None` where no rate could be derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortRates {
    pub ingress: Option<f64>,
    pub egress: Option<f64>,
}

impl PortRates {
    pub fn get(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Ingress => self.ingress,
            Direction::Egress => self.egress,
        }
    }
}

/// Owns one estimator per (port, direction).
#[derive(Debug, Default)]
pub struct RateTracker {
    series: HashMap<(PortIndex, Direction), RateEstimator>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a poll into every series. Series for ports missing from the
    /// poll are dropped, so a port that reappears starts fresh.
    pub fn observe(&mut self, poll: &PollResult) -> BTreeMap<PortIndex, PortRates> {
        self.series.retain(|(port, _), _| poll.ports.contains_key(port));

        let mut rates = BTreeMap::new();
        for (&port, snapshot) in &poll.ports {
            let mut port_rates = PortRates::default();
            for direction in Direction::ALL {
                let rate = self
                    .series
                    .entry((port, direction))
                    .or_default()
                    .observe(direction.counter(snapshot), poll.timestamp);
                match direction {
                    Direction::Ingress => port_rates.ingress = rate,
                    Direction::Egress => port_rates.egress = rate,
                }
            }
            rates.insert(port, port_rates);
        }
        rates
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}
