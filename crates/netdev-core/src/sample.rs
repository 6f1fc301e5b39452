//! Per-interface samples and ordered snapshots.
//!
//! Raw samples (straight from acquisition) and derived samples (produced by
//! [`crate::delta`]) share one type. In raw samples the counter fields hold
//! cumulative totals and the derived fields are zero; in derived samples the
//! counter fields hold per-second rates.

use serde::{Deserialize, Serialize};

/// Link duplex mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duplex {
    /// Send and receive have independent capacity.
    Full,
    /// Send and receive contend for one channel.
    Half,
    #[default]
    Unknown,
}

impl Duplex {
    /// Decode the numeric duplex code used by ethtool and the telemetry
    /// extension: 0 is half, 1 is full, anything else is unknown.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Half,
            1 => Self::Full,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Duplex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Half => write!(f, "half"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Negotiated link properties of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Link speed in bits per second; 0 when unknown.
    pub speed_bps: u64,
    pub duplex: Duplex,
}

impl LinkInfo {
    pub const UNKNOWN: Self = Self {
        speed_bps: 0,
        duplex: Duplex::Unknown,
    };
}

/// One interface's counters at one instant (raw) or over one interval
/// (derived).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceSample {
    pub name: String,
    pub speed_bps: u64,
    pub duplex: Duplex,

    // receive
    pub rx_bytes: f64,
    pub rx_packets: f64,
    pub rx_errors: f64,
    pub rx_drops: f64,
    pub rx_fifo: f64,
    pub rx_frame: f64,
    pub rx_compressed: f64,
    pub rx_multicast: f64,

    // transmit
    pub tx_bytes: f64,
    pub tx_packets: f64,
    pub tx_errors: f64,
    pub tx_drops: f64,
    pub tx_fifo: f64,
    pub tx_collisions: f64,
    pub tx_carrier: f64,
    pub tx_compressed: f64,

    // derived
    /// Errors, drops, collisions and carrier losses; cumulative in raw
    /// samples, per second in derived ones.
    pub saturation: f64,
    /// Average size of received packets in bytes.
    pub rx_avg_size: f64,
    /// Average size of transmitted packets in bytes.
    pub tx_avg_size: f64,
    /// Cumulative received plus transmitted packets (never differenced).
    pub packets: f64,
    /// Receive utilization, percent of link capacity.
    pub rx_util: f64,
    /// Transmit utilization, percent of link capacity.
    pub tx_util: f64,
    /// Overall utilization, percent of link capacity.
    pub utilization: f64,

    /// Host uptime at capture, in the source's time basis.
    pub uptime: f64,
}

/// Number of counters per interface, in `/proc/net/dev` column order.
pub const COUNTER_COUNT: usize = 16;

impl InterfaceSample {
    /// All-zero sample carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a raw sample from the 16 counters in `/proc/net/dev` order:
    /// rx bytes, packets, errs, drop, fifo, frame, compressed, multicast,
    /// then tx bytes, packets, errs, drop, fifo, colls, carrier, compressed.
    pub fn from_counters(name: impl Into<String>, c: &[f64; COUNTER_COUNT]) -> Self {
        let mut s = Self {
            name: name.into(),
            rx_bytes: c[0],
            rx_packets: c[1],
            rx_errors: c[2],
            rx_drops: c[3],
            rx_fifo: c[4],
            rx_frame: c[5],
            rx_compressed: c[6],
            rx_multicast: c[7],
            tx_bytes: c[8],
            tx_packets: c[9],
            tx_errors: c[10],
            tx_drops: c[11],
            tx_fifo: c[12],
            tx_collisions: c[13],
            tx_carrier: c[14],
            tx_compressed: c[15],
            ..Self::default()
        };
        s.saturation = s.saturation_total();
        s
    }

    /// Composite health counter: receive errors and drops, transmit drops,
    /// fifo errors, collisions and carrier losses.
    pub fn saturation_total(&self) -> f64 {
        self.rx_errors
            + self.rx_drops
            + self.tx_drops
            + self.tx_fifo
            + self.tx_collisions
            + self.tx_carrier
    }

    pub fn set_link(&mut self, link: LinkInfo) {
        self.speed_bps = link.speed_bps;
        self.duplex = link.duplex;
    }

    pub fn link(&self) -> LinkInfo {
        LinkInfo {
            speed_bps: self.speed_bps,
            duplex: self.duplex,
        }
    }

    /// No packets seen in either direction.
    pub fn is_inactive(&self) -> bool {
        self.rx_packets + self.tx_packets == 0.0
    }
}

/// Ordered capture of all monitored interfaces at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    samples: Vec<InterfaceSample>,
}

impl Snapshot {
    pub fn new(samples: Vec<InterfaceSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InterfaceSample> {
        self.samples.iter()
    }

    pub fn samples(&self) -> &[InterfaceSample] {
        &self.samples
    }

    /// Look an interface up by name.
    pub fn get(&self, name: &str) -> Option<&InterfaceSample> {
        self.samples.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.name.as_str())
    }
}

impl From<Vec<InterfaceSample>> for Snapshot {
    fn from(samples: Vec<InterfaceSample>) -> Self {
        Self::new(samples)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a InterfaceSample;
    type IntoIter = std::slice::Iter<'a, InterfaceSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplex_codes() {
        assert_eq!(Duplex::from_code(0), Duplex::Half);
        assert_eq!(Duplex::from_code(1), Duplex::Full);
        assert_eq!(Duplex::from_code(2), Duplex::Unknown);
        assert_eq!(Duplex::from_code(-1), Duplex::Unknown);
        assert_eq!(Duplex::from_code(255), Duplex::Unknown);
    }

    #[test]
    fn counters_map_in_column_order() {
        let c: [f64; COUNTER_COUNT] = std::array::from_fn(|i| (i + 1) as f64);
        let s = InterfaceSample::from_counters("eth0", &c);
        assert_eq!(s.rx_bytes, 1.0);
        assert_eq!(s.rx_multicast, 8.0);
        assert_eq!(s.tx_bytes, 9.0);
        assert_eq!(s.tx_collisions, 14.0);
        assert_eq!(s.tx_compressed, 16.0);
        // rx errs 3 + rx drop 4 + tx drop 12 + tx fifo 13 + colls 14 + carrier 15
        assert_eq!(s.saturation, 61.0);
        assert_eq!(s.utilization, 0.0);
    }

    #[test]
    fn inactive_means_no_packets_either_way() {
        let mut s = InterfaceSample::named("lo");
        assert!(s.is_inactive());
        s.tx_packets = 1.0;
        assert!(!s.is_inactive());
    }

    #[test]
    fn snapshot_serializes_as_plain_list() {
        let snap = Snapshot::new(vec![InterfaceSample::named("eth0")]);
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "eth0");
        assert_eq!(json[0]["duplex"], "unknown");
        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn snapshot_lookup_by_name() {
        let snap = Snapshot::from(vec![
            InterfaceSample::named("eth0"),
            InterfaceSample::named("wlan0"),
        ]);
        assert!(snap.get("wlan0").is_some());
        assert!(snap.get("eth1").is_none());
        assert_eq!(snap.names().collect::<Vec<_>>(), vec!["eth0", "wlan0"]);
    }
}
