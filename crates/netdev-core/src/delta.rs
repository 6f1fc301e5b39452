//! Per-second rates and link utilization from two snapshots.
//!
//! [`delta`] is pure: it holds no state and the same inputs always produce the
//! same output. Entries are correlated by interface name and the output keeps
//! the order of `current`, one entry per current interface.
//!
//! Utilization is a percentage of link capacity, capped at 100:
//!
//! - receive / transmit: `byte_rate * 8 * 100 / speed_bps`
//! - full duplex overall: the larger of the two directions
//! - half duplex overall: both directions summed against the shared channel
//! - unknown duplex overall: 0
//! - unknown speed (0): all three are 0

use std::collections::HashMap;

use crate::error::{NetdevError, Result};
use crate::sample::{Duplex, InterfaceSample, LinkInfo, Snapshot};

/// Compute per-second metrics from `previous` to `current`.
///
/// `ticks` is the source's time-basis units per second (see
/// [`crate::NetdevSource::ticks_per_second`]). Both snapshots must hold the
/// same number of interfaces.
pub fn delta(previous: &Snapshot, current: &Snapshot, ticks: f64) -> Result<Snapshot> {
    if previous.len() != current.len() {
        return Err(NetdevError::SnapshotShapeMismatch {
            previous: previous.len(),
            current: current.len(),
        });
    }

    let by_name: HashMap<&str, &InterfaceSample> =
        previous.iter().map(|s| (s.name.as_str(), s)).collect();

    let out = current
        .iter()
        .map(|curr| {
            if curr.is_inactive() {
                return InterfaceSample::named(&curr.name);
            }
            match by_name.get(curr.name.as_str()) {
                Some(prev) => interface_delta(prev, curr, ticks),
                None => {
                    log::debug!("{} appeared since the previous snapshot", curr.name);
                    InterfaceSample::named(&curr.name)
                }
            }
        })
        .collect::<Vec<_>>();

    Ok(Snapshot::new(out))
}

/// Counter increase per second; 0 on a counter reset or a non-positive
/// interval.
fn rate(prev: f64, curr: f64, itv: f64, ticks: f64) -> f64 {
    if curr > prev && itv > 0.0 {
        (curr - prev) / itv * ticks
    } else {
        0.0
    }
}

fn average(bytes: f64, packets: f64) -> f64 {
    if packets > 0.0 { bytes / packets } else { 0.0 }
}

/// `(rx_util, tx_util, utilization)` in percent.
pub fn utilization(rx_byte_rate: f64, tx_byte_rate: f64, link: LinkInfo) -> (f64, f64, f64) {
    if link.speed_bps == 0 {
        return (0.0, 0.0, 0.0);
    }
    let speed = link.speed_bps as f64;
    let percent = |byte_rate: f64| (byte_rate * 8.0 * 100.0 / speed).min(100.0);

    let rx = percent(rx_byte_rate);
    let tx = percent(tx_byte_rate);
    let overall = match link.duplex {
        Duplex::Full => rx.max(tx),
        Duplex::Half => percent(rx_byte_rate + tx_byte_rate),
        Duplex::Unknown => 0.0,
    };
    (rx, tx, overall)
}

fn interface_delta(prev: &InterfaceSample, curr: &InterfaceSample, ticks: f64) -> InterfaceSample {
    let itv = curr.uptime - prev.uptime;
    if itv <= 0.0 || itv.is_nan() {
        log::warn!(
            "{}: non-positive interval {itv} between snapshots, reporting zero rates",
            curr.name
        );
    }
    let r = |p: f64, c: f64| rate(p, c, itv, ticks);

    let mut out = InterfaceSample::named(&curr.name);
    out.set_link(curr.link());
    out.uptime = curr.uptime;

    out.rx_bytes = r(prev.rx_bytes, curr.rx_bytes);
    out.tx_bytes = r(prev.tx_bytes, curr.tx_bytes);
    out.rx_packets = r(prev.rx_packets, curr.rx_packets);
    out.tx_packets = r(prev.tx_packets, curr.tx_packets);
    out.rx_errors = r(prev.rx_errors, curr.rx_errors);
    out.tx_errors = r(prev.tx_errors, curr.tx_errors);
    out.tx_collisions = r(prev.tx_collisions, curr.tx_collisions);
    out.saturation = r(prev.saturation, curr.saturation);

    out.rx_avg_size = average(out.rx_bytes, out.rx_packets);
    out.tx_avg_size = average(out.tx_bytes, out.tx_packets);
    out.packets = curr.rx_packets + curr.tx_packets;

    (out.rx_util, out.tx_util, out.utilization) =
        utilization(out.rx_bytes, out.tx_bytes, curr.link());

    out
}
