//! Basic interface rate example.
//!
//! Takes two snapshots of the local interfaces one second apart and prints
//! per-second throughput and utilization.
//!
//! Run: `cargo run --example basic`

use std::time::Duration;

use netdev_core::{AcquisitionConfig, LocalSource, NetdevSource, delta};

fn main() -> netdev_core::Result<()> {
    let mut source = LocalSource::from_config(&AcquisitionConfig::default());

    let previous = source.acquire()?;
    println!("Interfaces: {}", previous.names().collect::<Vec<_>>().join(", "));

    std::thread::sleep(Duration::from_secs(1));
    let current = source.acquire()?;

    for iface in &delta(&previous, &current, source.ticks_per_second())? {
        println!(
            "{:<12} rx {:>10.0} B/s  tx {:>10.0} B/s  util {:>6.2}% ({})",
            iface.name,
            iface.rx_bytes,
            iface.tx_bytes,
            iface.utilization,
            iface.duplex.to_string(),
        );
    }
    Ok(())
}
