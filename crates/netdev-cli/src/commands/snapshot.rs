use netdev_core::{LocalSource, NetdevSource};

pub fn run(config_path: Option<&str>, json: bool) {
    let config = super::load_config(config_path);
    let mut source = LocalSource::from_config(&config);

    let snapshot = match source.acquire() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading interfaces: {e}");
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error encoding snapshot: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!(
        "{:<12} {:>16} {:>12} {:>16} {:>12} {:>10} {:>8} {:>8}",
        "Interface", "rx bytes", "rx packets", "tx bytes", "tx packets", "saturation", "speed", "duplex"
    );
    for s in &snapshot {
        println!(
            "{:<12} {:>16.0} {:>12.0} {:>16.0} {:>12.0} {:>10.0} {:>8} {:>8}",
            s.name,
            s.rx_bytes,
            s.rx_packets,
            s.tx_bytes,
            s.tx_packets,
            s.saturation,
            super::format_speed(s.speed_bps),
            s.duplex.to_string(),
        );
    }
    if snapshot.is_empty() {
        println!("  (no interfaces)");
    }
}
