pub mod snapshot;
pub mod watch;

use std::path::Path;
use std::time::Duration;

use netdev_core::{AcquisitionConfig, InterfaceSample};

/// Load the config file if one was given, otherwise defaults.
pub fn load_config(path: Option<&str>) -> AcquisitionConfig {
    let Some(path) = path else {
        return AcquisitionConfig::default();
    };
    match AcquisitionConfig::from_json_file(Path::new(path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(2);
        }
    }
}

/// Parse "500ms", "2s", "1m", "1h"; a bare number is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        (s, 1000)
    };

    let value: u64 = numeric.trim().parse().ok()?;
    (value > 0).then(|| Duration::from_millis(value * multiplier))
}

pub fn format_bytes(value: f64) -> String {
    let mut v = value.abs();
    let units = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut idx = 0usize;
    while v >= 1024.0 && idx < units.len() - 1 {
        v /= 1024.0;
        idx += 1;
    }
    format!("{v:.2}{}", units[idx])
}

pub fn format_speed(bps: u64) -> String {
    match bps {
        0 => "-".to_string(),
        b if b % 1_000_000_000 == 0 => format!("{}G", b / 1_000_000_000),
        b if b < 1_000_000 => format!("{b}"),
        b => format!("{}M", b / 1_000_000),
    }
}

/// Print one table of delta-derived samples.
pub fn print_rates(samples: &[InterfaceSample]) {
    println!(
        "{:<12} {:>12} {:>12} {:>9} {:>9} {:>8} {:>8} {:>7} {:>7} {:>7} {:>6} {:>7}",
        "Interface",
        "rx/s",
        "tx/s",
        "rPk/s",
        "wPk/s",
        "rAvs",
        "wAvs",
        "rUtil",
        "wUtil",
        "%Util",
        "Speed",
        "Sat/s"
    );
    for s in samples {
        println!(
            "{:<12} {:>12} {:>12} {:>9.1} {:>9.1} {:>8.1} {:>8.1} {:>6.2}% {:>6.2}% {:>6.2}% {:>6} {:>7.1}",
            s.name,
            format_bytes(s.rx_bytes),
            format_bytes(s.tx_bytes),
            s.rx_packets,
            s.tx_packets,
            s.rx_avg_size,
            s.tx_avg_size,
            s.rx_util,
            s.tx_util,
            s.utilization,
            format_speed(s.speed_bps),
            s.saturation,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_suffixes() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2s"), Some(Duration::from_secs(2)));
        assert_eq!(parse_duration("1m"), Some(Duration::from_secs(60)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("3"), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("0s"), None);
        assert_eq!(parse_duration("-1s"), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512.0), "512.00B");
        assert_eq!(format_bytes(1536.0), "1.50KiB");
        assert_eq!(format_bytes(3.0 * 1024.0 * 1024.0), "3.00MiB");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(0), "-");
        assert_eq!(format_speed(1_000_000_000), "1G");
        assert_eq!(format_speed(100_000_000), "100M");
        assert_eq!(format_speed(56_000), "56000");
    }
}
