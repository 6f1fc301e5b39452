//! Local acquisition from procfs.
//!
//! `/proc/net/dev` looks like:
//!
//! ```text
//! Inter-|   Receive                                                |  Transmit
//!  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
//!     lo:  123456     789    0    0    0     0          0         0   123456     789    0    0    0     0       0          0
//!   eth0: 9876543   12345    1    2    0     0          0        17  5432109    9876    0    3    0     4       5          0
//! ```

use std::path::Path;

use crate::config::{AcquisitionConfig, LocalConfig, TimeBasis};
use crate::error::{NetdevError, Result};
use crate::filter::InterfaceFilter;
use crate::link::{LinkInfoProvider, SysfsLinkInfo};
use crate::sample::{COUNTER_COUNT, InterfaceSample, LinkInfo, Snapshot};
use crate::source::{NetdevSource, SourceKind};
use crate::sources::SnapshotBuilder;

/// Header lines at the top of `/proc/net/dev`.
const HEADER_LINES: usize = 2;

/// Kernel clock ticks per second.
#[cfg(unix)]
pub fn clock_ticks() -> f64 {
    // SAFETY: `sysconf` is thread-safe for this query and has no side effects.
    let hz = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if hz > 0 { hz as f64 } else { 100.0 }
}

#[cfg(not(unix))]
pub fn clock_ticks() -> f64 {
    100.0
}

/// Reads counters of the machine running this process.
pub struct LocalSource {
    config: LocalConfig,
    filter: InterfaceFilter,
    link_info: Box<dyn LinkInfoProvider>,
    ticks: f64,
}

impl LocalSource {
    pub fn new(config: LocalConfig, filter: InterfaceFilter) -> Self {
        let ticks = match config.time_basis {
            TimeBasis::Seconds => 1.0,
            TimeBasis::Ticks => clock_ticks(),
        };
        let link_info = Box::new(SysfsLinkInfo::new(config.sysfs_net_root.clone()));
        Self {
            config,
            filter,
            link_info,
            ticks,
        }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(config.local.clone(), config.filter())
    }

    /// Replace the sysfs link lookup.
    pub fn with_link_info(mut self, provider: impl LinkInfoProvider + 'static) -> Self {
        self.link_info = Box::new(provider);
        self
    }

    fn read_uptime(&self) -> Result<f64> {
        let path = &self.config.uptime_path;
        let id = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| NetdevError::unavailable(&id, e))?;
        let seconds = raw
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| NetdevError::malformed(&id, 1, "expected uptime seconds"))?;
        Ok(seconds * self.ticks)
    }

    fn link(&self, iface: &str) -> LinkInfo {
        self.link_info.link_info(iface).unwrap_or_else(|e| {
            log::debug!("link info for {iface} unavailable: {e}");
            LinkInfo::UNKNOWN
        })
    }
}

impl NetdevSource for LocalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    fn ticks_per_second(&self) -> f64 {
        self.ticks
    }

    fn acquire(&mut self) -> Result<Snapshot> {
        let path = &self.config.netdev_path;
        let raw = std::fs::read_to_string(path)
            .map_err(|e| NetdevError::unavailable(path.display().to_string(), e))?;
        let uptime = self.read_uptime()?;

        let mut samples = parse_netdev(&raw, path, &self.filter)?;
        for s in &mut samples {
            s.uptime = uptime;
            let link = self.link(&s.name);
            s.set_link(link);
        }
        Ok(Snapshot::new(samples))
    }
}

/// Parse the full contents of a `/proc/net/dev`-format file, dropping
/// interfaces the filter excludes. Any malformed line fails the whole parse.
pub fn parse_netdev(
    raw: &str,
    source: &Path,
    filter: &InterfaceFilter,
) -> Result<Vec<InterfaceSample>> {
    let id = source.display().to_string();
    let mut out = SnapshotBuilder::default();

    for (idx, line) in raw.lines().enumerate().skip(HEADER_LINES) {
        let lineno = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let sample = parse_line(line).map_err(|detail| NetdevError::malformed(&id, lineno, detail))?;
        if filter.is_excluded(&sample.name) {
            log::debug!("skipping virtual interface {}", sample.name);
            continue;
        }
        out.push(sample, &id, lineno)?;
    }

    Ok(out.finish())
}

/// `name: 16 counters`, the space after the colon being optional.
fn parse_line(line: &str) -> std::result::Result<InterfaceSample, String> {
    let Some((name_raw, stats_raw)) = line.split_once(':') else {
        return Err("missing ':' after interface name".to_string());
    };
    let name = name_raw.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("bad interface name {name_raw:?}"));
    }

    let fields: Vec<&str> = stats_raw.split_whitespace().collect();
    if fields.len() != COUNTER_COUNT {
        return Err(format!(
            "expected {COUNTER_COUNT} counters, found {}",
            fields.len()
        ));
    }

    let mut counters = [0.0_f64; COUNTER_COUNT];
    for (i, field) in fields.iter().enumerate() {
        counters[i] = field
            .parse::<u64>()
            .map_err(|_| format!("counter {} is not an unsigned integer: {field:?}", i + 1))?
            as f64;
    }

    Ok(InterfaceSample::from_counters(name, &counters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::FixedLinkInfo;
    use crate::sample::Duplex;

    const HEADER: &str = "Inter-|   Receive                                                |  Transmit\n \
         face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n";

    fn netdev(body: &str) -> String {
        format!("{HEADER}{body}")
    }

    fn parse(body: &str) -> Result<Vec<InterfaceSample>> {
        parse_netdev(
            &netdev(body),
            Path::new("/proc/net/dev"),
            &InterfaceFilter::default(),
        )
    }

    #[test]
    fn parses_counters_and_saturation() {
        let rows = parse(
            "    lo:  100 2 0 0 0 0 0 0  100 2 0 0 0 0 0 0\n  \
             eth0: 9876543 12345 1 2 0 0 0 17 5432109 9876 0 3 0 4 5 0\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "lo");
        let eth0 = &rows[1];
        assert_eq!(eth0.name, "eth0");
        assert_eq!(eth0.rx_bytes, 9_876_543.0);
        assert_eq!(eth0.rx_multicast, 17.0);
        assert_eq!(eth0.tx_packets, 9876.0);
        assert_eq!(eth0.tx_collisions, 4.0);
        // rx errs 1 + rx drop 2 + tx drop 3 + tx fifo 0 + colls 4 + carrier 5
        assert_eq!(eth0.saturation, 15.0);
    }

    #[test]
    fn colon_without_space() {
        let rows = parse("eth0:1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16\n").unwrap();
        assert_eq!(rows[0].name, "eth0");
        assert_eq!(rows[0].rx_bytes, 1.0);
    }

    #[test]
    fn filters_virtual_interfaces() {
        let rows = parse(
            "docker0: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0\n\
             veth1a2b3c: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0\n\
             virbr0-nic: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0\n\
             enp3s0: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0\n",
        )
        .unwrap();
        let names: Vec<_> = rows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["enp3s0"]);
    }

    #[test]
    fn short_line_is_fatal() {
        let err = parse(
            "eth0: 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16\n\
             eth1: 1 2 3\n",
        )
        .unwrap_err();
        match err {
            NetdevError::MalformedRecord {
                source_id, line, ..
            } => {
                assert_eq!(source_id, "/proc/net/dev");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_counter_is_fatal() {
        let err = parse("eth0: 1 2 3 4 5 6 7 8 9 10 x 12 13 14 15 16\n").unwrap_err();
        assert!(matches!(err, NetdevError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn negative_counter_is_fatal() {
        let err = parse("eth0: 1 2 3 4 5 6 7 8 9 10 -11 12 13 14 15 16\n").unwrap_err();
        assert!(matches!(err, NetdevError::MalformedRecord { .. }));
    }

    #[test]
    fn missing_colon_is_fatal() {
        let err = parse("eth0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16\n").unwrap_err();
        assert!(matches!(err, NetdevError::MalformedRecord { .. }));
    }

    #[test]
    fn headers_only_is_empty() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn clock_ticks_is_positive() {
        assert!(clock_ticks() > 0.0);
    }

    fn fixture(dir: &Path, uptime: &str, body: &str) -> LocalConfig {
        let netdev_path = dir.join("dev");
        let uptime_path = dir.join("uptime");
        std::fs::write(&netdev_path, netdev(body)).unwrap();
        std::fs::write(&uptime_path, uptime).unwrap();
        LocalConfig {
            netdev_path,
            uptime_path,
            sysfs_net_root: dir.join("class-net"),
            time_basis: TimeBasis::Seconds,
        }
    }

    #[test]
    fn acquire_stamps_uptime_and_link() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = fixture(
            tmp.path(),
            "12345.67 54321.00\n",
            "eth0: 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16\n",
        );
        let link = LinkInfo {
            speed_bps: 1_000_000_000,
            duplex: Duplex::Full,
        };
        let mut src =
            LocalSource::new(cfg, InterfaceFilter::default()).with_link_info(FixedLinkInfo(link));
        let snap = src.acquire().unwrap();
        assert_eq!(snap.len(), 1);
        let eth0 = &snap.samples()[0];
        assert!((eth0.uptime - 12345.67).abs() < 1e-9);
        assert_eq!(eth0.link(), link);
        assert_eq!(src.ticks_per_second(), 1.0);
    }

    #[test]
    fn missing_link_info_degrades_to_unknown() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = fixture(
            tmp.path(),
            "10.00 20.00\n",
            "eth0: 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16\n",
        );
        let mut src = LocalSource::new(cfg, InterfaceFilter::default());
        let snap = src.acquire().unwrap();
        assert_eq!(snap.samples()[0].link(), LinkInfo::UNKNOWN);
    }

    #[test]
    fn ticks_basis_scales_uptime() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = fixture(
            tmp.path(),
            "2.50 1.00\n",
            "eth0: 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16\n",
        );
        cfg.time_basis = TimeBasis::Ticks;
        let mut src = LocalSource::new(cfg, InterfaceFilter::default());
        let hz = src.ticks_per_second();
        assert_eq!(hz, clock_ticks());
        let snap = src.acquire().unwrap();
        assert!((snap.samples()[0].uptime - 2.5 * hz).abs() < 1e-9);
    }

    #[test]
    fn missing_counter_file_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = fixture(tmp.path(), "1.0 1.0\n", "");
        cfg.netdev_path = tmp.path().join("absent");
        let err = LocalSource::new(cfg, InterfaceFilter::default())
            .acquire()
            .unwrap_err();
        assert!(matches!(err, NetdevError::SourceUnavailable { .. }));
    }

    #[test]
    fn garbage_uptime_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = fixture(tmp.path(), "soon\n", "");
        let err = LocalSource::new(cfg, InterfaceFilter::default())
            .acquire()
            .unwrap_err();
        assert!(matches!(err, NetdevError::MalformedRecord { .. }));
    }
}
