//! Acquisition source trait and local/remote routing.
//!
//! Every source implements [`NetdevSource`]; [`select_source`] picks the local
//! procfs reader or the remote telemetry reader for a monitoring target.

use crate::config::AcquisitionConfig;
use crate::error::Result;
use crate::sample::Snapshot;
use crate::sources::local::LocalSource;
use crate::sources::remote::{RemoteSource, TelemetryClient};

/// Where a source gets its counters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Counter files of the machine running this process.
    Local,
    /// Queries against a telemetry-exposing database extension.
    Remote,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Producer of ordered, filtered interface snapshots.
pub trait NetdevSource {
    fn kind(&self) -> SourceKind;

    /// Time-basis units per second of the uptime stamped on samples. Passed
    /// unchanged to [`crate::delta::delta`].
    fn ticks_per_second(&self) -> f64 {
        1.0
    }

    /// Capture one snapshot. Any failure discards the whole capture.
    fn acquire(&mut self) -> Result<Snapshot>;
}

impl<S: NetdevSource + ?Sized> NetdevSource for Box<S> {
    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn ticks_per_second(&self) -> f64 {
        (**self).ticks_per_second()
    }

    fn acquire(&mut self) -> Result<Snapshot> {
        (**self).acquire()
    }
}

/// Whether `host` refers to the machine running this process: empty, a unix
/// socket directory, or a loopback name/address.
pub fn is_local_host(host: &str) -> bool {
    let host = host.trim();
    host.is_empty()
        || host.starts_with('/')
        || host.eq_ignore_ascii_case("localhost")
        || host == "127.0.0.1"
        || host == "::1"
}

/// Route a target to local or remote acquisition.
///
/// `schema_present` is the caller's prior check for the telemetry extension;
/// it only matters for remote targets.
pub fn select_source<C>(
    host: &str,
    client: C,
    schema_present: bool,
    config: &AcquisitionConfig,
) -> Box<dyn NetdevSource + Send>
where
    C: TelemetryClient + Send + 'static,
{
    if is_local_host(host) {
        log::debug!("target {host:?} is local, reading {}", config.local.netdev_path.display());
        Box::new(LocalSource::from_config(config))
    } else {
        log::debug!("target {host:?} is remote (schema present: {schema_present})");
        Box::new(RemoteSource::from_config(client, schema_present, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::remote::NetdevRow;

    struct NoClient;

    impl TelemetryClient for NoClient {
        fn schema_exists(&mut self, _query: &str) -> Result<bool> {
            Ok(false)
        }
        fn uptime(&mut self, _query: &str) -> Result<f64> {
            Ok(0.0)
        }
        fn netdev_rows(&mut self, _query: &str) -> Result<Vec<NetdevRow>> {
            Ok(Vec::new())
        }
        fn link_settings(&mut self, _query: &str, _iface: &str) -> Result<(i64, i64)> {
            Ok((0, -1))
        }
    }

    #[test]
    fn local_hosts() {
        for host in ["", "  ", "/var/run/postgresql", "localhost", "LOCALHOST", "127.0.0.1", "::1"]
        {
            assert!(is_local_host(host), "{host:?} should be local");
        }
    }

    #[test]
    fn remote_hosts() {
        for host in ["db.example.com", "10.0.0.5", "127.0.0.2", "localhost.example"] {
            assert!(!is_local_host(host), "{host:?} should be remote");
        }
    }

    #[test]
    fn routes_by_host() {
        let cfg = AcquisitionConfig::default();
        assert_eq!(select_source("localhost", NoClient, true, &cfg).kind(), SourceKind::Local);
        assert_eq!(select_source("db1", NoClient, true, &cfg).kind(), SourceKind::Remote);
    }

    #[test]
    fn remote_without_schema_is_empty() {
        let cfg = AcquisitionConfig::default();
        let mut src = select_source("db1", NoClient, false, &cfg);
        let snap = src.acquire().unwrap();
        assert!(snap.is_empty());
    }
}
