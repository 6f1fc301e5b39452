//! Remote acquisition through a telemetry-exposing database extension.
//!
//! The endpoint is reached through a [`TelemetryClient`], which turns the
//! configured query texts into typed rows. Connection setup and teardown stay
//! with the caller.

use crate::config::{AcquisitionConfig, RemoteConfig};
use crate::error::Result;
use crate::filter::InterfaceFilter;
use crate::sample::{COUNTER_COUNT, Duplex, InterfaceSample, LinkInfo, Snapshot};
use crate::source::{NetdevSource, SourceKind};
use crate::sources::SnapshotBuilder;

/// One interface row of the counters query.
#[derive(Debug, Clone, PartialEq)]
pub struct NetdevRow {
    pub name: String,
    /// Counters in `/proc/net/dev` column order.
    pub counters: [f64; COUNTER_COUNT],
}

/// Row-level access to the telemetry endpoint.
///
/// Implementations report query failures as
/// [`crate::NetdevError::SourceUnavailable`] and rows of the wrong shape as
/// [`crate::NetdevError::MalformedRecord`].
pub trait TelemetryClient {
    /// Whether the telemetry extension's schema is installed.
    fn schema_exists(&mut self, query: &str) -> Result<bool>;

    /// Host uptime in seconds.
    fn uptime(&mut self, query: &str) -> Result<f64>;

    /// Per-interface counters, ordered by interface name.
    fn netdev_rows(&mut self, query: &str) -> Result<Vec<NetdevRow>>;

    /// `(speed in bits/s, duplex code)` for `iface`.
    fn link_settings(&mut self, query: &str, iface: &str) -> Result<(i64, i64)>;
}

impl<C: TelemetryClient + ?Sized> TelemetryClient for &mut C {
    fn schema_exists(&mut self, query: &str) -> Result<bool> {
        (**self).schema_exists(query)
    }

    fn uptime(&mut self, query: &str) -> Result<f64> {
        (**self).uptime(query)
    }

    fn netdev_rows(&mut self, query: &str) -> Result<Vec<NetdevRow>> {
        (**self).netdev_rows(query)
    }

    fn link_settings(&mut self, query: &str, iface: &str) -> Result<(i64, i64)> {
        (**self).link_settings(query, iface)
    }
}

/// Reads counters of a remote host via its telemetry extension.
pub struct RemoteSource<C> {
    client: C,
    config: RemoteConfig,
    filter: InterfaceFilter,
    schema_present: bool,
}

impl<C: TelemetryClient> RemoteSource<C> {
    /// `schema_present` is the caller's prior confirmation that the extension
    /// is installed; see [`RemoteSource::probe`].
    pub fn new(
        client: C,
        config: RemoteConfig,
        filter: InterfaceFilter,
        schema_present: bool,
    ) -> Self {
        Self {
            client,
            config,
            filter,
            schema_present,
        }
    }

    pub fn from_config(client: C, schema_present: bool, config: &AcquisitionConfig) -> Self {
        Self::new(client, config.remote.clone(), config.filter(), schema_present)
    }

    /// Build a source after asking the endpoint whether the schema exists.
    pub fn probe(mut client: C, config: &AcquisitionConfig) -> Result<Self> {
        let present = client.schema_exists(&config.remote.schema_query)?;
        if !present {
            log::warn!("telemetry schema not installed, remote interface stats disabled");
        }
        Ok(Self::from_config(client, present, config))
    }

    pub fn schema_present(&self) -> bool {
        self.schema_present
    }

    pub fn into_client(self) -> C {
        self.client
    }
}

impl<C: TelemetryClient> NetdevSource for RemoteSource<C> {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn acquire(&mut self) -> Result<Snapshot> {
        if !self.schema_present {
            return Ok(Snapshot::default());
        }

        let uptime = self.client.uptime(&self.config.uptime_query)?;
        let rows = self.client.netdev_rows(&self.config.netdev_query)?;

        let mut out = SnapshotBuilder::default();
        for (idx, row) in rows.into_iter().enumerate() {
            if self.filter.is_excluded(&row.name) {
                log::debug!("skipping virtual interface {}", row.name);
                continue;
            }
            let mut sample = InterfaceSample::from_counters(row.name, &row.counters);
            sample.uptime = uptime;

            let (speed, duplex) = self
                .client
                .link_settings(&self.config.link_settings_query, &sample.name)?;
            sample.set_link(LinkInfo {
                speed_bps: u64::try_from(speed).unwrap_or(0),
                duplex: Duplex::from_code(duplex),
            });

            out.push(sample, &self.config.netdev_query, idx + 1)?;
        }

        Ok(Snapshot::new(out.finish()))
    }
}
