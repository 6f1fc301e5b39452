//! # netdev-core
//!
//! Per-second network interface throughput, saturation and link utilization,
//! computed by differencing two snapshots of cumulative interface counters.
//!
//! ## Quick Start
//!
//! ```no_run
//! use netdev_core::{AcquisitionConfig, LocalSource, NetdevSource, delta};
//!
//! let mut source = LocalSource::from_config(&AcquisitionConfig::default());
//! let previous = source.acquire()?;
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! let current = source.acquire()?;
//!
//! for iface in &delta(&previous, &current, source.ticks_per_second())? {
//!     println!("{}: {:.0} B/s in, {:.2}% util", iface.name, iface.rx_bytes, iface.utilization);
//! }
//! # Ok::<(), netdev_core::NetdevError>(())
//! ```
//!
//! ## Architecture
//!
//! Source (local procfs | remote telemetry) → Filter → Snapshot → Delta
//!
//! Every source implements the [`NetdevSource`] trait. [`select_source`]
//! routes a target host to the local or remote implementation; [`Poller`]
//! keeps the previous snapshot between polls.

pub mod config;
pub mod delta;
pub mod error;
pub mod filter;
pub mod link;
pub mod poller;
pub mod sample;
pub mod source;
pub mod sources;

pub use config::{AcquisitionConfig, LocalConfig, RemoteConfig, TimeBasis};
pub use delta::{delta, utilization};
pub use error::{LinkInfoError, NetdevError, Result};
pub use filter::{DEFAULT_DENY_LIST, InterfaceFilter};
pub use link::{FixedLinkInfo, LinkInfoProvider, SysfsLinkInfo};
pub use poller::Poller;
pub use sample::{Duplex, InterfaceSample, LinkInfo, Snapshot};
pub use source::{NetdevSource, SourceKind, is_local_host, select_source};
pub use sources::local::{LocalSource, clock_ticks, parse_netdev};
pub use sources::remote::{NetdevRow, RemoteSource, TelemetryClient};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
