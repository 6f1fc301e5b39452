//! Construction-time configuration for the acquisition sources.
//!
//! Paths and query texts are plain data so callers can point a source at a
//! fixture file or a differently named telemetry schema.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NetdevError, Result};
use crate::filter::{DEFAULT_DENY_LIST, InterfaceFilter};

/// Unit in which a source stamps host uptime on its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    #[default]
    Seconds,
    /// Kernel clock ticks (`_SC_CLK_TCK` per second).
    Ticks,
}

/// Local procfs/sysfs locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub netdev_path: PathBuf,
    pub uptime_path: PathBuf,
    pub sysfs_net_root: PathBuf,
    pub time_basis: TimeBasis,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            netdev_path: PathBuf::from("/proc/net/dev"),
            uptime_path: PathBuf::from("/proc/uptime"),
            sysfs_net_root: PathBuf::from("/sys/class/net"),
            time_basis: TimeBasis::Seconds,
        }
    }
}

/// Query texts for the remote telemetry extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Single row, single column: uptime in seconds.
    pub uptime_query: String,
    /// Rows of (trimmed name, raw name, 16 counters) ordered by name.
    pub netdev_query: String,
    /// Single row of (speed in bits/s, duplex code) for interface `$1`.
    pub link_settings_query: String,
    /// Single boolean: whether the extension schema is installed.
    pub schema_query: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            uptime_query: "SELECT seconds_total::float8 FROM pgcenter.sys_proc_uptime".to_string(),
            netdev_query: "SELECT left(iface,-1),* FROM pgcenter.sys_proc_netdev ORDER BY iface"
                .to_string(),
            link_settings_query: "SELECT speed::bigint * 1000000, duplex::bigint \
                                  FROM pgcenter.get_netdev_link_settings($1)"
                .to_string(),
            schema_query: "SELECT EXISTS (SELECT 1 FROM information_schema.schemata \
                           WHERE schema_name = 'pgcenter')"
                .to_string(),
        }
    }
}

/// Everything an acquisition source needs at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub local: LocalConfig,
    pub remote: RemoteConfig,
    /// Interface name fragments excluded from every snapshot.
    pub deny_list: Vec<String>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            local: LocalConfig::default(),
            remote: RemoteConfig::default(),
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AcquisitionConfig {
    pub fn filter(&self) -> InterfaceFilter {
        InterfaceFilter::new(self.deny_list.iter().cloned())
    }

    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let id = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| NetdevError::unavailable(&id, e))?;
        serde_json::from_str(&raw).map_err(|cause| NetdevError::Config { path: id, cause })
    }
}
