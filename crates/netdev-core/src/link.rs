//! Link speed and duplex lookup for local interfaces.

use std::path::{Path, PathBuf};

use crate::error::LinkInfoError;
use crate::sample::{Duplex, LinkInfo};

/// Source of negotiated link properties for a named interface.
pub trait LinkInfoProvider: Send + Sync {
    fn link_info(&self, iface: &str) -> Result<LinkInfo, LinkInfoError>;
}

/// Reads `speed` (Mbit/s) and `duplex` from `/sys/class/net/<iface>/`.
///
/// Virtual devices and links that are down report `-1` or refuse the read
/// with `EINVAL`; both surface as errors and the caller falls back to
/// [`LinkInfo::UNKNOWN`].
#[derive(Debug, Clone)]
pub struct SysfsLinkInfo {
    root: PathBuf,
}

impl SysfsLinkInfo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsLinkInfo {
    fn default() -> Self {
        Self::new("/sys/class/net")
    }
}

fn read_trimmed(path: &Path) -> Result<String, LinkInfoError> {
    std::fs::read_to_string(path)
        .map(|raw| raw.trim().to_string())
        .map_err(|cause| LinkInfoError::Read {
            path: path.display().to_string(),
            cause,
        })
}

impl LinkInfoProvider for SysfsLinkInfo {
    fn link_info(&self, iface: &str) -> Result<LinkInfo, LinkInfoError> {
        let dir = self.root.join(iface);
        let raw_speed = read_trimmed(&dir.join("speed"))?;
        let mbps = match raw_speed.parse::<i64>() {
            Ok(v) if v > 0 => v as u64,
            _ => {
                return Err(LinkInfoError::SpeedUnknown {
                    iface: iface.to_string(),
                    raw: raw_speed,
                });
            }
        };
        let duplex = match read_trimmed(&dir.join("duplex")).as_deref() {
            Ok("full") => Duplex::Full,
            Ok("half") => Duplex::Half,
            _ => Duplex::Unknown,
        };
        Ok(LinkInfo {
            speed_bps: mbps * 1_000_000,
            duplex,
        })
    }
}

/// Provider returning the same answer for every interface.
#[derive(Debug, Clone, Copy)]
pub struct FixedLinkInfo(pub LinkInfo);

impl LinkInfoProvider for FixedLinkInfo {
    fn link_info(&self, _iface: &str) -> Result<LinkInfo, LinkInfoError> {
        Ok(self.0)
    }
}
