//! Error taxonomy for acquisition and delta computation.
//!
//! Every variant of [`NetdevError`] is fatal for the poll that produced it;
//! retry policy belongs to whoever drives the polling loop. Link-info lookups
//! fail with the separate [`LinkInfoError`], which local acquisition degrades
//! to an unknown link instead of propagating.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NetdevError>;

/// Boxed underlying cause carried by [`NetdevError::SourceUnavailable`].
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum NetdevError {
    /// Counter file could not be opened/read, or a query/connection failed.
    #[error("{source_id} unavailable: {reason}")]
    SourceUnavailable {
        /// Path or query text identifying the source.
        source_id: String,
        reason: String,
        #[source]
        cause: Option<Cause>,
    },

    /// A counter line or row did not have the expected shape.
    #[error("{source_id}: malformed record at line {line}: {detail}")]
    MalformedRecord {
        source_id: String,
        /// 1-based line (local file) or row (remote query) number.
        line: usize,
        detail: String,
    },

    /// Previous and current snapshots hold different interface counts.
    #[error("snapshot shape mismatch: previous has {previous} interfaces, current has {current}")]
    SnapshotShapeMismatch { previous: usize, current: usize },

    /// Configuration file could not be parsed.
    #[error("invalid config {path}: {cause}")]
    Config {
        path: String,
        #[source]
        cause: serde_json::Error,
    },
}

impl NetdevError {
    pub fn unavailable(
        source_id: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SourceUnavailable {
            source_id: source_id.into(),
            reason: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn malformed(source_id: impl Into<String>, line: usize, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            source_id: source_id.into(),
            line,
            detail: detail.into(),
        }
    }
}

/// Why a link speed/duplex lookup failed. Never fatal for acquisition.
#[derive(Error, Debug)]
pub enum LinkInfoError {
    #[error("cannot read {path}: {cause}")]
    Read {
        path: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("link speed not reported for {iface}: {raw:?}")]
    SpeedUnknown { iface: String, raw: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_names_both_counts() {
        let err = NetdevError::SnapshotShapeMismatch {
            previous: 3,
            current: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("previous has 3"));
        assert!(msg.contains("current has 4"));
    }

    #[test]
    fn unavailable_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = NetdevError::unavailable("/proc/net/dev", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("/proc/net/dev unavailable"));
    }

    #[test]
    fn malformed_carries_source_and_line() {
        let err = NetdevError::malformed("/proc/net/dev", 5, "expected 16 counters, found 3");
        match err {
            NetdevError::MalformedRecord {
                source_id, line, ..
            } => {
                assert_eq!(source_id, "/proc/net/dev");
                assert_eq!(line, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
