//! Acquisition source implementations.
//!
//! - [`local::LocalSource`]: `/proc/net/dev` + `/proc/uptime` + sysfs link info
//! - [`remote::RemoteSource`]: telemetry extension queried over a connection
//!
//! The PostgreSQL binding of [`remote::TelemetryClient`] lives in
//! [`postgres`].

pub mod local;
pub mod postgres;
pub mod remote;

use std::collections::HashSet;

use crate::error::{NetdevError, Result};
use crate::sample::InterfaceSample;

/// Accumulates samples of one capture, rejecting repeated names.
#[derive(Default)]
pub(crate) struct SnapshotBuilder {
    samples: Vec<InterfaceSample>,
    seen: HashSet<String>,
}

impl SnapshotBuilder {
    pub(crate) fn push(
        &mut self,
        sample: InterfaceSample,
        source_id: &str,
        line: usize,
    ) -> Result<()> {
        if !self.seen.insert(sample.name.clone()) {
            return Err(NetdevError::malformed(
                source_id,
                line,
                format!("duplicate interface {:?}", sample.name),
            ));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub(crate) fn finish(self) -> Vec<InterfaceSample> {
        self.samples
    }
}
