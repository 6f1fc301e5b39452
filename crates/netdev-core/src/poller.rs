//! Previous/current snapshot bookkeeping for a polling loop.

use crate::delta::delta;
use crate::error::{NetdevError, Result};
use crate::sample::Snapshot;
use crate::source::NetdevSource;

/// Owns a source and the snapshot taken on the previous poll.
pub struct Poller<S> {
    source: S,
    previous: Option<Snapshot>,
}

impl<S: NetdevSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            previous: None,
        }
    }

    /// Acquire a snapshot and difference it against the previous one.
    ///
    /// Returns `Ok(None)` on the first successful poll. A failed acquisition
    /// keeps the old previous snapshot. On a shape mismatch the new snapshot
    /// becomes the previous one, so the next poll can succeed.
    pub fn poll(&mut self) -> Result<Option<Snapshot>> {
        let current = self.source.acquire()?;
        let ticks = self.source.ticks_per_second();

        let result = match &self.previous {
            None => Ok(None),
            Some(prev) => delta(prev, &current, ticks).map(Some),
        };
        if let Err(NetdevError::SnapshotShapeMismatch {
            previous: before,
            current: after,
        }) = &result
        {
            log::info!("interface set changed ({before} -> {after}), resetting baseline");
        }
        self.previous = Some(current);
        result
    }

    /// Most recent raw snapshot.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::InterfaceSample;
    use crate::source::SourceKind;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Result<Snapshot>>);

    impl NetdevSource for Scripted {
        fn kind(&self) -> SourceKind {
            SourceKind::Local
        }

        fn acquire(&mut self) -> Result<Snapshot> {
            self.0.pop_front().unwrap_or_else(|| Ok(Snapshot::default()))
        }
    }

    fn snap(names: &[&str], rx_bytes: f64, uptime: f64) -> Snapshot {
        Snapshot::new(
            names
                .iter()
                .map(|n| InterfaceSample {
                    name: n.to_string(),
                    rx_bytes,
                    rx_packets: 1.0,
                    uptime,
                    ..InterfaceSample::default()
                })
                .collect(),
        )
    }

    #[test]
    fn first_poll_has_no_delta() {
        let mut p = Poller::new(Scripted(VecDeque::from([
            Ok(snap(&["eth0"], 100.0, 0.0)),
            Ok(snap(&["eth0"], 300.0, 2.0)),
        ])));
        assert!(p.poll().unwrap().is_none());
        let out = p.poll().unwrap().unwrap();
        assert_eq!(out.samples()[0].rx_bytes, 100.0);
        assert_eq!(p.previous().unwrap().samples()[0].rx_bytes, 300.0);
    }

    #[test]
    fn mismatch_resets_baseline() {
        let mut p = Poller::new(Scripted(VecDeque::from([
            Ok(snap(&["eth0"], 100.0, 0.0)),
            Ok(snap(&["eth0", "eth1"], 200.0, 1.0)),
            Ok(snap(&["eth0", "eth1"], 400.0, 2.0)),
        ])));
        p.poll().unwrap();
        assert!(matches!(
            p.poll(),
            Err(NetdevError::SnapshotShapeMismatch { .. })
        ));
        let out = p.poll().unwrap().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.samples()[1].rx_bytes, 200.0);
    }

    #[test]
    fn failed_acquire_keeps_previous() {
        let mut p = Poller::new(Scripted(VecDeque::from([
            Ok(snap(&["eth0"], 100.0, 0.0)),
            Err(NetdevError::malformed("fixture", 3, "bad")),
            Ok(snap(&["eth0"], 500.0, 4.0)),
        ])));
        p.poll().unwrap();
        assert!(p.poll().is_err());
        let out = p.poll().unwrap().unwrap();
        assert_eq!(out.samples()[0].rx_bytes, 100.0);
    }
}
