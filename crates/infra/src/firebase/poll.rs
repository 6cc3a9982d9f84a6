//! Polled collection listeners.
//!
//! The REST API has no push channel, so a listener re-reads its collection on
//! a fixed interval and forwards a snapshot only when it differs from the last
//! one delivered. The task ends as soon as the consumer unsubscribes, even
//! mid-request.

use tokio::time::{MissedTickBehavior, interval};

use admindash_gateway::{Snapshot, SnapshotSender};

use super::FirebaseBackend;

/// Suppresses snapshots identical to the previous delivery.
#[derive(Debug, Default)]
pub(super) struct ChangeFilter {
    last: Option<Snapshot>,
}

impl ChangeFilter {
    /// True if `snapshot` should be delivered; remembers it if so.
    pub(super) fn admit(&mut self, snapshot: &Snapshot) -> bool {
        if self.last.as_ref() == Some(snapshot) {
            return false;
        }
        self.last = Some(snapshot.clone());
        true
    }
}

pub(super) fn spawn(backend: FirebaseBackend, collection: String, tx: SnapshotSender) {
    let every = backend.config().poll_interval;
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut filter = ChangeFilter::default();

        loop {
            tokio::select! {
                biased;
                _ = tx.closed() => break,
                _ = ticker.tick() => {}
            }
            let snapshot = tokio::select! {
                biased;
                _ = tx.closed() => break,
                snapshot = backend.list_documents(&collection) => snapshot,
            };
            if let Err(err) = &snapshot {
                tracing::warn!(collection = %collection, error = %err, "poll failed");
            }
            if filter.admit(&snapshot) && !tx.send(snapshot) {
                break;
            }
        }
        tracing::debug!(collection = %collection, "listener stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use admindash_core::{Fields, Record, RecordId};
    use admindash_gateway::GatewayError;

    fn snapshot(titles: &[&str]) -> Snapshot {
        Ok(titles
            .iter()
            .map(|t| Record::new(RecordId::parse(*t).unwrap(), Fields::new().with("title", *t)))
            .collect())
    }

    #[test]
    fn unchanged_polls_are_not_redelivered() {
        let mut filter = ChangeFilter::default();

        assert!(filter.admit(&snapshot(&[])));
        assert!(!filter.admit(&snapshot(&[])));
        assert!(filter.admit(&snapshot(&["a"])));
        assert!(!filter.admit(&snapshot(&["a"])));
    }

    #[test]
    fn repeated_failures_are_reported_once() {
        let mut filter = ChangeFilter::default();
        let down: Snapshot = Err(GatewayError::unavailable("timeout"));

        assert!(filter.admit(&down));
        assert!(!filter.admit(&down.clone()));
        assert!(filter.admit(&snapshot(&["a"])));
    }
}
