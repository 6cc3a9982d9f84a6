//! Push subscriptions to a remote collection.
//!
//! A subscription delivers **full-collection snapshots** in the order the
//! backend produced them. Each snapshot supersedes the previous one, so a
//! consumer that falls behind only needs the latest; there is nothing to merge.
//!
//! ## Lifetime
//!
//! A subscription is a scoped resource. Dropping it (or calling
//! `unsubscribe`) cancels it, and the backend side stops delivering:
//!
//! ```ignore
//! let mut sub = gateway.subscribe_to_collection("posts").await?;
//! while let Some(snapshot) = sub.next().await {
//!     view_model.replace_all(decode(snapshot?)?);
//! }
//! // `sub` dropped here -> listener released
//! ```

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use admindash_core::Record;

use crate::error::GatewayError;

/// One push delivery: the whole collection, or the listener's error.
pub type Snapshot = Result<Vec<Record>, GatewayError>;

/// Consumer end of a collection listener.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    receiver: mpsc::UnboundedReceiver<Snapshot>,
    cancel: CancellationToken,
}

/// Producer end held by the gateway implementation.
#[derive(Debug, Clone)]
pub struct SnapshotSender {
    sender: mpsc::UnboundedSender<Snapshot>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Create a connected sender/subscription pair for `collection`.
    pub fn channel(collection: impl Into<String>) -> (SnapshotSender, Subscription) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let tx = SnapshotSender {
            sender,
            cancel: cancel.clone(),
        };
        let sub = Subscription {
            collection: collection.into(),
            receiver,
            cancel,
        };
        (tx, sub)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// False once cancelled, or once every sender is gone and the last
    /// buffered snapshot has been taken.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !(self.receiver.is_closed() && self.receiver.is_empty())
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the subscription is cancelled or the backend side
    /// has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            snapshot = self.receiver.recv() => snapshot,
        }
    }

    /// Take an already-delivered snapshot without waiting.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Release the listener now rather than at drop.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(collection = %self.collection, "releasing collection listener");
        }
        self.cancel.cancel();
    }
}

impl SnapshotSender {
    /// Deliver a snapshot. Returns `false` when the consumer is gone, which
    /// tells the producer to forget this listener.
    pub fn send(&self, snapshot: Snapshot) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.sender.send(snapshot).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.sender.is_closed()
    }

    /// Resolves when the consumer unsubscribes (for polling producers).
    pub async fn closed(&self) {
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = self.sender.closed() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admindash_core::{Fields, RecordId};

    fn record(id: &str) -> Record {
        Record::new(RecordId::parse(id).unwrap(), Fields::new().with("title", id))
    }

    #[tokio::test]
    async fn snapshots_arrive_in_send_order() {
        let (tx, mut sub) = Subscription::channel("todos");
        assert!(tx.send(Ok(vec![record("a")])));
        assert!(tx.send(Ok(vec![record("a"), record("b")])));

        assert_eq!(sub.next().await.unwrap().unwrap().len(), 1);
        assert_eq!(sub.try_next().unwrap().unwrap().len(), 2);
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn dropping_subscription_closes_sender() {
        let (tx, sub) = Subscription::channel("todos");
        assert!(!tx.is_closed());

        sub.unsubscribe();

        assert!(tx.is_closed());
        assert!(!tx.send(Ok(vec![])));
        tx.closed().await;
    }

    #[tokio::test]
    async fn backend_side_closure_ends_subscription_after_buffer_drains() {
        let (tx, mut sub) = Subscription::channel("todos");
        assert!(tx.send(Ok(vec![record("a")])));
        drop(tx);

        assert!(sub.is_active());
        assert_eq!(sub.try_next().unwrap().unwrap().len(), 1);
        assert!(!sub.is_active());
        assert!(sub.next().await.is_none());
    }
}
