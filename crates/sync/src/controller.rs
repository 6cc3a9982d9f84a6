//! Per-screen sync controller: gateway calls + view-model reconciliation.
//!
//! The controller is the single writer of its view model. Every gateway call
//! is one round trip (no retries, no batching) raced against the screen's
//! cancellation scope: if the screen is torn down while a call is in flight,
//! the call is abandoned and the controller's state is left alone.
//!
//! Local state follows the gateway: the view model changes only after the
//! gateway confirmed the mutation. A failed mutation leaves it exactly as it was.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use admindash_core::schema::{prepare_create, prepare_patch};
use admindash_core::{DomainError, Entity, Fields, Notice, Notices, Record, RecordId, Stored};
use admindash_gateway::{CollectionGateway, GatewayError, Snapshot, Subscription};

use crate::error::SyncError;
use crate::view_model::ViewModel;

/// Generic "list + mutate + resync" controller for entity type `E`.
#[derive(Debug)]
pub struct SyncController<E, G: ?Sized> {
    gateway: Arc<G>,
    view: ViewModel<E>,
    subscription: Option<Subscription>,
    scope: CancellationToken,
    loading: watch::Sender<bool>,
    notices: Notices,
}

impl<E, G> SyncController<E, G>
where
    E: Entity,
    G: CollectionGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_scope(gateway, CancellationToken::new())
    }

    /// Build a controller bound to an existing screen scope.
    pub fn with_scope(gateway: Arc<G>, scope: CancellationToken) -> Self {
        Self {
            gateway,
            view: ViewModel::new(),
            subscription: None,
            scope,
            loading: watch::Sender::new(false),
            notices: Notices::new(),
        }
    }

    pub fn view(&self) -> &ViewModel<E> {
        &self.view
    }

    /// True while a gateway call is in flight, or while waiting for the first
    /// push snapshot after subscribing.
    pub fn loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Follow `loading` from outside the controller, e.g. a spinner that
    /// renders while a call is suspended.
    pub fn watch_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Handle the presentation layer cancels when the screen is dismissed.
    pub fn scope(&self) -> CancellationToken {
        self.scope.clone()
    }

    pub fn is_detached(&self) -> bool {
        self.scope.is_cancelled()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Read the whole collection and replace the view model with it.
    ///
    /// On failure the previous contents stay in place (stale but present).
    pub async fn load(&mut self) -> Result<usize, SyncError> {
        self.ensure_attached()?;

        let outcome = {
            let _busy = InFlight::start(&self.loading);
            race(&self.scope, self.gateway.read_all_records(E::COLLECTION)).await
        };

        let records = match outcome {
            None => return Err(self.detached("load")),
            Some(Ok(records)) => records,
            Some(Err(err)) => return Err(self.read_failed(err)),
        };
        let rows = self.decode(&records)?;
        self.view.replace_all(rows);
        tracing::debug!(collection = E::COLLECTION, rows = self.view.len(), "loaded collection");
        Ok(self.view.len())
    }

    /// Start following the collection. Subscribing twice is a no-op.
    ///
    /// The listener lives until `teardown` (or drop) and is never leaked.
    pub async fn subscribe(&mut self) -> Result<(), SyncError> {
        self.ensure_attached()?;
        if self.is_subscribed() {
            return Ok(());
        }

        let outcome = race(&self.scope, self.gateway.subscribe_to_collection(E::COLLECTION)).await;
        match outcome {
            None => Err(self.detached("subscribe")),
            Some(Err(err)) => Err(self.read_failed(err)),
            Some(Ok(subscription)) => {
                tracing::info!(collection = E::COLLECTION, "following collection");
                self.subscription = Some(subscription);
                self.loading.send_replace(true);
                self.pump().map(|_| ())
            }
        }
    }

    /// Apply push snapshots that have already arrived, without waiting.
    ///
    /// Only the newest one matters; it supersedes everything before it.
    /// Returns how many snapshots were drained. If the backend has closed the
    /// listener, it is released (so the next `subscribe` starts a fresh one)
    /// and the closure is reported as a read failure.
    pub fn pump(&mut self) -> Result<usize, SyncError> {
        let mut drained = 0;
        let mut latest = None;
        let mut closed = false;
        if let Some(subscription) = self.subscription.as_mut() {
            while let Some(snapshot) = subscription.try_next() {
                drained += 1;
                latest = Some(snapshot);
            }
            closed = !subscription.is_active();
        }
        if let Some(snapshot) = latest {
            self.apply_snapshot(snapshot)?;
        }
        if closed {
            return Err(self.listener_closed());
        }
        Ok(drained)
    }

    /// Wait for the next push snapshot and apply it.
    ///
    /// Returns `Ok(false)` when there is no subscription. A listener the
    /// backend closes is released and reported once as
    /// `GatewayUnavailable(Closed)`.
    pub async fn next_push(&mut self) -> Result<bool, SyncError> {
        self.ensure_attached()?;
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(false);
        };

        let snapshot = tokio::select! {
            biased;
            _ = self.scope.cancelled() => return Err(SyncError::Detached),
            snapshot = subscription.next() => snapshot,
        };
        match snapshot {
            Some(snapshot) => self.apply_snapshot(snapshot).map(|()| true),
            None => Err(self.listener_closed()),
        }
    }

    /// Create a record from user-entered fields.
    ///
    /// Schema validation runs first; a rejected request never reaches the
    /// gateway. On success the new record is appended under its
    /// gateway-assigned id.
    pub async fn create(&mut self, fields: Fields) -> Result<RecordId, SyncError> {
        self.ensure_attached()?;
        let prepared = match prepare_create(E::SCHEMA, fields, Utc::now()) {
            Ok(prepared) => prepared,
            Err(err) => return Err(self.reject(err)),
        };
        let data = match E::from_fields(&prepared) {
            Ok(data) => data,
            Err(err) => return Err(self.reject(err)),
        };

        let outcome = {
            let _busy = InFlight::start(&self.loading);
            race(&self.scope, self.gateway.create_record(E::COLLECTION, prepared)).await
        };

        let id = match outcome {
            None => return Err(self.detached("create")),
            Some(Err(err)) => return Err(self.write_failed("add", err)),
            Some(Ok(id)) => id,
        };
        self.view.append(Stored::new(id.clone(), data));
        tracing::info!(collection = E::COLLECTION, %id, "record created");
        self.notices
            .push(Notice::success(format!("{} added successfully", E::LABEL)));
        Ok(id)
    }

    /// Partial update: only the keys in `patch` change.
    pub async fn update(&mut self, id: &RecordId, patch: Fields) -> Result<(), SyncError> {
        self.ensure_attached()?;
        let patch = match prepare_patch(E::SCHEMA, patch) {
            Ok(patch) => patch,
            Err(err) => return Err(self.reject(err)),
        };
        let merged = match self.view.get(id).map(|row| row.patched(&patch)).transpose() {
            Ok(merged) => merged,
            Err(err) => return Err(self.reject(err)),
        };

        let outcome = {
            let _busy = InFlight::start(&self.loading);
            race(&self.scope, self.gateway.update_record(E::COLLECTION, id, patch)).await
        };

        match outcome {
            None => return Err(self.detached("update")),
            Some(Err(err)) => return Err(self.write_failed("update", err)),
            Some(Ok(())) => {}
        }
        if let Some(data) = merged {
            self.view.update_by_id(id, data);
        }
        tracing::info!(collection = E::COLLECTION, %id, "record updated");
        self.notices
            .push(Notice::success(format!("{} updated successfully", E::LABEL)));
        Ok(())
    }

    /// Delete remotely, then drop the row locally. Nothing changes locally if
    /// the gateway refuses.
    pub async fn delete(&mut self, id: &RecordId) -> Result<(), SyncError> {
        self.ensure_attached()?;

        let outcome = {
            let _busy = InFlight::start(&self.loading);
            race(&self.scope, self.gateway.delete_record(E::COLLECTION, id)).await
        };

        match outcome {
            None => return Err(self.detached("delete")),
            Some(Err(err)) => return Err(self.write_failed("delete", err)),
            Some(Ok(())) => {}
        }
        self.view.remove_by_id(id);
        tracing::info!(collection = E::COLLECTION, %id, "record deleted");
        self.notices
            .push(Notice::success(format!("{} deleted successfully", E::LABEL)));
        Ok(())
    }

    /// Release the listener and cancel anything still in flight.
    pub fn teardown(&mut self) {
        if !self.scope.is_cancelled() {
            tracing::debug!(collection = E::COLLECTION, "tearing down screen scope");
        }
        self.scope.cancel();
        self.subscription = None;
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<(), SyncError> {
        self.loading.send_replace(false);
        let records = match snapshot {
            Ok(records) => records,
            Err(err) => return Err(self.read_failed(err)),
        };
        let rows = self.decode(&records)?;
        self.view.replace_all(rows);
        tracing::debug!(collection = E::COLLECTION, rows = self.view.len(), "applied push snapshot");
        Ok(())
    }

    fn listener_closed(&mut self) -> SyncError {
        tracing::info!(collection = E::COLLECTION, "backend closed the collection listener");
        self.subscription = None;
        self.loading.send_replace(false);
        self.read_failed(GatewayError::Closed)
    }

    fn decode(&mut self, records: &[Record]) -> Result<Vec<Stored<E>>, SyncError> {
        let decoded: Result<Vec<_>, DomainError> = records.iter().map(Stored::<E>::decode).collect();
        decoded.map_err(|err| {
            tracing::warn!(collection = E::COLLECTION, error = %err, "gateway returned malformed record");
            self.notices.push(Notice::error(format!(
                "Some {} could not be read. Please try again.",
                E::COLLECTION
            )));
            SyncError::from(err)
        })
    }

    fn ensure_attached(&self) -> Result<(), SyncError> {
        if self.scope.is_cancelled() {
            return Err(SyncError::Detached);
        }
        Ok(())
    }

    fn detached(&self, op: &str) -> SyncError {
        tracing::debug!(collection = E::COLLECTION, op, "screen torn down mid-call; result dropped");
        SyncError::Detached
    }

    fn reject(&mut self, err: DomainError) -> SyncError {
        tracing::debug!(collection = E::COLLECTION, error = %err, "rejected locally");
        self.notices.push(Notice::warning(err.message()));
        SyncError::from(err)
    }

    fn read_failed(&mut self, err: GatewayError) -> SyncError {
        tracing::warn!(collection = E::COLLECTION, error = %err, "read failed");
        self.notices.push(Notice::error(format!(
            "Failed to load {}. Please try again.",
            E::COLLECTION
        )));
        SyncError::GatewayUnavailable(err)
    }

    fn write_failed(&mut self, verb: &str, err: GatewayError) -> SyncError {
        tracing::warn!(collection = E::COLLECTION, verb, error = %err, "write failed");
        self.notices.push(Notice::error(format!(
            "Failed to {verb} {}. Please try again.",
            E::LABEL.to_lowercase()
        )));
        SyncError::GatewayWrite(err)
    }
}

impl<E, G: ?Sized> Drop for SyncController<E, G> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Holds `loading` up for the duration of one gateway call, including when the
/// calling future is dropped mid-await.
struct InFlight<'a>(&'a watch::Sender<bool>);

impl<'a> InFlight<'a> {
    fn start(loading: &'a watch::Sender<bool>) -> Self {
        loading.send_replace(true);
        Self(loading)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Run `fut` unless `scope` is cancelled first.
pub(crate) async fn race<F: Future>(scope: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = scope.cancelled() => None,
        out = fut => Some(out),
    }
}
