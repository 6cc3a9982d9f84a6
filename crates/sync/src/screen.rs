//! Mount/teardown scope for one dashboard screen.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use admindash_core::{Entity, RecordId, SyncMode};
use admindash_gateway::CollectionGateway;

use crate::controller::SyncController;
use crate::error::SyncError;
use crate::form::{FormController, SubmitOutcome};

/// A mounted screen: its sync controller plus its modal.
///
/// Everything the screen starts is bound to one cancellation scope. After
/// `teardown` (or drop) no late gateway result can touch the screen's state.
#[derive(Debug)]
pub struct Screen<E, G: ?Sized> {
    pub sync: SyncController<E, G>,
    pub form: FormController<E>,
}

impl<E, G> Screen<E, G>
where
    E: Entity,
    G: CollectionGateway + ?Sized,
{
    /// Mount the screen: follow the collection for push entities, read it
    /// once otherwise.
    ///
    /// A failed initial load still yields a mounted (empty) screen; the
    /// failure is already queued as a notice and returned alongside.
    pub async fn mount(gateway: Arc<G>) -> (Self, Result<(), SyncError>) {
        let mut screen = Self {
            sync: SyncController::new(gateway),
            form: FormController::new(),
        };
        tracing::info!(collection = E::COLLECTION, mode = ?E::SYNC, "mounting screen");
        let initial = screen.refresh().await;
        (screen, initial)
    }

    pub fn scope(&self) -> CancellationToken {
        self.sync.scope()
    }

    /// Re-read the collection. Push screens only (re)attach their listener;
    /// snapshots keep them current.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        match E::SYNC {
            SyncMode::Push => self.sync.subscribe().await,
            SyncMode::Poll => self.sync.load().await.map(|_| ()),
        }
    }

    pub fn open_create(&mut self) {
        self.form.open_create();
    }

    /// Open the edit modal for a row currently shown. Returns `false` if the
    /// row is gone.
    pub fn open_edit(&mut self, id: &RecordId) -> bool {
        match self.sync.view().get(id) {
            Some(row) => {
                self.form.open_edit(row);
                true
            }
            None => false,
        }
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome, SyncError> {
        self.form.submit(&mut self.sync).await
    }

    pub async fn delete(&mut self, id: &RecordId) -> Result<(), SyncError> {
        self.sync.delete(id).await
    }

    pub fn teardown(&mut self) {
        tracing::info!(collection = E::COLLECTION, "screen dismissed");
        self.form.cancel();
        self.sync.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admindash_core::Fields;
    use admindash_gateway::InMemoryBackend;
    use admindash_records::{Album, User};

    #[tokio::test]
    async fn poll_screen_loads_on_mount() {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .seed(
                "albums",
                Fields::new()
                    .with("title", "Trip")
                    .with("description", "Summer")
                    .with("coverImage", "https://cdn.example/c.png"),
            )
            .unwrap();

        let (screen, initial) = Screen::<Album, _>::mount(backend.clone()).await;

        initial.unwrap();
        assert_eq!(screen.sync.view().len(), 1);
        assert_eq!(backend.calls().reads, 1);
        assert_eq!(backend.calls().subscribes, 0);
    }

    #[tokio::test]
    async fn push_screen_subscribes_and_releases_on_teardown() {
        let backend = Arc::new(InMemoryBackend::new());

        let (mut screen, initial) = Screen::<User, _>::mount(backend.clone()).await;
        initial.unwrap();
        assert_eq!(backend.calls().reads, 0);
        assert_eq!(backend.live_listeners("users"), 1);

        screen.teardown();

        assert_eq!(backend.live_listeners("users"), 0);
        assert!(screen.scope().is_cancelled());
    }

    #[tokio::test]
    async fn edit_of_vanished_row_does_not_open_modal() {
        let backend = Arc::new(InMemoryBackend::new());
        let (mut screen, _) = Screen::<Album, _>::mount(backend).await;

        assert!(!screen.open_edit(&RecordId::parse("gone").unwrap()));
        assert!(!screen.form.is_open());
    }
}
