//! "Upload Image" modal: push a file to blob storage, then record it as a photo.

use std::sync::Arc;

use admindash_core::{Fields, Notice, RecordId};
use admindash_gateway::{BlobStore, CollectionGateway};
use admindash_records::Photo;

use crate::controller::{SyncController, race};
use crate::error::SyncError;

/// A file picked by the user, already read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Storage location for this file.
    pub fn storage_path(&self) -> String {
        format!("photos/{}", self.name)
    }
}

#[derive(Debug)]
pub struct ImageUpload<B: ?Sized> {
    store: Arc<B>,
    open: bool,
    selected: Option<SelectedFile>,
}

impl<B> ImageUpload<B>
where
    B: BlobStore + ?Sized,
{
    pub fn new(store: Arc<B>) -> Self {
        Self {
            store,
            open: false,
            selected: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing keeps the selection, matching the modal's cancel button.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn select(&mut self, file: SelectedFile) {
        self.selected = Some(file);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Upload the selected file and create its photo record.
    ///
    /// Nothing is sent when no file is selected or the file name cannot be
    /// used as a storage path. The upload belongs to the photos screen: once
    /// that screen is torn down nothing is sent, and an upload still in
    /// flight is abandoned with `SyncError::Detached`. On success the modal
    /// closes and the selection is cleared.
    pub async fn upload<G>(
        &mut self,
        photos: &mut SyncController<Photo, G>,
        uploader_email: &str,
    ) -> Result<RecordId, SyncError>
    where
        G: CollectionGateway + ?Sized,
    {
        if photos.is_detached() {
            return Err(SyncError::Detached);
        }
        let file = match self.checked_selection(uploader_email) {
            Ok(file) => file,
            Err(message) => {
                photos.notices().push(Notice::warning(message.clone()));
                return Err(SyncError::Validation(message));
            }
        };

        let path = file.storage_path();
        let scope = photos.scope();
        let outcome = race(
            &scope,
            self.store.upload_binary(&path, file.bytes.clone(), &file.content_type),
        )
        .await;
        let url = match outcome {
            None => {
                tracing::debug!(%path, "photos screen torn down mid-upload; upload dropped");
                return Err(SyncError::Detached);
            }
            Some(Ok(url)) => url,
            Some(Err(err)) => {
                tracing::warn!(%path, error = %err, "image upload failed");
                photos
                    .notices()
                    .push(Notice::error(format!("Error uploading image: {err}")));
                return Err(SyncError::Storage(err));
            }
        };
        tracing::info!(%path, bytes = file.bytes.len(), "image uploaded");

        let fields = Fields::new()
            .with("url", url)
            .with("name", file.name.as_str())
            .with("email", uploader_email.trim());
        let id = photos.create(fields).await?;

        self.open = false;
        self.selected = None;
        Ok(id)
    }

    fn checked_selection(&self, uploader_email: &str) -> Result<SelectedFile, String> {
        let file = self
            .selected
            .as_ref()
            .ok_or_else(|| "Please select a file first!".to_string())?;
        let name = file.name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(format!("'{}' is not a usable file name", file.name));
        }
        if file.bytes.is_empty() {
            return Err(format!("'{}' is empty", file.name));
        }
        if uploader_email.trim().is_empty() {
            return Err("Sign in before uploading images".to_string());
        }
        Ok(file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use admindash_core::NoticeLevel;
    use admindash_gateway::{Faults, GatewayError, InMemoryBackend};
    use async_trait::async_trait;

    fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn setup() -> (
        Arc<InMemoryBackend>,
        ImageUpload<InMemoryBackend>,
        SyncController<Photo, InMemoryBackend>,
    ) {
        let backend = Arc::new(InMemoryBackend::new());
        let upload = ImageUpload::new(backend.clone());
        let photos = SyncController::new(backend.clone());
        (backend, upload, photos)
    }

    #[tokio::test]
    async fn upload_stores_blob_then_creates_photo() {
        let (backend, mut upload, mut photos) = setup();
        upload.open();
        upload.select(png("cat.png"));

        let id = upload.upload(&mut photos, "admin@example.com").await.unwrap();

        let (content_type, bytes) = backend.blob("photos/cat.png").unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(bytes.len(), 4);

        let photo = &photos.view().get(&id).unwrap().data;
        assert_eq!(photo.url, "memory://photos/cat.png");
        assert_eq!(photo.name, "cat.png");
        assert_eq!(photo.email.as_deref(), Some("admin@example.com"));
        assert!(photo.timestamp.is_some());

        assert!(!upload.is_open());
        assert!(upload.selected().is_none());
    }

    #[tokio::test]
    async fn empty_selection_never_touches_storage() {
        let (backend, mut upload, mut photos) = setup();

        let err = upload.upload(&mut photos, "admin@example.com").await.unwrap_err();

        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(backend.calls().uploads, 0);
        assert_eq!(
            photos.notices().latest().unwrap().message,
            "Please select a file first!"
        );
    }

    #[tokio::test]
    async fn storage_failure_creates_no_record() {
        let (backend, mut upload, mut photos) = setup();
        backend.set_faults(Faults { storage: true, ..Faults::default() });
        upload.select(png("cat.png"));

        let err = upload.upload(&mut photos, "admin@example.com").await.unwrap_err();

        assert!(matches!(err, SyncError::Storage(_)));
        assert_eq!(backend.calls().creates, 0);
        assert_eq!(photos.notices().latest().unwrap().level, NoticeLevel::Error);
        assert!(upload.selected().is_some());
    }

    #[tokio::test]
    async fn path_separators_in_file_name_are_rejected() {
        let (backend, mut upload, mut photos) = setup();
        upload.select(png("../escape.png"));

        assert!(upload.upload(&mut photos, "admin@example.com").await.is_err());
        assert_eq!(backend.calls().uploads, 0);
    }

    #[tokio::test]
    async fn upload_after_teardown_sends_nothing() {
        let (backend, mut upload, mut photos) = setup();
        upload.select(png("cat.png"));
        photos.teardown();

        let err = upload.upload(&mut photos, "admin@example.com").await.unwrap_err();

        assert_eq!(err, SyncError::Detached);
        assert_eq!(backend.calls().uploads, 0);
        assert!(backend.blob("photos/cat.png").is_none());
        assert!(backend.records("photos").is_empty());
        assert!(photos.notices().is_empty());
    }

    /// Storage whose uploads never finish.
    #[derive(Default)]
    struct StalledStore {
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for StalledStore {
        async fn upload_binary(&self, _: &str, _: Vec<u8>, _: &str) -> Result<String, GatewayError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn teardown_mid_upload_abandons_it() {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(StalledStore::default());
        let mut upload = ImageUpload::new(store.clone());
        let mut photos: SyncController<Photo, _> = SyncController::new(backend.clone());
        upload.open();
        upload.select(png("cat.png"));

        let scope = photos.scope();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            scope.cancel();
        });
        let err = upload.upload(&mut photos, "admin@example.com").await.unwrap_err();

        assert_eq!(err, SyncError::Detached);
        assert_eq!(store.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(backend.calls().creates, 0);
        assert!(upload.is_open());
    }
}
