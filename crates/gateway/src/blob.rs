//! Binary file storage (image uploads).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GatewayError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return a URL the dashboard can render.
    async fn upload_binary(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError>;
}

#[async_trait]
impl<B> BlobStore for Arc<B>
where
    B: BlobStore + ?Sized,
{
    async fn upload_binary(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        (**self).upload_binary(path, bytes, content_type).await
    }
}
