//! Storage module for product image management
//!
//! Provides an S3/MinIO-compatible client for image uploads and
//! URL-based best-effort deletion.

mod media_store;

pub use media_store::MediaStore;

use async_trait::async_trait;

use crate::core::error::AppError;

/// Backend for storing product images and resolving them back from URLs
///
/// `delete_by_url` is best-effort by contract: implementations log failures
/// and swallow them, so callers can clean up without branching on the result.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Upload an image blob under a folder prefix and return its public URL
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<String, AppError>;

    /// Delete the object a previously issued URL points at, best-effort
    async fn delete_by_url(&self, url: &str);
}
