//! S3-compatible media store for product images
//!
//! Uploads image blobs under a folder prefix and returns public URLs.
//! Deletion works backwards from a previously issued URL; anything that
//! cannot be parsed back into an object key is skipped silently.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::modules::storage::ImageStorage;

/// S3/MinIO-backed store for product images
pub struct MediaStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
}

impl MediaStore {
    /// Create a new media store from configuration. Performs no network IO;
    /// call [`ensure_bucket_exists`](Self::ensure_bucket_exists) at startup.
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let bucket_config = BucketConfiguration::default();

        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            bucket_config,
        )
        .await
        {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                // Bucket already exists - this is fine
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    Ok(())
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                    Ok(())
                }
            }
        }
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Upload an image blob under the given folder prefix
    ///
    /// The object key is `{folder}/{uuid}` with no file extension, so the
    /// returned URL round-trips through [`delete_by_url`](Self::delete_by_url).
    ///
    /// # Returns
    /// The public URL of the uploaded object
    pub async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<String, AppError> {
        let key = format!("{}/{}", folder, Uuid::new_v4());

        self.bucket
            .put_object_with_content_type(&key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(self.public_url(&key))
    }

    /// Public URL for an object key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    /// Best-effort delete of a previously issued URL. Never fails from the
    /// caller's perspective: unparseable URLs and remote failures are logged
    /// and swallowed.
    pub async fn delete_by_url(&self, url: &str) {
        let Some(key) = self.object_key_from_url(url) else {
            warn!("Skipping storage delete for unrecognized URL: {}", url);
            return;
        };

        match self.bucket.delete_object(&key).await {
            Ok(_) => debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name()),
            Err(e) => warn!("Failed to delete '{}': {}", key, e),
        }
    }

    /// Reverse-parse a URL into the object key it was issued for
    ///
    /// The URL must point at this store's bucket (public or internal
    /// endpoint). A leading `v<digits>` version segment and a trailing file
    /// extension are stripped when present, for compatibility with URLs
    /// issued by earlier storage backends. Returns `None` for anything that
    /// does not parse cleanly.
    pub fn object_key_from_url(&self, url: &str) -> Option<String> {
        // Try public endpoint first, then the internal one
        let public_prefix = format!("{}/{}/", self.public_endpoint, self.bucket.name());
        let internal_prefix = format!("{}/{}/", self.endpoint, self.bucket.name());

        let path = url
            .strip_prefix(&public_prefix)
            .or_else(|| url.strip_prefix(&internal_prefix))?;

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // Strip a leading version segment of the form "v" + digits
        if let Some(first) = segments.first() {
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit())
            {
                segments.remove(0);
            }
        }

        let last = segments.last_mut()?;

        // Strip a trailing file extension from the last segment
        let stem = match last.rsplit_once('.') {
            Some((stem, _ext)) => stem,
            None => last,
        };
        if stem.is_empty() {
            return None;
        }
        *last = stem;

        Some(segments.join("/"))
    }
}

#[async_trait]
impl ImageStorage for MediaStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<String, AppError> {
        MediaStore::upload(self, data, content_type, folder).await
    }

    async fn delete_by_url(&self, url: &str) {
        MediaStore::delete_by_url(self, url).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MediaStore {
        MediaStore::new(StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            public_endpoint: "https://media.example.com".to_string(),
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
            bucket: "catalog-media".to_string(),
            region: "us-east-1".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn issued_urls_round_trip_to_their_key() {
        let store = store();
        let key = "products/7e57ed11-0000-4000-8000-1234567890ab";
        let url = store.public_url(key);
        assert_eq!(store.object_key_from_url(&url).as_deref(), Some(key));
    }

    #[test]
    fn internal_endpoint_urls_are_accepted() {
        let store = store();
        let url = "http://localhost:9000/catalog-media/products/abc";
        assert_eq!(
            store.object_key_from_url(url).as_deref(),
            Some("products/abc")
        );
    }

    #[test]
    fn version_segment_is_stripped() {
        let store = store();
        let url = "https://media.example.com/catalog-media/v1712345678/products/abc";
        assert_eq!(
            store.object_key_from_url(url).as_deref(),
            Some("products/abc")
        );
    }

    #[test]
    fn non_numeric_version_like_segment_is_kept() {
        let store = store();
        let url = "https://media.example.com/catalog-media/vault/abc";
        assert_eq!(store.object_key_from_url(url).as_deref(), Some("vault/abc"));
    }

    #[test]
    fn trailing_extension_is_stripped() {
        let store = store();
        let url = "https://media.example.com/catalog-media/products/abc.png";
        assert_eq!(
            store.object_key_from_url(url).as_deref(),
            Some("products/abc")
        );

        // Only the final extension goes; inner dots stay
        let url = "https://media.example.com/catalog-media/products/my.file.name.png";
        assert_eq!(
            store.object_key_from_url(url).as_deref(),
            Some("products/my.file.name")
        );
    }

    #[test]
    fn foreign_and_malformed_urls_parse_to_none() {
        let store = store();
        assert_eq!(
            store.object_key_from_url("https://elsewhere.example.com/catalog-media/products/abc"),
            None
        );
        assert_eq!(
            store.object_key_from_url("https://media.example.com/other-bucket/products/abc"),
            None
        );
        assert_eq!(
            store.object_key_from_url("https://media.example.com/catalog-media/"),
            None
        );
        assert_eq!(
            store.object_key_from_url("https://media.example.com/catalog-media/v123/"),
            None
        );
        assert_eq!(
            store.object_key_from_url("https://media.example.com/catalog-media/.png"),
            None
        );
        assert_eq!(store.object_key_from_url("not a url"), None);
    }
}
