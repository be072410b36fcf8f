//! Binary content source
//!
//! Files carry a source URI pointing at their binary content; at ingest
//! time the content is fetched to completion and handed to the store as
//! the file's primary datastream.

use async_trait::async_trait;
use bytes::Bytes;
use preservio_common::{Error, Result};

/// Fetches binary content addressed by URI
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Read the content at `uri` to completion
    async fn fetch(&self, uri: &str) -> Result<Bytes>;
}

/// Content source for `file://` and `http(s)://` ingest locations
///
/// Bare paths without a scheme are treated as local files. One shared
/// HTTP client is reused across fetches.
#[derive(Debug, Clone, Default)]
pub struct UriContentSource {
    client: reqwest::Client,
}

impl UriContentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_local(uri: &str, path: &str) -> Result<Bytes> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::content_fetch(uri, e.to_string()))?;
        Ok(Bytes::from(data))
    }
}

#[async_trait]
impl ContentSource for UriContentSource {
    async fn fetch(&self, uri: &str) -> Result<Bytes> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Self::read_local(uri, path).await;
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            let response = self
                .client
                .get(uri)
                .send()
                .await
                .map_err(|e| Error::content_fetch(uri, e.to_string()))?;
            if !response.status().is_success() {
                return Err(Error::content_fetch(
                    uri,
                    format!("HTTP status {}", response.status()),
                ));
            }
            return response
                .bytes()
                .await
                .map_err(|e| Error::content_fetch(uri, e.to_string()));
        }
        if !uri.contains("://") {
            return Self::read_local(uri, uri).await;
        }
        Err(Error::content_fetch(uri, "unsupported URI scheme"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"binary content").expect("write");

        let source = UriContentSource::new();
        let uri = format!("file://{}", file.path().display());
        assert_eq!(
            source.fetch(&uri).await.unwrap(),
            Bytes::from_static(b"binary content")
        );
        // bare path works too
        let bare = file.path().display().to_string();
        assert_eq!(
            source.fetch(&bare).await.unwrap(),
            Bytes::from_static(b"binary content")
        );
    }

    #[tokio::test]
    async fn test_fetch_missing_file_fails() {
        let source = UriContentSource::new();
        let err = source.fetch("file:///no/such/file").await.unwrap_err();
        assert!(matches!(err, Error::ContentFetch { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_fails() {
        let source = UriContentSource::new();
        let err = source.fetch("ftp://example.org/x").await.unwrap_err();
        assert!(matches!(err, Error::ContentFetch { .. }));
    }
}
