//! On-disk storage for course PDF attachments.
//!
//! Each course owns at most one file, `<dir>/<course id>.pdf`. Bodies arrive as
//! data URLs (`data:application/pdf;base64,<payload>`) and leave as plain
//! standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("invalid attachment encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("attachment not found")]
    NotFound,

    #[error("attachment io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Decodes a data URL body. Everything after the first comma is the payload;
/// a body without a comma is taken whole.
pub fn decode_data_url(body: &str) -> Result<Vec<u8>, AttachmentError> {
    let payload = body.split_once(',').map_or(body, |(_, payload)| payload);
    Ok(STANDARD.decode(payload.trim())?)
}

#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, course_id: i32) -> PathBuf {
        self.root.join(format!("{course_id}.pdf"))
    }

    /// Creates or truncates the course file, writes all bytes and syncs to disk.
    pub async fn write(&self, course_id: i32, bytes: &[u8]) -> Result<(), AttachmentError> {
        let path = self.path_for(course_id);
        let io_err = |source| AttachmentError::Io {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(io_err)?;

        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;

        Ok(())
    }

    pub async fn read(&self, course_id: i32) -> Result<Vec<u8>, AttachmentError> {
        let path = self.path_for(course_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AttachmentError::NotFound),
            Err(source) => Err(AttachmentError::Io { path, source }),
        }
    }

    /// Best-effort removal. A missing file is not an error; other failures are
    /// logged and swallowed.
    pub async fn remove(&self, course_id: i32) {
        let path = self.path_for(course_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(course_id, "Removed attachment"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                course_id,
                path = %path.display(),
                error = %e,
                "Failed to remove attachment"
            ),
        }
    }
}
