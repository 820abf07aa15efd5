//! Local file input for the workflow
//!
//! This module keeps file reads out of the request-building code. Files are
//! read whole, so each handle is closed as soon as its bytes are in memory,
//! on success and on error alike.

use crate::error::{InpaintError, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Media type used when none is declared and the extension is unknown
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// An image ready to be sent to the upload endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name the service will list the image under (no extension)
    pub base_name: String,
    /// Extension appended to the multipart file name, including the dot
    pub extension: String,
    /// Declared media type of `bytes`
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("base_name", &self.base_name)
            .field("extension", &self.extension)
            .field("media_type", &self.media_type)
            .field("bytes", &format!("{} bytes", self.bytes.len()))
            .finish()
    }
}

impl UploadFile {
    /// Build an upload from bytes already in memory
    pub fn from_bytes<N, E, M>(base_name: N, extension: E, media_type: M, bytes: Vec<u8>) -> Result<Self>
    where
        N: Into<String>,
        E: Into<String>,
        M: Into<String>,
    {
        let base_name = base_name.into();
        if base_name.trim().is_empty() {
            return Err(InpaintError::invalid_config("Remote file name cannot be empty"));
        }

        let extension = extension.into();
        let extension = if extension.is_empty() || extension.starts_with('.') {
            extension
        } else {
            format!(".{}", extension)
        };

        Ok(Self {
            base_name,
            extension,
            media_type: media_type.into(),
            bytes,
        })
    }

    /// Read an image from disk
    ///
    /// `remote_name` defaults to the file stem and `media_type` is inferred
    /// from the extension when not given.
    ///
    /// # Errors
    /// - File cannot be read
    /// - No usable file name for the remote copy
    pub async fn from_path<P: AsRef<Path>>(
        path: P,
        remote_name: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = LocalFiles::read(path).await?;

        let base_name = match remote_name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    InpaintError::invalid_config(format!(
                        "Cannot derive a remote name from '{}'",
                        path.display()
                    ))
                })?,
        };

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let media_type = media_type.map_or_else(|| infer_media_type(path), str::to_string);

        Self::from_bytes(base_name, extension, media_type, bytes)
    }

    /// File name sent in the multipart `image` part
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }
}

/// Guess a media type from the file extension
#[must_use]
pub fn infer_media_type(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MEDIA_TYPE.to_string())
}

/// Service for reading and writing the workflow's local files
pub struct LocalFiles;

impl LocalFiles {
    /// Read a whole file, closing it before returning
    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        tokio::fs::read(path)
            .await
            .map_err(|e| InpaintError::file_io_error("read file", path, &e))
    }

    /// Write bytes, creating the parent directory when needed
    pub async fn write<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InpaintError::file_io_error("create output directory", parent, &e))?;
        }
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| InpaintError::file_io_error("write file", path, &e))?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_from_path_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panda.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let upload = UploadFile::from_path(&path, None, None).await.unwrap();
        assert_eq!(upload.base_name, "panda");
        assert_eq!(upload.extension, ".png");
        assert_eq!(upload.media_type, "image/png");
        assert_eq!(upload.file_name(), "panda.png");
        assert_eq!(upload.bytes, b"not really a png");
    }

    #[tokio::test]
    async fn test_from_path_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panda.png");
        std::fs::write(&path, b"x").unwrap();

        let upload = UploadFile::from_path(&path, Some("animal_image"), Some("image/webp"))
            .await
            .unwrap();
        assert_eq!(upload.file_name(), "animal_image.png");
        assert_eq!(upload.media_type, "image/webp");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = UploadFile::from_path(dir.path().join("nope.png"), None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("read file"));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn test_from_bytes_normalises_extension() {
        let upload = UploadFile::from_bytes("a", "jpg", "image/jpeg", vec![]).unwrap();
        assert_eq!(upload.file_name(), "a.jpg");
        let upload = UploadFile::from_bytes("a", "", "image/jpeg", vec![]).unwrap();
        assert_eq!(upload.file_name(), "a");
        assert!(UploadFile::from_bytes(" ", ".png", "image/png", vec![]).is_err());
    }

    #[test]
    fn test_infer_media_type() {
        assert_eq!(infer_media_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(infer_media_type(Path::new("a.webp")), "image/webp");
        assert_eq!(infer_media_type(Path::new("a.unknown")), FALLBACK_MEDIA_TYPE);
        assert_eq!(infer_media_type(Path::new("noext")), FALLBACK_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_write_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/mask.png");
        LocalFiles::write(&path, b"abc").await.unwrap();
        assert_eq!(LocalFiles::read(&path).await.unwrap(), b"abc");
    }

    #[test]
    fn test_debug_hides_payload() {
        let upload = UploadFile::from_bytes("a", ".png", "image/png", vec![1, 2, 3]).unwrap();
        assert!(format!("{:?}", upload).contains("3 bytes"));
    }
}
