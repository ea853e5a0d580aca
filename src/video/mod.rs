//! Video selection, validation and payload encoding
//!
//! A [`SelectedFile`] is what the user picked: path, name, size and the
//! declared content type. Validation is synchronous and happens before any
//! async work. Encoding turns the file into a base64 payload and produces an
//! immutable [`VideoAsset`].

pub(crate) mod preview;

use crate::error::{AppError, VideoError};
use base64::Engine;
use preview::PreviewHandle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Content types for the video containers we recognise by extension.
const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("3gp", "video/3gpp"),
    ("ogv", "video/ogg"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("ts", "video/mp2t"),
];

/// A file chosen by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectedFile {
    pub(crate) path: PathBuf,
    pub(crate) name: String,
    pub(crate) size: u64,
    /// Declared content type; `None` when it cannot be determined
    pub(crate) content_type: Option<String>,
}

impl SelectedFile {
    /// Inspect a file on disk.
    ///
    /// `declared_type` overrides the extension-based content type.
    pub(crate) fn inspect(path: &Path, declared_type: Option<&str>) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path).map_err(|e| AppError::Inspect {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !metadata.is_file() {
            return Err(AppError::Inspect {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = declared_type
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .or_else(|| content_type_for_path(path).map(str::to_string));

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            content_type,
        })
    }

    /// Check the size ceiling, then the declared content type.
    pub(crate) fn validate(&self, max_size_bytes: u64) -> Result<(), VideoError> {
        if self.size > max_size_bytes {
            return Err(VideoError::TooLarge {
                size: self.size,
                max_mb: max_size_bytes / BYTES_PER_MB,
            });
        }
        let is_video = self
            .content_type
            .as_deref()
            .is_some_and(|t| t.starts_with("video/"));
        if !is_video {
            return Err(VideoError::NotAVideo {
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }
}

/// Content type guessed from the file extension.
pub(crate) fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// A validated, encoded video ready for analysis.
///
/// Never mutated in place: selecting another file builds a new asset and
/// drops the old one, releasing its preview.
#[derive(Debug)]
pub(crate) struct VideoAsset {
    pub(crate) file: SelectedFile,
    pub(crate) preview: Option<PreviewHandle>,
    pub(crate) payload: Arc<str>,
    pub(crate) mime_type: String,
}

/// Read and base64-encode a validated file.
#[instrument(skip(file), fields(path = %file.path.display(), size = file.size))]
pub(crate) async fn encode(file: SelectedFile) -> Result<VideoAsset, VideoError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| VideoError::Read {
            path: file.path.clone(),
            source: e,
        })?;

    let payload = tokio::task::spawn_blocking(move || {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    })
    .await
    .map_err(|e| VideoError::Encode(e.to_string()))?;

    let preview = PreviewHandle::create(&file.path);
    if preview.is_none() {
        warn!("Could not create a preview for {}", file.path.display());
    }

    // Validation guarantees a declared type by now
    let mime_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| "video/mp4".to_string());

    info!(
        payload_len = payload.len(),
        mime_type = %mime_type,
        "Encoded video payload"
    );

    Ok(VideoAsset {
        file,
        preview,
        payload: Arc::from(payload),
        mime_type,
    })
}

/// Human-readable size, base 1024 with up to two decimals.
pub(crate) fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
