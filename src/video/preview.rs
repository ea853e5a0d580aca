//! Local preview handles for selected videos
//!
//! A preview handle is a `file://` reference to the clip that can be handed
//! to the system video player. Live handles are tracked in a process-wide
//! registry; dropping a handle releases it, so replacing or removing a video
//! never leaves a dangling preview behind.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

static LIVE_PREVIEWS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// A registered preview reference for one selected video.
#[derive(Debug)]
pub(crate) struct PreviewHandle {
    id: String,
    url: Url,
}

impl PreviewHandle {
    /// Register a preview for the file at `path`.
    ///
    /// Returns `None` when no `file://` URL can be built for the path.
    pub(crate) fn create(path: &Path) -> Option<Self> {
        let absolute = std::path::absolute(path).ok()?;
        let url = Url::from_file_path(&absolute).ok()?;
        let id = format!("preview-{:016x}", rand::random::<u64>());

        match LIVE_PREVIEWS.lock() {
            Ok(mut live) => {
                live.insert(id.clone());
            }
            Err(e) => {
                error!("Preview registry lock poisoned: {}", e);
                return None;
            }
        }

        debug!(id = %id, url = %url, "Registered preview handle");
        Some(Self { id, url })
    }

    #[cfg(test)]
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    /// Open the clip in the system's default video player.
    pub(crate) fn open(&self) -> std::io::Result<()> {
        info!(url = %self.url, "Opening preview");
        open::that(self.url.as_str())
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = LIVE_PREVIEWS.lock() {
            live.remove(&self.id);
        }
        debug!(id = %self.id, "Released preview handle");
    }
}

/// Whether the preview with the given id is still registered.
#[cfg(test)]
pub(crate) fn is_live(id: &str) -> bool {
    LIVE_PREVIEWS
        .lock()
        .map(|live| live.contains(id))
        .unwrap_or(false)
}
