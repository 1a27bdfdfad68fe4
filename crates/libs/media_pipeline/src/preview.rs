use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

/// Revocable local reference to a staged file's bytes, used only for
/// on-screen preview while the draft is open.
///
/// The backing temp file is removed when the handle is released. Release is
/// idempotent, and dropping an unreleased handle releases it, so every exit
/// path of a draft cleans up.
#[derive(Debug)]
pub struct PreviewHandle {
    file: Option<NamedTempFile>,
}

impl PreviewHandle {
    pub fn new(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file: Some(file) })
    }

    /// Path to the preview file, or `None` once released.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(NamedTempFile::path)
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    /// Removes the backing file. Calling this again is a no-op.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                warn!("Failed to remove preview file: {e}");
            }
        }
    }
}
