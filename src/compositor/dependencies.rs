use std::path::{Path, PathBuf};

use super::{file, types::ExportError};

/// Destination for encoded frames. Can be mocked in tests.
pub trait ExportSink: Send + Sync {
    fn save(&self, png: &[u8], filename: &str) -> Result<PathBuf, ExportError>;
}

/// Saves frames into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ExportSink for DirectorySink {
    fn save(&self, png: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
        file::save_png(png, &self.directory, filename)
    }
}
