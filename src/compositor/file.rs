//! Writing exported frames to disk.

use super::types::ExportError;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Builds `<prefix>-<unix-epoch-ms>.png` for the current time.
pub fn export_filename(prefix: &str) -> String {
    format!("{}-{}.png", prefix, Utc::now().timestamp_millis())
}

/// Ensure the save directory exists, creating it if necessary.
///
/// # Returns
/// The canonicalized path to the directory
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, ExportError> {
    if !directory.exists() {
        log::info!("Creating export directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }

    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());

    Ok(canonical)
}

/// Writes PNG bytes as `directory/filename`, readable by the owner only.
pub fn save_png(png: &[u8], directory: &Path, filename: &str) -> Result<PathBuf, ExportError> {
    let directory = ensure_directory_exists(directory)?;
    let file_path = directory.join(filename);

    log::info!(
        "Saving frame to: {} ({} bytes)",
        file_path.display(),
        png.len()
    );

    fs::write(&file_path, png)?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&file_path, Permissions::from_mode(0o600))?;
    }

    log::debug!("File written: {} bytes", fs::metadata(&file_path)?.len());
    Ok(file_path)
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
