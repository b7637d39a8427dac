use super::FileSystem;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory {:?}", parent))?;

        // Stage next to the destination so the rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(parent)
            .context(format!("Failed to create temporary file in {:?}", parent))?;
        staged
            .write_all(contents.as_bytes())
            .context(format!("Failed to write temporary file for {:?}", path))?;
        // Temporary files are created 0600; generated modules must stay readable.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .context(format!("Failed to set permissions for {:?}", path))?;
        }
        staged
            .persist(path)
            .map_err(|e| anyhow!("Failed to replace {:?}: {}", path, e.error))?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let meta =
            fs::symlink_metadata(path).context(format!("Failed to stat {:?}", path))?;
        if meta.is_dir() {
            fs::remove_dir_all(path).context(format!("Failed to remove directory {:?}", path))
        } else {
            fs::remove_file(path).context(format!("Failed to remove file {:?}", path))
        }
    }
}
