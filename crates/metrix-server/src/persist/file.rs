use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use metrix_core::error::{MetrixError, Result};
use metrix_core::snapshot::Snapshot;
use metrix_core::store::{MetricReader, MetricRestorer};

/// One snapshot file. Saves are serialised so the newest capture always lands last.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Capture `reader` and replace the file with it. Returns the number of metrics written.
    pub async fn save<R: MetricReader + ?Sized>(&self, reader: &R) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let snap = Snapshot::capture(reader)?;
        let raw = snap.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create dir", parent, e))?;
        }

        // A crash mid-write leaves the previous file intact.
        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, &raw)
            .await
            .map_err(|e| io_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error("rename", &self.path, e))?;

        Ok(snap.len())
    }

    /// Replace the contents of `restorer` with the file. Returns the number of metrics loaded.
    pub async fn restore<R: MetricRestorer + ?Sized>(&self, restorer: &R) -> Result<usize> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| io_error("read", &self.path, e))?;
        let snap = Snapshot::from_json(&raw)?;
        let n = snap.len();
        snap.apply(restorer)?;
        Ok(n)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".tmp");
    PathBuf::from(s)
}

fn io_error(op: &str, path: &Path, e: std::io::Error) -> MetrixError {
    MetrixError::Persistence(format!("{op} {} failed: {e}", path.display()))
}
