//! File-backed object store.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{ObjectStore, RepositoryError, Result};

/// Object store writing one pretty-printed JSON file per key.
///
/// # File Layout
///
/// A key such as `menu/Rin/turn` is stored as `menu_Rin_turn.json` under the
/// base directory. Other characters are percent-escaped, so distinct keys
/// never share a file. Writes go to a temporary file first and are moved
/// into place with a rename.
#[derive(Debug, Clone)]
pub struct FileObjectStore {
    base_dir: PathBuf,
}

impl FileObjectStore {
    /// Opens a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Maps a key to a file stem without collisions.
///
/// ASCII letters, digits and `-` are kept, `/` becomes `_`, and every other
/// byte (including a literal `_`) is written as `%XX`.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'/' => stem.push('_'),
            b'-' => stem.push('-'),
            _ if byte.is_ascii_alphanumeric() => stem.push(char::from(byte)),
            _ => stem.push_str(&format!("%{byte:02X}")),
        }
    }
    stem
}

impl ObjectStore for FileObjectStore {
    fn load_value(&self, key: &str) -> Result<Option<Value>> {
        let path = self.object_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let value = serde_json::from_slice(&bytes).map_err(RepositoryError::Json)?;
        debug!(target: "runtime::repository", key, path = %path.display(), "Loaded object");
        Ok(Some(value))
    }

    fn save_value(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.object_path(key);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        debug!(target: "runtime::repository", key, path = %path.display(), "Saved object");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.object_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!(target: "runtime::repository", key, "Removed object");
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.object_path(key).exists()
    }
}
