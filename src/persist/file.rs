use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Storage;
use crate::error::StorageError;

const EXTENSION: &str = "json";
const TMP_SUFFIX: &str = ".json.tmp";

/// Directory-backed implementation of [`Storage`].
///
/// Each key maps to `<dir>/<key>.json`. Keys must be usable as plain file
/// names.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open a medium rooted at `dir`, creating the directory if missing.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened file storage at {:?}", dir);
        Ok(Self { dir })
    }

    /// Directory holding the stored keys.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }
    if key == "." || key == ".." || key.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidKey(format!(
            "{key:?} cannot be used as a file name"
        )));
    }
    Ok(())
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write beside the target and rename so readers never see half a value.
        let tmp = self.dir.join(format!("{key}{TMP_SUFFIX}"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let stored = path.extension().is_some_and(|ext| ext == EXTENSION);
            let leftover = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(TMP_SUFFIX));
            if stored || leftover {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
