use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

/// Prefix reserved for hidden entries (config, markers) under the notes root.
pub const HIDDEN_PREFIX: char = '.';

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No value stored for {0}!")]
    NotFound(String),
    #[error("A note already exists for {0}; pass overwrite to replace it")]
    Conflict(String),
    #[error("No task called {task} exists. To create it while marking it done use --create.")]
    TaskNotFound { task: String },
    #[error("Invalid key {0:?}: keys must be non-empty, must not start with '.' and must not contain path separators")]
    InvalidKey(String),
    #[error("IO error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(key: &str, source: io::Error) -> Self {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub key: String,
    pub executable: bool,
    pub created_at: SystemTime,
}

/// Filesystem-backed key/document store. Each key is one file directly under `root`.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    /// Open the store, creating the root directory when it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|err| StoreError::io(&root.to_string_lossy(), err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    pub fn read(&self, key: &str) -> Result<String, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(err) => Err(StoreError::io(key, err)),
        }
    }

    /// Replace the document at `key`. Without `overwrite`, an existing document is left
    /// untouched and `Conflict` is returned.
    pub fn write(&self, key: &str, text: &str, overwrite: bool) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if path.exists() && !overwrite {
            return Err(StoreError::Conflict(key.to_string()));
        }
        fs::write(&path, text).map_err(|err| StoreError::io(key, err))?;
        tracing::debug!(key, bytes = text.len(), "wrote note");
        Ok(())
    }

    pub fn append(&self, key: &str, text: &str, separator: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return self.write(key, text, true);
        }
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|err| StoreError::io(key, err))?;
        file.write_all(separator.as_bytes())
            .and_then(|_| file.write_all(text.as_bytes()))
            .map_err(|err| StoreError::io(key, err))?;
        tracing::debug!(key, bytes = text.len(), "appended to note");
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Err(err) => return Err(StoreError::io(key, err)),
        }
        exec_flag::clear(&self.root, key).map_err(|err| StoreError::io(key, err))?;
        Ok(())
    }

    /// All visible documents, in whatever order the filesystem yields them.
    pub fn list(&self) -> Result<Vec<NoteEntry>, StoreError> {
        let root_name = self.root.to_string_lossy().to_string();
        let entries = fs::read_dir(&self.root).map_err(|err| StoreError::io(&root_name, err))?;
        let mut notes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io(&root_name, err))?;
            let key = entry.file_name().to_string_lossy().to_string();
            if key.starts_with(HIDDEN_PREFIX) {
                continue;
            }
            let metadata = entry.metadata().map_err(|err| StoreError::io(&key, err))?;
            if !metadata.is_file() {
                continue;
            }
            let executable = exec_flag::get(&self.root, &key, &metadata);
            notes.push(NoteEntry {
                created_at: created_at(&metadata),
                executable,
                key,
            });
        }
        Ok(notes)
    }

    pub fn mark_executable(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        exec_flag::set(&self.root, key).map_err(|err| StoreError::io(key, err))?;
        Ok(())
    }

    pub fn is_executable(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        match fs::metadata(&path) {
            Ok(metadata) => Ok(exec_flag::get(&self.root, key, &metadata)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(err) => Err(StoreError::io(key, err)),
        }
    }
}

pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.is_empty()
        || key.starts_with(HIDDEN_PREFIX)
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(unix)]
fn created_at(metadata: &fs::Metadata) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    let secs = metadata.ctime();
    let nanos = metadata.ctime_nsec().clamp(0, 999_999_999) as u32;
    if secs >= 0 {
        SystemTime::UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        SystemTime::UNIX_EPOCH
    }
}

#[cfg(not(unix))]
fn created_at(metadata: &fs::Metadata) -> SystemTime {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(unix)]
mod exec_flag {
    use std::fs;
    use std::io;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const EXEC_BITS: u32 = 0o111;

    pub fn get(_root: &Path, _key: &str, metadata: &fs::Metadata) -> bool {
        metadata.permissions().mode() & EXEC_BITS != 0
    }

    pub fn set(root: &Path, key: &str) -> io::Result<()> {
        let path = root.join(key);
        let mut permissions = fs::metadata(&path)?.permissions();
        permissions.set_mode(permissions.mode() | 0o100);
        fs::set_permissions(&path, permissions)
    }

    pub fn clear(_root: &Path, _key: &str) -> io::Result<()> {
        Ok(())
    }
}

// Without permission bits the flag lives in a hidden sidecar directory.
#[cfg(not(unix))]
mod exec_flag {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    fn marker(root: &Path, key: &str) -> PathBuf {
        root.join(".executable").join(key)
    }

    pub fn get(root: &Path, key: &str, _metadata: &fs::Metadata) -> bool {
        marker(root, key).is_file()
    }

    pub fn set(root: &Path, key: &str) -> io::Result<()> {
        let path = marker(root, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "")
    }

    pub fn clear(root: &Path, key: &str) -> io::Result<()> {
        match fs::remove_file(marker(root, key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}
