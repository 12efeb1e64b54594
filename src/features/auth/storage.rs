//! Persistence for the single session token. Exactly one token is stored under
//! a fixed key; saving replaces it and removing a missing token is not an error.

use crate::app_lib::ConsoleError;
use secrecy::{ExposeSecret, SecretString};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

pub trait TokenStorage: Send + Sync {
    /// # Errors
    /// Returns `Storage` when the backing store cannot be read.
    fn load(&self) -> Result<Option<SecretString>, ConsoleError>;

    /// # Errors
    /// Returns `Storage` when the token cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), ConsoleError>;

    /// # Errors
    /// Returns `Storage` when an existing token cannot be removed.
    fn remove(&self) -> Result<(), ConsoleError>;
}

/// Token kept in a file readable only by the current user.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<SecretString>, ConsoleError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_string())))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error("read", &self.path, &err)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), ConsoleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| storage_error("create", parent, &err))?;
        }
        let mut file =
            open_private(&self.path).map_err(|err| storage_error("open", &self.path, &err))?;
        file.write_all(token.expose_secret().as_bytes())
            .map_err(|err| storage_error("write", &self.path, &err))?;
        // The creation mode only applies to new files.
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "token persisted");
        Ok(())
    }

    fn remove(&self) -> Result<(), ConsoleError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error("remove", &self.path, &err)),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ConsoleError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|err| storage_error("chmod", path, &err))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ConsoleError> {
    Ok(())
}

fn storage_error(action: &str, path: &Path, err: &std::io::Error) -> ConsoleError {
    ConsoleError::Storage(format!("Failed to {action} {}: {err}", path.display()))
}

/// In-process storage, used by tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<SecretString>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<SecretString>>, ConsoleError> {
        self.token
            .lock()
            .map_err(|_| ConsoleError::Storage("token storage lock poisoned".to_string()))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<SecretString>, ConsoleError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), ConsoleError> {
        *self.slot()? = Some(token.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), ConsoleError> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip_and_remove() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FileTokenStorage::new(dir.path().join("nested").join("token"));

        assert!(storage.load()?.is_none());
        storage.save(&SecretString::from("tok-abc".to_string()))?;
        assert_eq!(storage.load()?.unwrap().expose_secret(), "tok-abc");

        storage.remove()?;
        assert!(storage.load()?.is_none());
        // removing twice is fine
        storage.remove()?;
        Ok(())
    }

    #[test]
    fn file_storage_ignores_blank_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("token");
        fs::write(&path, "  \n")?;
        assert!(FileTokenStorage::new(path).load()?.is_none());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_is_owner_only() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir()?;
        let storage = FileTokenStorage::new(dir.path().join("token"));
        storage.save(&SecretString::from("tok".to_string()))?;
        let mode = fs::metadata(storage.path())?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_created_owner_only() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("token");
        // no chmod afterwards: the file must never exist with a wider mode
        drop(open_private(&path)?);
        let mode = fs::metadata(&path)?.permissions().mode();
        assert_eq!(mode & 0o077, 0);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn save_tightens_existing_world_readable_file() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("token");
        fs::write(&path, "stale-token-with-a-longer-value")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;

        let storage = FileTokenStorage::new(path.clone());
        storage.save(&SecretString::from("tok".to_string()))?;

        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o600);
        assert_eq!(storage.load()?.unwrap().expose_secret(), "tok");
        Ok(())
    }

    #[test]
    fn memory_storage_replaces_token() -> anyhow::Result<()> {
        let storage = MemoryTokenStorage::new(Some(SecretString::from("old".to_string())));
        storage.save(&SecretString::from("new".to_string()))?;
        assert_eq!(storage.load()?.unwrap().expose_secret(), "new");
        storage.remove()?;
        assert!(storage.load()?.is_none());
        Ok(())
    }
}
