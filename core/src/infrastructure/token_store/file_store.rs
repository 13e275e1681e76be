use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{
    authentication::{entities::StoredSession, ports::TokenStore},
    common::entities::app_errors::CoreError,
};

/// Stores the session as a JSON file. Writes go through a temporary file and
/// a rename so a reader never observes a partial record.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn write_atomically(&self, session: &StoredSession) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let temp_path = self.temp_path();
        {
            let file = File::create(&temp_path)
                .map_err(|e| CoreError::Storage(format!("failed to create temp file: {e}")))?;
            restrict_permissions(&file);

            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, session)
                .map_err(|e| CoreError::Storage(format!("failed to encode session: {e}")))?;
            writer
                .flush()
                .map_err(|e| CoreError::Storage(format!("failed to write session: {e}")))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| CoreError::Storage(format!("failed to sync session: {e}")))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| CoreError::Storage(format!("failed to finalize session file: {e}")))
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        warn!("failed to restrict session file permissions: {e}");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) {}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, CoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable session file: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), CoreError> {
        self.write_atomically(session)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn session(access_token: &str) -> StoredSession {
        StoredSession {
            access_token: access_token.to_string(),
            refresh_token: "refresh".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/session.json"));

        assert_eq!(store.load().unwrap(), None);

        store.save(&session("first")).unwrap();
        store.save(&session("second")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session("second")));
        assert!(!store.temp_path().exists());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{\"access_token\": ").unwrap();

        assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        store.save(&session("token")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
