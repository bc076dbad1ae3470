//! Session keys persisted as a flat JSON object in one file.
//!
//! DESIGN
//! ======
//! The whole map is loaded once and written back after every change, so a
//! command that refreshes a token mid-run leaves the file current even if a
//! later step fails. Write failures are logged rather than returned: the
//! storage seam is infallible and losing the cache only costs a re-login.

#[cfg(test)]
#[path = "file_storage_test.rs"]
mod file_storage_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use session::SessionStorage;

pub struct FileStorage {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Load `path`. A missing file is an empty session; an unreadable one is
    /// discarded with a warning.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, entries: RefCell::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.write_file() {
            tracing::warn!(path = %self.path.display(), error = %e, "session file not saved");
        }
    }

    fn write_file(&self) -> io::Result<()> {
        let entries = self.entries.borrow();
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&*entries).map_err(io::Error::other)?;
        let mut file = open_private(&self.path)?;
        file.write_all(raw.as_bytes())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let changed = self.entries.borrow_mut().insert(key.to_owned(), value.to_owned()).as_deref() != Some(value);
        if changed {
            self.persist();
        }
    }

    fn remove(&self, key: &str) {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            self.persist();
        }
    }
}

/// Open `path` for rewriting, owner-only. A new file is created with mode
/// 0600 so the tokens are never readable by others; an existing file is
/// tightened before any bytes are written.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}
