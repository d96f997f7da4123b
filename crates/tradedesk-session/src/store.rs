//! Persistent storage for the bearer token.
//!
//! The session survives process restarts by writing its token to a
//! [`TokenStore`] under one fixed key, [`TOKEN_KEY`]. Storage is
//! synchronous: reads and writes are small and happen at most a few
//! times per session, so there's nothing to gain from async here.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use serde_json::{Map, Value};

use crate::StoreError;

/// The key the token is stored under.
pub const TOKEN_KEY: &str = "access_token";

/// Somewhere the token can outlive the process.
///
/// # Trait bounds
///
/// - `Send + Sync` → the session manager is shared between tasks, and so
///   is its store.
/// - `'static` → the store lives as long as the application.
pub trait TokenStore: Send + Sync + 'static {
    /// Reads the persisted token, `None` if there is none.
    ///
    /// # Errors
    /// [`StoreError`] if the medium can't be read or holds garbage.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Persists `token`, replacing any previous one.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the write fails.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Deletes the persisted token. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the delete fails.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: TokenStore> TokenStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// An in-process store.
///
/// Clones share the same slot, which is how tests simulate "a fresh
/// process reading the same storage": build a second manager on a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// Stores the token in a small JSON object file: `{"access_token": "..."}`.
///
/// Other keys in the file are preserved, so the file can double as a
/// client-side settings document. Writes go to a sibling temp file that is
/// then renamed over the target, so a crash never leaves half a token.
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

    /// Reads the whole document. A missing file is an empty document.
    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(StoreError::Corrupt(format!("{}: {e}", self.path.display()))),
        }
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let suffix: u32 = rand::rng().random();
        let tmp = self.path.with_extension(format!("{suffix:08x}.tmp"));
        let written = create_private(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Creates `path`, failing if it exists. On unix the file is owner-only
/// from the moment it appears.
fn create_private(path: &Path) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let doc = self.read_document()?;
        match doc.get(TOKEN_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) if token.is_empty() => Ok(None),
            Some(Value::String(token)) => Ok(Some(token.clone())),
            Some(_) => Err(StoreError::Corrupt(format!("`{TOKEN_KEY}` is not a string"))),
        }
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        // A corrupt document is replaced rather than blocking login.
        let mut doc = self.read_document().unwrap_or_default();
        doc.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_document(&doc)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut doc = match self.read_document() {
            Ok(doc) => doc,
            Err(StoreError::Corrupt(_)) => Map::new(),
            Err(e) => return Err(e),
        };
        doc.remove(TOKEN_KEY);

        if doc.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        } else {
            self.write_document(&doc)
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
