use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{CompletedSession, User};

pub const CURRENT_USER_KEY: &str = "typing_racer_current_user";
pub const USERS_KEY: &str = "typing_racer_users";
pub const SESSIONS_KEY: &str = "typing_racer_sessions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Store file {} is not valid JSON: {source}", .path.display())]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value stored under `{key}` could not be read: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value for `{key}` could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store file {} could not be encoded: {source}", .path.display())]
    EncodeFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store; forgets everything when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// All entries kept in one JSON object on disk.
///
/// The file is rewritten on every change through a sibling temporary file and a
/// rename, so a crash mid-write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                warn!(path = %path.display(), "store file is corrupt");
                StoreError::CorruptFile {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let data = serde_json::to_vec_pretty(&self.entries).map_err(|source| StoreError::EncodeFile {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed access to players and races.
#[derive(Debug, Clone, Default)]
pub struct Storage<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> Storage<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, raw)
    }

    pub fn current_user(&self) -> Result<Option<User>, StoreError> {
        self.read(CURRENT_USER_KEY)
    }

    /// Make `user` the active player, or sign out with `None`.
    pub fn set_current_user(&mut self, user: Option<&User>) -> Result<(), StoreError> {
        match user {
            Some(user) => self.write(CURRENT_USER_KEY, user),
            None => self.kv.remove(CURRENT_USER_KEY),
        }
    }

    pub fn all_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read(USERS_KEY)?.unwrap_or_default())
    }

    /// Insert `user`, or replace the stored user with the same id.
    pub fn save_user(&mut self, user: &User) -> Result<(), StoreError> {
        let mut users = self.all_users()?;

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }

        debug!(user = %user.username, "saving user");
        self.write(USERS_KEY, &users)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .all_users()?
            .into_iter()
            .find(|u| u.email.to_lowercase() == email))
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let username = username.to_lowercase();
        Ok(self
            .all_users()?
            .into_iter()
            .find(|u| u.username.to_lowercase() == username))
    }

    /// Every stored race, in the order they were saved.
    pub fn all_sessions(&self) -> Result<Vec<CompletedSession>, StoreError> {
        Ok(self.read(SESSIONS_KEY)?.unwrap_or_default())
    }

    pub fn save_session(&mut self, session: &CompletedSession) -> Result<(), StoreError> {
        let mut sessions = self.all_sessions()?;
        sessions.push(session.clone());

        debug!(session = %session.id, wpm = session.wpm, "saving race");
        self.write(SESSIONS_KEY, &sessions)
    }

    /// Races by `user_id`, newest first.
    pub fn user_sessions(&self, user_id: Uuid) -> Result<Vec<CompletedSession>, StoreError> {
        Ok(self
            .all_sessions()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .sorted_by(|a, b| b.created_at.cmp(&a.created_at))
            .collect())
    }

    /// The `limit` fastest races across all players. Ties keep save order.
    pub fn top_sessions(&self, limit: usize) -> Result<Vec<CompletedSession>, StoreError> {
        Ok(self
            .all_sessions()?
            .into_iter()
            .sorted_by(|a, b| b.wpm.cmp(&a.wpm))
            .take(limit)
            .collect())
    }
}
