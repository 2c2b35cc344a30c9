use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::error::{ServiceError, ServiceResult};
use crate::models::AuthenticatedUser;

/// Key of the stored session (the logged-in user, token included)
pub const SESSION_KEY: &str = "user";

/// String key/value persistence, the shape of browser localStorage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ServiceResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ServiceResult<()>;
    fn remove(&self, key: &str) -> ServiceResult<()>;
}

/// Reads and deserializes a JSON value; `None` if the key is absent
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> ServiceResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn set_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> ServiceResult<()> {
    store.set(key, &serde_json::to_string(value)?)
}

/// Process-local store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        let entries = self.entries.lock().map_err(ServiceError::storage)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        let mut entries = self.entries.lock().map_err(ServiceError::storage)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ServiceResult<()> {
        let mut entries = self.entries.lock().map_err(ServiceError::storage)?;
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> ServiceResult<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ServiceError::Storage(format!("invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::storage(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(ServiceError::storage)?;
        // write-then-rename so readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(ServiceError::storage)?;
        fs::rename(&tmp, &path).map_err(ServiceError::storage)
    }

    fn remove(&self, key: &str) -> ServiceResult<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::storage(e)),
        }
    }
}

/// The stored "logged-in user". Remote calls take their bearer token from
/// here; local calls take their acting identity from here.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn current(&self) -> ServiceResult<Option<AuthenticatedUser>> {
        get_json(self.store.as_ref(), SESSION_KEY)
    }

    pub fn token(&self) -> ServiceResult<Option<String>> {
        Ok(self.current()?.map(|user| user.token))
    }

    pub fn save(&self, user: &AuthenticatedUser) -> ServiceResult<()> {
        set_json(self.store.as_ref(), SESSION_KEY, user)
    }

    pub fn clear(&self) -> ServiceResult<()> {
        self.store.remove(SESSION_KEY)
    }
}
