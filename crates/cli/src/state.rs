//! Client-resident state files.
//!
//! The operator client keeps its session context (who is signed in, which
//! patient is selected) and its basket in JSON files under the data
//! directory, so state survives between invocations the way the original
//! deployment kept it between page loads. Missing files read as empty
//! state.

use medilabel_core::{BasketStore, SessionContext, StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Session context file, relative to the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Basket file, relative to the data directory.
pub const BASKET_FILE_NAME: &str = "basket.json";

/// Locations of the client state files.
#[derive(Debug, Clone)]
pub struct StateFiles {
    session_path: PathBuf,
    basket_path: PathBuf,
}

impl StateFiles {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            session_path: data_dir.join(SESSION_FILE_NAME),
            basket_path: data_dir.join(BASKET_FILE_NAME),
        }
    }

    pub fn load_session(&self) -> StoreResult<SessionContext> {
        load_or_default(&self.session_path)
    }

    pub fn save_session(&self, session: &SessionContext) -> StoreResult<()> {
        save(&self.session_path, session)
    }

    pub fn load_basket(&self) -> StoreResult<BasketStore> {
        load_or_default(&self.basket_path)
    }

    pub fn save_basket(&self, basket: &BasketStore) -> StoreResult<()> {
        save(&self.basket_path, basket)
    }
}

fn load_or_default<T>(path: &Path) -> StoreResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| StoreError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

fn save<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::FileWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let contents = serde_json::to_string_pretty(value).map_err(StoreError::Serialization)?;
    std::fs::write(path, contents).map_err(|source| StoreError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
