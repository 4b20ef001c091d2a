//! Guest identity persistence
//!
//! Identities are keyed by session id so a device can sit at a new table
//! without inheriting the previous table's guest. A corrupt or missing
//! file reads as empty; identity loss is recoverable by rejoining.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::models::StoredIdentity;

use crate::error::ClientResult;

const IDENTITY_FILE: &str = "guest_identity.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct IdentityFile {
    #[serde(default)]
    sessions: HashMap<String, StoredIdentity>,
}

/// File-backed store of per-session guest identities
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(IDENTITY_FILE),
        }
    }

    /// Identity previously stored for this session, if any
    pub fn load(&self, session_id: &str) -> Option<StoredIdentity> {
        self.read_file().sessions.remove(session_id)
    }

    /// Persist an identity for this session
    pub fn store(&self, session_id: &str, identity: StoredIdentity) -> ClientResult<()> {
        let mut file = self.read_file();
        file.sessions.insert(session_id.to_string(), identity);
        self.write_file(&file)
    }

    /// Forget the identity stored for this session
    pub fn clear(&self, session_id: &str) -> ClientResult<()> {
        let mut file = self.read_file();
        if file.sessions.remove(session_id).is_none() {
            return Ok(());
        }
        self.write_file(&file)
    }

    fn read_file(&self) -> IdentityFile {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return IdentityFile::default();
        };
        match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Corrupt identity file, starting empty: {e}");
                IdentityFile::default()
            }
        }
    }

    fn write_file(&self, file: &IdentityFile) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
