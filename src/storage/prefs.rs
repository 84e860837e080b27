//! Client Preference Storage
//!
//! The only state persisted client-side: the last analysis session id (for
//! restore-on-launch) and the LLM provider preference. Persistence goes
//! through the [`PrefsStore`] trait so the session service never touches
//! ambient storage directly; tests inject the in-memory implementation.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::models::request::LlmProvider;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_dir, ensure_leaselens_dir, prefs_path};

/// Persisted client preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientPrefs {
    /// Session to offer restoring on next launch
    #[serde(default)]
    pub last_session_id: Option<String>,
    /// Preferred generator for analysis and chat
    #[serde(default)]
    pub llm_provider: LlmProvider,
}

/// Persistence seam for client preferences.
pub trait PrefsStore: Send + Sync {
    /// Load preferences; a missing backing file yields defaults.
    fn load(&self) -> AppResult<ClientPrefs>;
    /// Persist preferences.
    fn save(&self, prefs: &ClientPrefs) -> AppResult<()>;
}

/// File-backed store at ~/.leaselens/prefs.json.
#[derive(Debug)]
pub struct JsonPrefsStore {
    path: PathBuf,
}

impl JsonPrefsStore {
    /// Create a store at the default location, creating ~/.leaselens/ if
    /// needed.
    pub fn new() -> AppResult<Self> {
        ensure_leaselens_dir()?;
        Ok(Self { path: prefs_path()? })
    }

    /// Create a store at an explicit path (tests, portable installs).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PrefsStore for JsonPrefsStore {
    fn load(&self) -> AppResult<ClientPrefs> {
        if !self.path.exists() {
            return Ok(ClientPrefs::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let prefs: ClientPrefs = serde_json::from_str(&content)?;
        Ok(prefs)
    }

    fn save(&self, prefs: &ClientPrefs) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(&parent.to_path_buf())?;
        }
        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral embedders.
#[derive(Debug, Default)]
pub struct MemoryPrefsStore {
    prefs: Mutex<ClientPrefs>,
}

impl MemoryPrefsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load(&self) -> AppResult<ClientPrefs> {
        let prefs = self
            .prefs
            .lock()
            .map_err(|_| AppError::internal("prefs lock poisoned"))?;
        Ok(prefs.clone())
    }

    fn save(&self, prefs: &ClientPrefs) -> AppResult<()> {
        let mut held = self
            .prefs
            .lock()
            .map_err(|_| AppError::internal("prefs lock poisoned"))?;
        *held = prefs.clone();
        Ok(())
    }
}
