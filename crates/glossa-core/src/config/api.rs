//! API credential configuration.
//!
//! Ordered provider entries persisted as JSON under the user's config
//! directory. The entry order is the gateway's fallback order. Entries are
//! validated when set - a missing model id or key never reaches the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::providers::{ModelConfig, ProviderId};
use crate::error::{CoreError, Result};

const CREDENTIALS_FILE: &str = "credentials.json";

/// Directory holding Glossa's user-level configuration.
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".glossa"))
        .ok_or_else(|| CoreError::Configuration("cannot determine home directory".to_string()))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    entries: Vec<ModelConfig>,
}

pub struct ApiConfig {
    path: PathBuf,
    entries: Vec<ModelConfig>,
}

impl ApiConfig {
    /// Load from the default location, creating an empty config if the file
    /// does not exist yet.
    pub fn load_default() -> Result<Self> {
        Ok(Self::load_from(&config_dir()?.join(CREDENTIALS_FILE)))
    }

    pub fn load_from(path: &Path) -> Self {
        let entries = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<CredentialsFile>(&raw).ok())
            .map(|file| file.entries)
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// The active model configurations, in fallback order.
    pub fn entries(&self) -> &[ModelConfig] {
        &self.entries
    }

    pub fn is_configured(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Providers without a configured entry, with their suggested models.
    pub fn not_configured(&self) -> Vec<(ProviderId, &'static [&'static str])> {
        ProviderId::all()
            .iter()
            .filter(|p| !self.entries.iter().any(|e| e.provider == **p))
            .map(|p| (*p, p.suggested_models()))
            .collect()
    }

    /// Add or replace the entry for a provider and persist the file.
    /// Validation fails fast before anything is written.
    pub fn set_entry(&mut self, config: ModelConfig) -> Result<()> {
        config.validate()?;

        match self
            .entries
            .iter_mut()
            .find(|e| e.provider == config.provider)
        {
            Some(existing) => *existing = config,
            None => self.entries.push(config),
        }

        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Configuration(format!("cannot create config dir: {e}")))?;
        }

        let file = CredentialsFile {
            entries: self.entries.clone(),
        };
        let raw = serde_json::to_string_pretty(&file)
            .map_err(|e| CoreError::Configuration(format!("cannot serialize credentials: {e}")))?;

        std::fs::write(&self.path, raw)
            .map_err(|e| CoreError::Configuration(format!("cannot write credentials: {e}")))
    }
}
