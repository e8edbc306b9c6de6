//! Application configuration.
//!
//! Layered `config.json` loading: defaults, then the user file under
//! `~/.glossa/`, then the project file under `<working dir>/.glossa/`.
//! Later layers win per key.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

const CONFIG_FILE: &str = "config.json";

pub struct AppConfig {
    values: Map<String, Value>,
    project_dir: PathBuf,
}

impl AppConfig {
    fn defaults() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("debug".to_string(), Value::Bool(false));
        map
    }

    /// Load configuration for a project working directory, layering the
    /// user config under `user_dir` beneath the project's `.glossa/`.
    pub fn load(user_dir: &Path, working_dir: &Path) -> Self {
        let project_dir = working_dir.join(".glossa");

        let mut values = Self::defaults();
        for layer in [
            read_config(&user_dir.join(CONFIG_FILE)),
            read_config(&project_dir.join(CONFIG_FILE)),
        ] {
            for (key, value) in layer {
                values.insert(key, value);
            }
        }

        Self {
            values,
            project_dir,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn debug(&self) -> bool {
        self.values
            .get("debug")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Persist a key into the project-level config file.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value.clone());

        std::fs::create_dir_all(&self.project_dir)
            .map_err(|e| CoreError::Configuration(format!("cannot create config dir: {e}")))?;

        let path = self.project_dir.join(CONFIG_FILE);
        let mut on_disk = read_config(&path);
        on_disk.insert(key.to_string(), value);

        let raw = serde_json::to_string_pretty(&Value::Object(on_disk))
            .map_err(|e| CoreError::Configuration(format!("cannot serialize config: {e}")))?;
        std::fs::write(&path, raw)
            .map_err(|e| CoreError::Configuration(format!("cannot write config: {e}")))
    }
}

fn read_config(path: &Path) -> Map<String, Value> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_layer_overrides_user_layer() {
        let user = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();

        std::fs::write(
            user.path().join(CONFIG_FILE),
            r#"{"debug": true, "theme": "dark"}"#,
        )
        .unwrap();
        std::fs::create_dir_all(project.path().join(".glossa")).unwrap();
        std::fs::write(
            project.path().join(".glossa").join(CONFIG_FILE),
            r#"{"debug": false}"#,
        )
        .unwrap();

        let config = AppConfig::load(user.path(), project.path());
        assert!(!config.debug());
        assert_eq!(config.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn set_persists_into_the_project_file() {
        let user = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();

        let mut config = AppConfig::load(user.path(), project.path());
        config.set("debug", json!(true)).unwrap();

        let reloaded = AppConfig::load(user.path(), project.path());
        assert!(reloaded.debug());
    }

    #[test]
    fn malformed_files_fall_back_to_defaults() {
        let user = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        std::fs::write(user.path().join(CONFIG_FILE), "not json").unwrap();

        let config = AppConfig::load(user.path(), project.path());
        assert!(!config.debug());
    }
}
