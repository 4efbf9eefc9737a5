use crate::domain::model::LastSeenState;
use crate::domain::ports::StateStore;
use crate::utils::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_PATH: &str = "state/last_seen.json";

/// Last-seen tags kept as a flat JSON object on local disk.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<LastSeenState> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting fresh", self.path.display());
                return Ok(LastSeenState::new());
            }
            Err(e) => return Err(e.into()),
        };

        // unparseable state is treated as empty
        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unreadable state file {}: {}", self.path.display(), e);
                return Ok(LastSeenState::new());
            }
        };

        let Some(object) = value.as_object() else {
            tracing::warn!("State file {} is not a JSON object, ignoring", self.path.display());
            return Ok(LastSeenState::new());
        };

        Ok(object
            .iter()
            .map(|(key, value)| {
                let tag = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), tag)
            })
            .collect())
    }

    async fn save(&self, state: &LastSeenState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("nope.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_directories_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("state").join("last_seen.json"));

        let mut state = LastSeenState::new();
        state.insert("spring-projects/spring-boot".to_string(), "v3.2.0".to_string());
        store.save(&state).await.unwrap();

        assert_eq!(store.load().await.unwrap(), state);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  \"spring-projects/spring-boot\": \"v3.2.0\""));
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_seen.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonStateStore::new(&path).load().await.unwrap().is_empty());

        std::fs::write(&path, "[\"v1\"]").unwrap();
        assert!(JsonStateStore::new(&path).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_string_values_are_stringified() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_seen.json");
        std::fs::write(&path, r#"{"acme/tool": 3}"#).unwrap();

        let state = JsonStateStore::new(&path).load().await.unwrap();
        assert_eq!(state.get("acme/tool").map(String::as_str), Some("3"));
    }
}
