//! Role-template cache persisted as a pretty-printed JSON array
//!
//! ```json
//! [
//!   { "player_count": 5, "existing_roles": ["Seer", "Villager", "Werewolf"],
//!     "roles": ["Werewolf", "Seer", "Villager", "Villager", "Villager"] }
//! ]
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use werewolf_application::{RoleTemplateStore, StoreError};
use werewolf_domain::RoleTemplateRecord;

pub struct JsonFileTemplateStore {
    path: PathBuf,
}

impl JsonFileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoleTemplateStore for JsonFileTemplateStore {
    fn load(&self) -> Result<Vec<RoleTemplateRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| StoreError::Format(e.to_string()))?;

        let total = entries.len();
        let records: Vec<RoleTemplateRecord> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        if records.len() < total {
            warn!(
                "Skipped {} malformed entries in {}",
                total - records.len(),
                self.path.display()
            );
        }
        debug!("Loaded {} role templates from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn save(&self, records: &[RoleTemplateRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(records).map_err(|e| StoreError::Format(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use werewolf_domain::{Role, RoleTemplateKey};

    fn record(count: usize) -> RoleTemplateRecord {
        let key = RoleTemplateKey::new(count, &[Role::Werewolf, Role::Villager]);
        let mut roles = vec![Role::Werewolf];
        roles.resize(count, Role::Villager);
        RoleTemplateRecord::new(&key, &roles)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileTemplateStore::new(dir.path().join("ai_cache.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileTemplateStore::new(dir.path().join("nested/ai_cache.json"));
        let records = vec![record(4), record(3)];

        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai_cache.json");
        std::fs::write(
            &path,
            r#"[
                {"player_count": 3, "existing_roles": ["Villager"], "roles": ["Werewolf", "Villager", "Villager"]},
                {"player_count": 4},
                "garbage"
            ]"#,
        )
        .unwrap();

        let loaded = JsonFileTemplateStore::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].player_count, 3);
    }

    #[test]
    fn test_unparseable_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai_cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileTemplateStore::new(&path).load(),
            Err(StoreError::Format(_))
        ));
    }
}
