//! Key-value media behind the local backend
//!
//! A medium stores whole strings under names, the way browser local storage
//! does. [`MemoryMedium`] lives as long as the process; [`FileMedium`] keeps one
//! file per item in a directory so payloads survive restarts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use baton_core::{BatonError, KeyValueMedium, Result};
use parking_lot::RwLock;

/// In-memory medium; clones share the same items
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryMedium {
    /// Create an empty medium
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial items
    pub fn with_items(items: HashMap<String, String>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every item
    pub fn items(&self) -> HashMap<String, String> {
        self.items.read().clone()
    }
}

impl KeyValueMedium for MemoryMedium {
    fn get_item(&self, name: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(name).cloned())
    }

    fn set_item(&self, name: &str, value: &str) -> Result<()> {
        self.items
            .write()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed medium, one `<name>.json` file per item
#[derive(Debug, Clone)]
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    /// Use `root` as the item directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            BatonError::storage(format!("Failed to create {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    /// Item directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, name: &str) -> PathBuf {
        let file_name: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

impl KeyValueMedium for FileMedium {
    fn get_item(&self, name: &str) -> Result<Option<String>> {
        let path = self.item_path(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BatonError::storage(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set_item(&self, name: &str, value: &str) -> Result<()> {
        let path = self.item_path(name);
        // Write then rename so readers never see a torn item.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| {
                BatonError::storage(format!("Failed to write {}: {e}", path.display()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_medium_clones_share_items() {
        let medium = MemoryMedium::new();
        let clone = medium.clone();
        medium.set_item("slot", "v1").unwrap();
        assert_eq!(clone.get_item("slot").unwrap().as_deref(), Some("v1"));
        assert_eq!(clone.len(), 1);
        assert!(medium.get_item("missing").unwrap().is_none());
    }

    #[test]
    fn file_medium_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileMedium::open(dir.path())
            .unwrap()
            .set_item("routeDataMap", "{\"a-b\":1}")
            .unwrap();

        let reopened = FileMedium::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get_item("routeDataMap").unwrap().as_deref(),
            Some("{\"a-b\":1}")
        );
        assert!(reopened.get_item("other").unwrap().is_none());
    }

    #[test]
    fn file_medium_sanitizes_item_names() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path()).unwrap();
        medium.set_item("../escape/me", "x").unwrap();
        assert!(dir.path().join(".._escape_me.json").exists());
        assert_eq!(medium.get_item("../escape/me").unwrap().as_deref(), Some("x"));
    }
}
