//! # Page Persistence
//!
//! The engine only knows the registry snapshot shape; where it lives is up to
//! the store. Loading never blocks initialization: any failure falls back to
//! a registry with one empty default page.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::EngineError;
use crate::pages::{PageRegistry, RegistrySnapshot};

pub trait PageStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<RegistrySnapshot>, EngineError>;

    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), EngineError>;
}

impl PageRegistry {
    /// Load from `store`, falling back to the default registry on failure
    pub fn load_or_default(store: &dyn PageStore) -> Self {
        match store.load() {
            Ok(Some(snapshot)) => PageRegistry::from_snapshot(snapshot),
            Ok(None) => PageRegistry::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load pages, starting with an empty default page");
                PageRegistry::new()
            }
        }
    }
}

/// Snapshot stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageStore for JsonFileStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, EngineError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), EngineError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory store (tests, scratch sessions)
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<RegistrySnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }
}

impl PageStore for MemoryStore {
    fn load(&self) -> Result<Option<RegistrySnapshot>, EngineError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|e| EngineError::Store(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), EngineError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| EngineError::Store(e.to_string()))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageId;
    use canvas_protocol::Element;

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("pages.json"));
        assert!(store.load().unwrap().is_none());

        let mut registry = PageRegistry::new();
        let about = registry.create_page("About");
        registry.switch_page(&about);
        registry
            .current_mut()
            .set_elements(vec![Element::new("hero", "section")]);

        store.save(&registry.snapshot()).unwrap();

        let restored = PageRegistry::load_or_default(&store);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.current_id(), &about);
        assert_eq!(restored.current().elements[0].tag, "section");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let registry = PageRegistry::load_or_default(&JsonFileStore::new(path));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.current_id(), &PageId::default_page());
    }

    struct FailingStore;

    impl PageStore for FailingStore {
        fn load(&self) -> Result<Option<RegistrySnapshot>, EngineError> {
            Err(EngineError::Store("backend offline".to_string()))
        }

        fn save(&self, _: &RegistrySnapshot) -> Result<(), EngineError> {
            Err(EngineError::Store("backend offline".to_string()))
        }
    }

    #[test]
    fn test_failing_store_falls_back_to_default() {
        let registry = PageRegistry::load_or_default(&FailingStore);
        assert_eq!(registry.len(), 1);
        assert!(registry.current().elements.is_empty());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&PageRegistry::new().snapshot()).unwrap();
        assert!(store.load().unwrap().is_some());
    }
}
