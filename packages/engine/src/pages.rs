//! # Page Registry
//!
//! Maps page ids to independent element trees and tracks the current page.
//! A default page always exists and cannot be deleted.

use canvas_protocol::{Element, IdGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tree;

pub const DEFAULT_PAGE_ID: &str = "default";
pub const DEFAULT_PAGE_NAME: &str = "Home";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn default_page() -> Self {
        Self(DEFAULT_PAGE_ID.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PAGE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(id: PageId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            elements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Commit a new root sequence and bump `updated_at`
    pub fn set_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.updated_at = Utc::now();
    }
}

/// Serializable shape handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub pages: Vec<Page>,
    pub current_page_id: PageId,
}

#[derive(Debug, Clone)]
pub struct PageRegistry {
    pages: Vec<Page>,
    current: PageId,
    ids: IdGenerator,
}

impl PageRegistry {
    /// Registry with only the default empty page
    pub fn new() -> Self {
        Self {
            pages: vec![Page::new(PageId::default_page(), DEFAULT_PAGE_NAME)],
            current: PageId::default_page(),
            ids: IdGenerator::new("pages"),
        }
    }

    /// Rebuild from a saved snapshot.
    ///
    /// Repairs what a hand-edited or partial snapshot might lack: a missing
    /// default page is recreated, an unknown current id falls back to the
    /// default page, and parent back-references are recomputed.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut pages: Vec<Page> = Vec::with_capacity(snapshot.pages.len() + 1);
        for mut page in snapshot.pages {
            if pages.iter().any(|p| p.id == page.id) {
                tracing::warn!(page_id = %page.id, "Dropping duplicate page in snapshot");
                continue;
            }
            page.elements = tree::recompute_parents(&page.elements);
            pages.push(page);
        }

        if !pages.iter().any(|p| p.id.is_default()) {
            pages.insert(0, Page::new(PageId::default_page(), DEFAULT_PAGE_NAME));
        }

        let current = if pages.iter().any(|p| p.id == snapshot.current_page_id) {
            snapshot.current_page_id
        } else {
            PageId::default_page()
        };

        Self {
            pages,
            current,
            ids: IdGenerator::new("pages"),
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            pages: self.pages.clone(),
            current_page_id: self.current.clone(),
        }
    }

    pub fn create_page(&mut self, name: impl Into<String>) -> PageId {
        let id = PageId::new(format!("page-{}", self.ids.next_id()));
        self.pages.push(Page::new(id.clone(), name));
        id
    }

    /// Delete a page. The default page is protected; deleting the current
    /// page switches to the default page. Returns true when a page was removed.
    pub fn delete_page(&mut self, id: &PageId) -> bool {
        if id.is_default() {
            return false;
        }
        let Some(pos) = self.pages.iter().position(|p| &p.id == id) else {
            return false;
        };

        self.pages.remove(pos);
        if &self.current == id {
            self.current = PageId::default_page();
        }
        true
    }

    pub fn rename_page(&mut self, id: &PageId, name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(page) => {
                page.name = name.into();
                page.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn switch_page(&mut self, id: &PageId) -> bool {
        if self.get(id).is_some() {
            self.current = id.clone();
            true
        } else {
            false
        }
    }

    pub fn current_id(&self) -> &PageId {
        &self.current
    }

    pub fn current(&self) -> &Page {
        // `current` always names an existing page
        self.get(&self.current)
            .unwrap_or_else(|| &self.pages[0])
    }

    pub fn current_mut(&mut self) -> &mut Page {
        let pos = self
            .pages
            .iter()
            .position(|p| p.id == self.current)
            .unwrap_or(0);
        &mut self.pages[pos]
    }

    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| &p.id == id)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
