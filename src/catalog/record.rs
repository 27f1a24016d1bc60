//! Component records and identity resolution
//!
//! One [`ComponentRecord`] exists per distinct component. Records are keyed
//! by their identity (package name when known, raw display name otherwise)
//! and merged field-by-field with first-writer-wins: a field set by an
//! earlier source is never overwritten by a later one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::RecordStage;

/// The central entity: one record per distinct component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Resolution key; immutable once assigned
    pub identity: String,

    /// Human-readable title, normalized late in the pipeline
    pub display_name: Option<String>,

    /// Package-index identifier
    pub package_name: Option<String>,

    pub repo_url: Option<String>,
    pub package_index_url: Option<String>,
    pub demo_url: Option<String>,
    pub forum_url: Option<String>,

    pub repo_owner: Option<String>,
    pub package_author: Option<String>,

    pub star_count: Option<u64>,
    pub download_count: Option<u64>,

    pub repo_description: Option<String>,
    pub package_description: Option<String>,

    pub preview_image_url: Option<String>,
    pub avatar_url: Option<String>,

    /// Sourced only from the repository host
    pub created_at: Option<DateTime<Utc>>,

    /// Empty until the curated-override step
    #[serde(default)]
    pub categories: Vec<String>,

    /// Derived; recomputed once all fields are final
    pub search_index: Option<String>,

    #[serde(default)]
    pub stage: RecordStage,
}

/// Partial record produced by an extractor, merged into an existing record
/// with first-writer-wins semantics
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub display_name: Option<String>,
    pub package_name: Option<String>,
    pub repo_url: Option<String>,
    pub package_index_url: Option<String>,
    pub demo_url: Option<String>,
    pub forum_url: Option<String>,
    pub repo_owner: Option<String>,
    pub package_author: Option<String>,
    pub star_count: Option<u64>,
    pub download_count: Option<u64>,
    pub repo_description: Option<String>,
    pub package_description: Option<String>,
    pub preview_image_url: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

impl ComponentRecord {
    /// Creates a fresh record for a newly observed identity
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: None,
            package_name: None,
            repo_url: None,
            package_index_url: None,
            demo_url: None,
            forum_url: None,
            repo_owner: None,
            package_author: None,
            star_count: None,
            download_count: None,
            repo_description: None,
            package_description: None,
            preview_image_url: None,
            avatar_url: None,
            created_at: None,
            categories: Vec::new(),
            search_index: None,
            stage: RecordStage::Discovered,
        }
    }

    /// Merges a partial record into this one
    ///
    /// Every field follows first-writer-wins: only `None` fields take the
    /// incoming value. The identity itself is never touched.
    pub fn absorb(&mut self, patch: RecordPatch) {
        fill(&mut self.display_name, patch.display_name);
        fill(&mut self.package_name, patch.package_name);
        fill(&mut self.repo_url, patch.repo_url);
        fill(&mut self.package_index_url, patch.package_index_url);
        fill(&mut self.demo_url, patch.demo_url);
        fill(&mut self.forum_url, patch.forum_url);
        fill(&mut self.repo_owner, patch.repo_owner);
        fill(&mut self.package_author, patch.package_author);
        fill(&mut self.star_count, patch.star_count);
        fill(&mut self.download_count, patch.download_count);
        fill(&mut self.repo_description, patch.repo_description);
        fill(&mut self.package_description, patch.package_description);
        fill(&mut self.preview_image_url, patch.preview_image_url);
        fill(&mut self.avatar_url, patch.avatar_url);
        fill(&mut self.created_at, patch.created_at);
    }

    /// Recomputes the derived search text from the final field values
    ///
    /// Lowercased concatenation of name, descriptions, authors and package
    /// name; `None` fields contribute nothing. The presentation layer runs
    /// case-insensitive substring search against this.
    pub fn rebuild_search_index(&mut self) {
        let parts = [
            self.display_name.as_deref(),
            self.repo_description.as_deref(),
            self.package_description.as_deref(),
            self.repo_owner.as_deref(),
            self.package_author.as_deref(),
            self.package_name.as_deref(),
        ];
        let text = parts
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        self.search_index = Some(text);
    }
}

/// The in-memory record mapping: exactly one record per identity,
/// insertion-ordered so output is stable across runs
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<ComponentRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `identity`, creating it on first observation
    pub fn upsert(&mut self, identity: &str) -> &mut ComponentRecord {
        if let Some(&pos) = self.index.get(identity) {
            return &mut self.records[pos];
        }
        let pos = self.records.len();
        self.records.push(ComponentRecord::new(identity));
        self.index.insert(identity.to_string(), pos);
        &mut self.records[pos]
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&ComponentRecord> {
        self.index.get(identity).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, identity: &str) -> Option<&mut ComponentRecord> {
        self.index
            .get(identity)
            .map(|&pos| &mut self.records[pos])
    }

    pub fn records(&self) -> &[ComponentRecord] {
        &self.records
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentRecord> {
        self.records.iter_mut()
    }

    pub fn into_records(self) -> Vec<ComponentRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
