//! Curated data: manual overrides and the exclusion list
//!
//! Categories cannot be derived from the scraped sources, so a manually
//! maintained overrides table supplies them, plus the occasional title
//! correction. A separate exclusion list drops known-irrelevant package
//! names from the index crawl and from the final output.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::catalog::ComponentRecord;
use crate::config::CuratedConfig;
use crate::ConfigError;

/// Override entry for one package
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CuratedEntry {
    /// Category tags assigned to the component
    pub categories: Vec<String>,

    /// Replacement title; `None` keeps the derived display name
    pub title: Option<String>,
}

/// All curated data, loaded once per run
#[derive(Debug, Clone, Default)]
pub struct CuratedData {
    pub overrides: HashMap<String, CuratedEntry>,
    pub exclude: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct ExcludeFile {
    #[serde(default)]
    exclude: Vec<String>,
}

/// Loads the overrides table and the exclusion list from their TOML files
pub fn load_curated(config: &CuratedConfig) -> Result<CuratedData, ConfigError> {
    let overrides_raw = std::fs::read_to_string(Path::new(&config.overrides_path))?;
    let overrides: HashMap<String, CuratedEntry> = toml::from_str(&overrides_raw)?;

    let exclude_raw = std::fs::read_to_string(Path::new(&config.exclude_path))?;
    let exclude_file: ExcludeFile = toml::from_str(&exclude_raw)?;

    Ok(CuratedData {
        overrides,
        exclude: exclude_file.exclude.into_iter().collect(),
    })
}

/// Applies the curated override for a record, when one exists
///
/// Assigns categories and replaces the display name if the override carries
/// a title. Records without an override keep their empty category set.
pub fn apply_override(record: &mut ComponentRecord, curated: &CuratedData) {
    let Some(package) = &record.package_name else {
        return;
    };
    let Some(entry) = curated.overrides.get(package) else {
        return;
    };

    record.categories = entry.categories.clone();
    if let Some(title) = &entry.title {
        record.display_name = Some(title.clone());
    }
}
