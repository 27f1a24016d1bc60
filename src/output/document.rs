//! Catalog document emission
//!
//! Writes the finalized records as one JSON document for the presentation
//! layer. Only components with a resolved package make it into the
//! document; forum mentions that never resolved to a package have nothing
//! to install and nothing stable to key on.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

use crate::catalog::ComponentRecord;
use crate::Result;

/// Maximum description length in the emitted document
const DESCRIPTION_LIMIT: usize = 100;

/// One component entry of the emitted catalog document
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: Option<String>,
    pub author: Option<String>,
    pub social_url: Option<String>,
    pub description: Option<String>,
    pub install: String,
    pub categories: Vec<String>,
    pub image: Option<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub forum_url: Option<String>,
    pub package_index_url: Option<String>,
    pub avatar_url: Option<String>,
    pub stars: u64,
    pub downloads: u64,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct CatalogDocument {
    components: BTreeMap<String, CatalogEntry>,
}

impl CatalogEntry {
    /// Builds an entry from a finalized record; `None` without a package
    pub fn from_record(record: &ComponentRecord) -> Option<Self> {
        let package = record.package_name.as_deref()?;

        let (author, social_url) = attribution(record);
        let description = record
            .repo_description
            .as_deref()
            .or(record.package_description.as_deref())
            .map(|text| shorten(&text.replace('\n', " "), DESCRIPTION_LIMIT));

        Some(Self {
            title: record.display_name.clone(),
            author,
            social_url,
            description,
            install: format!("pip install {}", package),
            categories: record.categories.clone(),
            image: record.preview_image_url.clone(),
            repo_url: record.repo_url.clone(),
            demo_url: record.demo_url.clone(),
            forum_url: record.forum_url.clone(),
            package_index_url: record.package_index_url.clone(),
            avatar_url: record.avatar_url.clone(),
            stars: record.star_count.unwrap_or(0),
            downloads: record.download_count.unwrap_or(0),
            created_at: record.created_at.map(|t| t.to_rfc3339()),
        })
    }
}

/// Attribution prefers the repository owner over the package author
fn attribution(record: &ComponentRecord) -> (Option<String>, Option<String>) {
    if let (Some(owner), Some(repo_url)) = (&record.repo_owner, &record.repo_url) {
        let social = origin(repo_url).map(|origin| format!("{}/{}", origin, owner));
        return (Some(owner.clone()), social);
    }
    if let (Some(author), Some(index_url)) = (&record.package_author, &record.package_index_url) {
        let social = origin(index_url).map(|origin| format!("{}/user/{}/", origin, author));
        return (Some(author.clone()), social);
    }
    (None, None)
}

fn origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.origin() {
        url::Origin::Tuple(..) => Some(parsed.origin().ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

/// Truncates text on a word boundary, keeping sentence ends tidy
pub fn shorten(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut short: String = text.chars().take(limit).collect();

    // Cut the last word if the truncation landed mid-word.
    let next_char = text.chars().nth(limit);
    if !short.ends_with(' ') && next_char != Some(' ') {
        if let Some(pos) = short.rfind(' ') {
            short.truncate(pos);
        }
    }

    let short = short.trim_end();
    match short.chars().last() {
        Some('.') | Some('!') | Some('?') => short.to_string(),
        Some(',') | Some(';') | Some(':') | Some('-') => {
            let mut s: String = short.chars().take(short.chars().count() - 1).collect();
            s.push_str("...");
            s
        }
        _ => format!("{}...", short),
    }
}

/// Writes the catalog document, keyed by package name
pub fn write_catalog(records: &[ComponentRecord], path: &Path) -> Result<()> {
    let components: BTreeMap<String, CatalogEntry> = records
        .iter()
        .filter_map(|record| {
            let entry = CatalogEntry::from_record(record)?;
            Some((record.package_name.clone()?, entry))
        })
        .collect();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let document = CatalogDocument { components };
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json)?;
    Ok(())
}
