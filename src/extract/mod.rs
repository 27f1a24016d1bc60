//! Per-source extractors
//!
//! Each extractor turns raw markup or JSON from one source into partial
//! records made of plain data, so every parser can be unit-tested against
//! fixtures without touching the network:
//! - `forum`: the tracker thread listing
//! - `pypi`: the package index listing and per-package detail pages
//! - `github`: repository metadata and readme renderings

mod forum;
mod github;
mod pypi;

pub use forum::{parse_tracker, ForumEntry};
pub use github::{
    parse_readme, parse_repo_metadata, repo_slug_from_url, ReadmeContent, RepoMetadata, RepoOwner,
};
pub use pypi::{parse_index, parse_project_page, ProjectPage};

use crate::config::SourcesConfig;

/// Anchor classification for the tracker listing and readme pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Repository,
    Demo,
    ForumPost,
    PackageIndex,
    Other,
}

/// Classifies anchor targets by the configured source hosts
///
/// Built from the sources config so tests can classify against mock-server
/// URLs. Demo patterns containing `://` are matched as prefixes, bare
/// patterns as substrings.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    repo_prefix: String,
    forum_prefix: String,
    pypi_prefix: String,
    demo_patterns: Vec<String>,
}

impl LinkClassifier {
    pub fn from_sources(sources: &SourcesConfig) -> Self {
        Self {
            repo_prefix: sources.github_url.clone(),
            forum_prefix: sources.forum_url.clone(),
            pypi_prefix: sources.pypi_url.clone(),
            demo_patterns: sources.demo_hosts.clone(),
        }
    }

    /// Classifies one anchor target
    ///
    /// Checked in a fixed order: repository, demo, package index, forum.
    pub fn classify(&self, href: &str) -> LinkKind {
        if href.starts_with(&self.repo_prefix) {
            LinkKind::Repository
        } else if self.is_demo(href) {
            LinkKind::Demo
        } else if href.starts_with(&self.pypi_prefix) {
            LinkKind::PackageIndex
        } else if href.starts_with(&self.forum_prefix) {
            LinkKind::ForumPost
        } else {
            LinkKind::Other
        }
    }

    /// Returns true if the target matches the hosted-demo URL convention
    pub fn is_demo(&self, href: &str) -> bool {
        self.demo_patterns.iter().any(|pattern| {
            if pattern.contains("://") {
                href.starts_with(pattern)
            } else {
                href.contains(pattern)
            }
        })
    }

    /// Derives the package name from a package-index project URL
    /// (`<pypi>/project/<name>/`)
    pub fn package_from_index_url(&self, href: &str) -> Option<String> {
        let rest = href.strip_prefix(&self.pypi_prefix)?;
        let mut segments = rest.trim_start_matches('/').split('/');
        if segments.next()? != "project" {
            return None;
        }
        let name = segments.next()?;
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}
