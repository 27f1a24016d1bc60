//! Package index extractors
//!
//! Two parsers: the flat index listing (one anchor per package name) and the
//! per-package detail page (sidebar byline, repository links, description).

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Placeholder text the index shows for packages without a description
const NO_DESCRIPTION_SENTINEL: &str = "No project description provided";

/// Extracted fields of a package detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPage {
    /// Sidebar byline author
    pub author: Option<String>,

    /// Repository link, from the homepage icon-link or the sidebar tabs
    pub repo_url: Option<String>,

    /// Summary element, or the first non-empty long-form paragraph
    pub description: Option<String>,
}

/// Filters the index listing down to component package names
///
/// Keeps anchor texts that follow the platform's plugin-naming convention
/// (contain `streamlit`, or start with the `st-`/`st_` prefix) and are not
/// on the exclusion list.
pub fn parse_index(html: &str, exclude: &HashSet<String>) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchor_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&anchor_selector)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|name| {
            name.contains("streamlit") || name.starts_with("st-") || name.starts_with("st_")
        })
        .filter(|name| !exclude.contains(name))
        .collect()
}

/// Parses a package detail page
///
/// `repo_host` is the repository host prefix used to decide whether the
/// homepage icon-link or a sidebar tab link points at a repository.
pub fn parse_project_page(html: &str, repo_host: &str) -> ProjectPage {
    let document = Html::parse_document(html);

    ProjectPage {
        author: extract_author(&document),
        repo_url: extract_repo_url(&document, repo_host),
        description: extract_description(&document),
    }
}

fn extract_author(document: &Html) -> Option<String> {
    let selector = Selector::parse("span.sidebar-section__user-gravatar-text").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_repo_url(document: &Html, repo_host: &str) -> Option<String> {
    // Preferred: the "homepage" icon-link, when it points at the repo host.
    if let Ok(home_selector) = Selector::parse("i.fas.fa-home") {
        if let Some(icon) = document.select(&home_selector).next() {
            if let Some(href) = icon
                .parent()
                .and_then(ElementRef::wrap)
                .and_then(|a| a.value().attr("href"))
            {
                if href.starts_with(repo_host) {
                    return Some(href.to_string());
                }
            }
        }
    }

    // Fallback: the first sidebar tab link that points at the repo host.
    let tab_selector = Selector::parse("a.vertical-tabs__tab--with-icon").ok()?;
    document
        .select(&tab_selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with(repo_host))
        .map(str::to_string)
}

fn extract_description(document: &Html) -> Option<String> {
    if let Ok(summary_selector) = Selector::parse("p.package-description__summary") {
        if let Some(summary) = document.select(&summary_selector).next() {
            let text = summary.text().collect::<String>().trim().to_string();
            if !text.is_empty() && text != NO_DESCRIPTION_SENTINEL {
                return Some(text);
            }
        }
    }

    // Fall back to the first non-empty paragraph of the long description.
    let container_selector = Selector::parse("div.project-description").ok()?;
    let paragraph_selector = Selector::parse("p").ok()?;
    let container = document.select(&container_selector).next()?;
    container
        .select(&paragraph_selector)
        .map(|p| p.text().collect::<String>().replace('\n', "").trim().to_string())
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO_HOST: &str = "https://github.com";

    #[test]
    fn test_index_keeps_convention_names() {
        let html = r#"<html><body>
            <a>streamlit-aggrid</a>
            <a>st-card</a>
            <a>st_draw</a>
            <a>requests</a>
            <a>best-package</a>
        </body></html>"#;
        let names = parse_index(html, &HashSet::new());
        assert_eq!(names, vec!["streamlit-aggrid", "st-card", "st_draw"]);
    }

    #[test]
    fn test_index_applies_exclusion_list() {
        let html = r#"<a>st-card</a><a>st-spam</a>"#;
        let exclude: HashSet<String> = ["st-spam".to_string()].into();
        let names = parse_index(html, &exclude);
        assert_eq!(names, vec!["st-card"]);
    }

    #[test]
    fn test_author_from_sidebar_byline() {
        let html = r#"<div class="sidebar-section">
            <span class="sidebar-section__user-gravatar-text"> Jane Doe </span>
        </div>"#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_repo_from_homepage_icon_link() {
        let html = r#"
            <a href="https://github.com/jane/st-card"><i class="fas fa-home"></i>Homepage</a>
            <a class="vertical-tabs__tab--with-icon" href="https://github.com/other/repo">Source</a>
        "#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.repo_url.as_deref(), Some("https://github.com/jane/st-card"));
    }

    #[test]
    fn test_homepage_off_host_falls_back_to_tabs() {
        let html = r#"
            <a href="https://janedoe.dev"><i class="fas fa-home"></i>Homepage</a>
            <a class="vertical-tabs__tab--with-icon" href="https://janedoe.dev/blog">Blog</a>
            <a class="vertical-tabs__tab--with-icon" href="https://github.com/jane/st-card">Source</a>
        "#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.repo_url.as_deref(), Some("https://github.com/jane/st-card"));
    }

    #[test]
    fn test_no_repo_link_anywhere() {
        let html = r#"<a class="vertical-tabs__tab--with-icon" href="https://janedoe.dev">Site</a>"#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.repo_url, None);
    }

    #[test]
    fn test_summary_description() {
        let html = r#"<p class="package-description__summary">A card component.</p>"#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.description.as_deref(), Some("A card component."));
    }

    #[test]
    fn test_placeholder_summary_ignored() {
        let html = r#"
            <p class="package-description__summary">No project description provided</p>
            <div class="project-description"><p></p><p>  Real text here.  </p></div>
        "#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.description.as_deref(), Some("Real text here."));
    }

    #[test]
    fn test_no_description_at_all() {
        let html = r#"<div class="project-description"><p>  </p></div>"#;
        let page = parse_project_page(html, REPO_HOST);
        assert_eq!(page.description, None);
    }
}
