//! Repository host extractors
//!
//! Metadata comes from the API as JSON; the preview image, fallback
//! description and demo link come from the rendered readme page.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::extract::LinkClassifier;
use crate::Result;

/// Substrings marking readme images as badges, logos or vendor marks,
/// never usable as a preview image. Checked against both `src` and
/// `data-canonical-src`.
const BADGE_MARKERS: &[&str] = &[
    "badge",
    "shields.io",
    "circleci",
    "buymeacoffee",
    "ko-fi",
    "logo",
    "streamlit-mark",
    "coverage",
    "Cover",
    "hydra.png",
    "emojipedia",
];

/// Repository metadata returned by `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadata {
    pub stargazers_count: u64,
    pub description: Option<String>,
    pub owner: RepoOwner,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub avatar_url: Option<String>,
}

/// Parses the metadata endpoint's JSON payload
pub fn parse_repo_metadata(json: &str) -> Result<RepoMetadata> {
    Ok(serde_json::from_str(json)?)
}

/// Extracted content of a rendered readme page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadmeContent {
    /// First embedded image that is not a badge/logo
    pub preview_image_url: Option<String>,

    /// First non-empty paragraph; fallback repository description
    pub description: Option<String>,

    /// First anchor matching the hosted-demo URL convention
    pub demo_url: Option<String>,
}

/// Splits a repository URL into its `(owner, repo)` segments
///
/// The slug is taken relative to the configured repository host so the host
/// may carry its own path prefix; URLs on an unexpected host fall back to
/// their first two path segments.
pub fn repo_slug_from_url(url: &str, repo_host: &str) -> Option<(String, String)> {
    let path = match url.strip_prefix(repo_host) {
        Some(rest) => rest.to_string(),
        None => Url::parse(url).ok()?.path().to_string(),
    };
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?.to_string();
    let repo = segments.next()?.to_string();
    Some((owner, repo))
}

/// Parses a rendered readme page
///
/// Root-relative image sources are resolved against `repo_host`. Demo
/// anchors are searched on the whole page, not just the readme container,
/// matching where repository pages place their "open in app" links.
pub fn parse_readme(html: &str, repo_host: &str, links: &LinkClassifier) -> ReadmeContent {
    let document = Html::parse_document(html);

    let Ok(readme_selector) = Selector::parse("#readme") else {
        return ReadmeContent::default();
    };

    let mut content = ReadmeContent::default();

    if let Some(readme) = document.select(&readme_selector).next() {
        if let Ok(img_selector) = Selector::parse("img") {
            content.preview_image_url = readme
                .select(&img_selector)
                .filter(|img| !is_badge(img))
                .filter_map(|img| img.value().attr("src"))
                .next()
                .map(|src| resolve_image_src(src, repo_host));
        }

        if let Ok(p_selector) = Selector::parse("p") {
            content.description = readme
                .select(&p_selector)
                .map(|p| p.text().collect::<String>().replace('\n', "").trim().to_string())
                .find(|text| !text.is_empty());
        }
    }

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        content.demo_url = document
            .select(&anchor_selector)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| links.is_demo(href))
            .map(str::to_string);
    }

    content
}

fn is_badge(img: &scraper::ElementRef) -> bool {
    let src = img.value().attr("src").unwrap_or("");
    let canonical = img.value().attr("data-canonical-src").unwrap_or("");
    BADGE_MARKERS
        .iter()
        .any(|marker| src.contains(marker) || canonical.contains(marker))
}

fn resolve_image_src(src: &str, repo_host: &str) -> String {
    if src.starts_with('/') {
        format!("{}{}", repo_host, src)
    } else {
        src.to_string()
    }
}
