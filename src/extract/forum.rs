//! Forum listing extractor
//!
//! Parses the tracker thread's running component list. The list is located
//! positionally: the fourth `<ul>` on the page is the thread's component
//! list. There is no semantic marker for it in the page, so this selector
//! is fragile by nature; a page restructure upstream will surface here as a
//! parse error, not as silently wrong data.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extract::{LinkClassifier, LinkKind};
use crate::{HubError, Result};

/// Zero-based position of the component list among the page's `<ul>` elements
const COMPONENT_LIST_INDEX: usize = 3;

/// Separator between a component title and its trailing byline
const TITLE_SEPARATOR: &str = " – ";

/// One list item of the tracker thread
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForumEntry {
    /// Item text with parenthesized asides stripped and the byline removed
    pub display_name: String,

    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub forum_url: Option<String>,
    pub package_index_url: Option<String>,

    /// Derived from the package-index link's path segment, when present
    pub package_name: Option<String>,
}

/// Parses the tracker thread page into one entry per listed component
///
/// # Arguments
///
/// * `html` - The tracker thread page body
/// * `links` - Classifier for the anchors found in each list item
///
/// # Returns
///
/// * `Ok(Vec<ForumEntry>)` - One entry per item of the component list
/// * `Err(HubError)` - The page has no component list or a selector failed
pub fn parse_tracker(html: &str, links: &LinkClassifier) -> Result<Vec<ForumEntry>> {
    let document = Html::parse_document(html);
    let ul_selector = selector("ul")?;
    let li_selector = selector("li")?;
    let anchor_selector = selector("a[href]")?;
    let aside_pattern = Regex::new(r"\(.*?\)")?;

    let list = document
        .select(&ul_selector)
        .nth(COMPONENT_LIST_INDEX)
        .ok_or_else(|| HubError::HtmlParse {
            context: "tracker page".to_string(),
            message: format!(
                "expected at least {} <ul> elements",
                COMPONENT_LIST_INDEX + 1
            ),
        })?;

    let mut entries = Vec::new();
    for item in list.select(&li_selector) {
        entries.push(parse_item(item, &anchor_selector, &aside_pattern, links));
    }
    Ok(entries)
}

fn parse_item(
    item: ElementRef,
    anchor_selector: &Selector,
    aside_pattern: &Regex,
    links: &LinkClassifier,
) -> ForumEntry {
    let text: String = item.text().collect();
    let text = aside_pattern.replace_all(&text, "");
    let title = match text.split_once(TITLE_SEPARATOR) {
        Some((before, _)) => before,
        None => text.as_ref(),
    };

    let mut entry = ForumEntry {
        display_name: title.trim().to_string(),
        ..Default::default()
    };

    for anchor in item.select(anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        match links.classify(href) {
            LinkKind::Repository => entry.repo_url = Some(href.to_string()),
            LinkKind::Demo => entry.demo_url = Some(href.to_string()),
            LinkKind::ForumPost => entry.forum_url = Some(href.to_string()),
            LinkKind::PackageIndex => {
                entry.package_index_url = Some(href.to_string());
                entry.package_name = links.package_from_index_url(href);
            }
            LinkKind::Other => {}
        }
    }

    entry
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HubError::HtmlParse {
        context: "selector".to_string(),
        message: format!("{}: {}", css, e),
    })
}
