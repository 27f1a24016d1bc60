//! Display-name normalization
//!
//! Derives a human-readable title from a package name. The transform is
//! deterministic and order-sensitive: the reserved prefix is stripped and
//! the brand substring removed before separators are collapsed and the
//! words title-cased; the acronym corrections run last.

/// Reserved package prefixes, stripped only at the very start of the name
const RESERVED_PREFIXES: &[&str] = &["st-", "st_"];

/// Brand substring removed from package names
const BRAND: &str = "streamlit";

/// Capitalization corrections for acronyms and proper nouns that naive
/// title-casing breaks. Keyed by the title-cased word.
const CORRECTIONS: &[(&str, &str)] = &[
    ("Aggrid", "AgGrid"),
    ("Echarts", "ECharts"),
    ("Hiplot", "HiPlot"),
    ("Javascript", "JavaScript"),
    ("Json", "JSON"),
    ("Pdf", "PDF"),
    ("Sqlalchemy", "SQLAlchemy"),
    ("Ui", "UI"),
    ("Url", "URL"),
    ("Webrtc", "WebRTC"),
];

/// Derives the display name for a package name
///
/// # Examples
///
/// ```
/// use components_hub::catalog::display_name_from_package;
///
/// assert_eq!(display_name_from_package("st-card"), "Card");
/// assert_eq!(display_name_from_package("st-aggrid-pro"), "AgGrid Pro");
/// assert_eq!(display_name_from_package("streamlit-hiplot"), "HiPlot");
/// ```
pub fn display_name_from_package(package: &str) -> String {
    let mut name = package.to_string();

    // Prefix strip applies at the start of the string only.
    for prefix in RESERVED_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.to_string();
            break;
        }
    }

    name = name.replace(BRAND, "");
    name = name.replace(['-', '_'], " ");

    name.split_whitespace()
        .map(title_case_word)
        .map(correct_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn correct_word(word: String) -> String {
    for (from, to) in CORRECTIONS {
        if word == *from {
            return (*to).to_string();
        }
    }
    word
}
