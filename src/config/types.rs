use serde::Deserialize;

/// Main configuration structure for Components Hub
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sources: SourcesConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub curated: CuratedConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
}

/// Base URLs of the upstream sources
///
/// These are configurable so that integration tests can point every fetcher
/// at a mock server; production configs use the public hosts.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Forum thread that tracks community components
    #[serde(rename = "tracker-url")]
    pub tracker_url: String,

    /// Forum host, used to classify forum-post links
    #[serde(rename = "forum-url")]
    pub forum_url: String,

    /// Package index host; `/simple/` and `/project/<name>/` are derived
    #[serde(rename = "pypi-url")]
    pub pypi_url: String,

    /// Repository host API (`/repos/{owner}/{repo}`)
    #[serde(rename = "github-api-url")]
    pub github_api_url: String,

    /// Repository host web frontend (readme pages, link classification)
    #[serde(rename = "github-url")]
    pub github_url: String,

    /// Download statistics host (`/api/packages/<name>/recent`)
    #[serde(rename = "pypistats-url")]
    pub pypistats_url: String,

    /// Hosted demo link patterns. Entries containing `://` are matched as
    /// prefixes, bare entries as substrings.
    #[serde(rename = "demo-hosts")]
    pub demo_hosts: Vec<String>,

    /// Name of the environment variable holding the repository API token
    #[serde(rename = "github-token-env")]
    pub github_token_env: String,
}

/// Client-side throttling and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Post-call delay after fetching a readme rendering (milliseconds)
    #[serde(rename = "readme-delay-ms")]
    pub readme_delay_ms: u64,

    /// Post-call delay after a download-statistics query (milliseconds)
    #[serde(rename = "downloads-delay-ms")]
    pub downloads_delay_ms: u64,

    /// Sleep before the single download-statistics retry (milliseconds)
    #[serde(rename = "downloads-retry-backoff-ms")]
    pub downloads_retry_backoff_ms: u64,
}

/// Paths to the manually maintained data files
#[derive(Debug, Clone, Deserialize)]
pub struct CuratedConfig {
    /// TOML table mapping package name to categories / title override
    #[serde(rename = "overrides-path")]
    pub overrides_path: String,

    /// TOML list of package names excluded from the crawl and the output
    #[serde(rename = "exclude-path")]
    pub exclude_path: String,
}

/// HTTP response cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite cache file; omit for an in-memory cache
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,

    /// Time-to-live for cached responses (hours)
    #[serde(rename = "ttl-hours")]
    pub ttl_hours: i64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the emitted catalog JSON document
    #[serde(rename = "catalog-path")]
    pub catalog_path: String,
}
