use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that every source URL is an absolute http(s) URL, that the demo
/// host list is non-empty and that the throttling values are usable.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let urls = [
        ("tracker-url", &config.sources.tracker_url),
        ("forum-url", &config.sources.forum_url),
        ("pypi-url", &config.sources.pypi_url),
        ("github-api-url", &config.sources.github_api_url),
        ("github-url", &config.sources.github_url),
        ("pypistats-url", &config.sources.pypistats_url),
    ];

    for (field, value) in urls {
        let parsed = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {} ({})", field, value, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: {} (expected http or https)",
                field, value
            )));
        }
    }

    if config.sources.demo_hosts.is_empty() {
        return Err(ConfigError::Validation(
            "demo-hosts must list at least one pattern".to_string(),
        ));
    }

    if config.sources.github_token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "github-token-env must not be empty".to_string(),
        ));
    }

    if config.cache.ttl_hours <= 0 {
        return Err(ConfigError::Validation(
            "cache ttl-hours must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn valid_config() -> Config {
        Config {
            sources: SourcesConfig {
                tracker_url: "https://discuss.streamlit.io/t/tracker/4634".to_string(),
                forum_url: "https://discuss.streamlit.io".to_string(),
                pypi_url: "https://pypi.org".to_string(),
                github_api_url: "https://api.github.com".to_string(),
                github_url: "https://github.com".to_string(),
                pypistats_url: "https://pypistats.org".to_string(),
                demo_hosts: vec![
                    "https://share.streamlit.io".to_string(),
                    "streamlitapp.com".to_string(),
                ],
                github_token_env: "GH_TOKEN".to_string(),
            },
            rate_limit: RateLimitConfig {
                readme_delay_ms: 200,
                downloads_delay_ms: 100,
                downloads_retry_backoff_ms: 10_000,
            },
            curated: CuratedConfig {
                overrides_path: "./curated/overrides.toml".to_string(),
                exclude_path: "./curated/exclude.toml".to_string(),
            },
            cache: CacheConfig {
                database_path: None,
                ttl_hours: 24,
            },
            output: OutputConfig {
                catalog_path: "./components.json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = valid_config();
        config.sources.pypi_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = valid_config();
        config.sources.github_api_url = "ftp://api.github.com".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_empty_demo_hosts_rejected() {
        let mut config = valid_config();
        config.sources.demo_hosts.clear();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = valid_config();
        config.cache.ttl_hours = 0;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }
}
