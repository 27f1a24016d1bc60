//! HTTP fetcher implementation
//!
//! One fetcher instance serves the whole batch run. It wraps a single
//! `reqwest::Client`, consults the injected response cache before touching
//! the network, and applies the fixed post-call delays for the rate-limited
//! endpoints. All calls are sequential; the fetcher is never shared across
//! tasks.

use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::fetch::cache::{cache_key, ResponseCache};
use crate::{HubError, Result};

/// Result of a fetch operation
///
/// A 404 is a valid "resource absent" outcome, distinct from every other
/// non-2xx status (those surface as [`HubError::Status`] and the call site
/// decides whether they are fatal).
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 2xx response
    Success {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The resource does not exist (HTTP 404)
    Absent,
}

impl FetchOutcome {
    /// Returns the body for a successful fetch, `None` for an absent resource
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Absent => None,
        }
    }

    /// Returns true if the resource exists
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds the HTTP client used for every source
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("components-hub/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP fetcher with response caching and client-side throttling
pub struct Fetcher {
    client: Client,
    cache: ResponseCache,
    github_token: String,
    token_fingerprint: String,
    readme_delay: Duration,
    stats_delay: Duration,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("token_fingerprint", &self.token_fingerprint)
            .field("readme_delay", &self.readme_delay)
            .field("stats_delay", &self.stats_delay)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Creates a fetcher from the run configuration and an injected cache
    ///
    /// Reads the repository API token from the environment variable named
    /// in the config; construction fails if it is unset.
    pub fn new(config: &Config, cache: ResponseCache) -> Result<Self> {
        let env_name = &config.sources.github_token_env;
        let github_token = std::env::var(env_name)
            .map_err(|_| HubError::MissingToken(env_name.clone()))?;

        let token_fingerprint = hex::encode(Sha256::digest(github_token.as_bytes()));

        Ok(Self {
            client: build_http_client()?,
            cache,
            github_token,
            token_fingerprint,
            readme_delay: Duration::from_millis(config.rate_limit.readme_delay_ms),
            stats_delay: Duration::from_millis(config.rate_limit.downloads_delay_ms),
        })
    }

    /// Anonymous GET
    pub async fn get(&mut self, url: &str) -> Result<FetchOutcome> {
        self.execute(url, false, None).await
    }

    /// GET against the repository host API (token + JSON accept header)
    pub async fn get_github(&mut self, url: &str) -> Result<FetchOutcome> {
        self.execute(url, true, None).await
    }

    /// GET of a readme rendering; authorized and throttled after the call
    pub async fn get_readme(&mut self, url: &str) -> Result<FetchOutcome> {
        self.execute(url, true, Some(self.readme_delay)).await
    }

    /// GET against the download-statistics source; throttled after the call
    pub async fn get_stats(&mut self, url: &str) -> Result<FetchOutcome> {
        self.execute(url, false, Some(self.stats_delay)).await
    }

    async fn execute(
        &mut self,
        url: &str,
        authorized: bool,
        delay: Option<Duration>,
    ) -> Result<FetchOutcome> {
        let fingerprint = if authorized {
            self.token_fingerprint.as_str()
        } else {
            ""
        };
        let key = cache_key("GET", url, fingerprint);

        // Cache hits skip the network and therefore the throttle delay.
        if let Some(hit) = self.cache.lookup(&key)? {
            tracing::trace!(url, status = hit.status, "cache hit");
            return Ok(outcome_from(hit.status, hit.body));
        }

        let mut request = self.client.get(url);
        if authorized {
            request = request
                .header("Accept", "application/vnd.github.v3+json")
                .header("Authorization", format!("Token {}", self.github_token));
        }

        let response = request.send().await.map_err(|source| HubError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| HubError::Http {
            url: url.to_string(),
            source,
        })?;

        if let Some(delay) = delay {
            sleep(delay).await;
        }

        // 2xx and 404 are memoizable outcomes; everything else is an error
        // at this call site and must not be replayed from the cache.
        if (200..300).contains(&status) || status == 404 {
            self.cache.record(&key, status, &body)?;
            Ok(outcome_from(status, body))
        } else {
            Err(HubError::Status {
                url: url.to_string(),
                status,
            })
        }
    }
}

fn outcome_from(status: u16, body: String) -> FetchOutcome {
    if status == 404 {
        FetchOutcome::Absent
    } else {
        FetchOutcome::Success { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::cache::MemoryStore;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> Config {
        let toml = format!(
            r#"
[sources]
tracker-url = "{base}/t/tracker/4634"
forum-url = "{base}"
pypi-url = "{base}"
github-api-url = "{base}"
github-url = "{base}"
pypistats-url = "{base}"
demo-hosts = ["{base}/demo"]
github-token-env = "HUB_TEST_TOKEN"

[rate-limit]
readme-delay-ms = 0
downloads-delay-ms = 0
downloads-retry-backoff-ms = 0

[curated]
overrides-path = "./overrides.toml"
exclude-path = "./exclude.toml"

[cache]
ttl-hours = 24

[output]
catalog-path = "./components.json"
"#
        );
        toml::from_str(&toml).unwrap()
    }

    fn test_fetcher(base: &str) -> Fetcher {
        std::env::set_var("HUB_TEST_TOKEN", "test-token");
        let cache = ResponseCache::new(Box::new(MemoryStore::new()), 24);
        Fetcher::new(&test_config(base), cache).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[tokio::test]
    async fn test_get_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let outcome = fetcher.get(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(outcome.body(), Some("hello"));
    }

    #[tokio::test]
    async fn test_get_absent_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let outcome = fetcher
            .get(&format!("{}/missing", server.uri()))
            .await
            .unwrap();
        assert!(!outcome.is_present());
    }

    #[tokio::test]
    async fn test_get_other_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let err = fetcher
            .get(&format!("{}/broken", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_repeated_get_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/once"))
            .respond_with(ResponseTemplate::new(200).set_body_string("cached"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/once", server.uri());
        let mut fetcher = test_fetcher(&server.uri());
        let first = fetcher.get(&url).await.unwrap();
        let second = fetcher.get(&url).await.unwrap();
        assert_eq!(first.body(), Some("cached"));
        assert_eq!(second.body(), Some("cached"));
    }

    #[tokio::test]
    async fn test_github_request_carries_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/jane/st-card"))
            .and(header("Authorization", "Token test-token"))
            .and(header("Accept", "application/vnd.github.v3+json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let outcome = fetcher
            .get_github(&format!("{}/repos/jane/st-card", server.uri()))
            .await
            .unwrap();
        assert!(outcome.is_present());
    }

    #[tokio::test]
    async fn test_missing_token_is_startup_error() {
        let server = MockServer::start().await;
        let mut config = test_config(&server.uri());
        config.sources.github_token_env = "HUB_TEST_TOKEN_UNSET".to_string();
        std::env::remove_var("HUB_TEST_TOKEN_UNSET");

        let cache = ResponseCache::new(Box::new(MemoryStore::new()), 24);
        let err = Fetcher::new(&config, cache).unwrap_err();
        assert!(matches!(err, HubError::MissingToken(_)));
    }
}
