//! Download metrics resolution
//!
//! Queries the download-statistics source for the most recent month. The
//! source is flaky under load, so a failed query is retried exactly once
//! after a backoff; a second failure resolves to zero downloads rather than
//! propagating. Zero is a deliberate default distinguishing "no data" from
//! "not yet queried" (`None`).

use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

use crate::fetch::{FetchOutcome, Fetcher};

#[derive(Debug, Deserialize)]
struct RecentDownloads {
    data: RecentData,
}

#[derive(Debug, Deserialize)]
struct RecentData {
    last_month: u64,
}

/// Resolves last month's download count for a package
///
/// Any failure mode counts as one failed attempt: transport errors,
/// unexpected statuses, a missing stats record (404) and malformed
/// payloads.
///
/// # Arguments
///
/// * `fetcher` - The fetcher to query through
/// * `stats_base` - Base URL of the download-statistics source
/// * `package` - The package name to look up
/// * `backoff` - Sleep before the single retry
///
/// # Returns
///
/// The download count, or `0` after two failed attempts
pub async fn resolve_downloads(
    fetcher: &mut Fetcher,
    stats_base: &str,
    package: &str,
    backoff: Duration,
) -> u64 {
    let url = format!("{}/api/packages/{}/recent?period=month", stats_base, package);

    if let Some(count) = attempt(fetcher, &url).await {
        return count;
    }

    tracing::debug!(package, "download stats failed, retrying once");
    sleep(backoff).await;

    match attempt(fetcher, &url).await {
        Some(count) => count,
        None => {
            tracing::warn!(package, "download stats failed twice, defaulting to 0");
            0
        }
    }
}

async fn attempt(fetcher: &mut Fetcher, url: &str) -> Option<u64> {
    match fetcher.get_stats(url).await {
        Ok(FetchOutcome::Success { body, .. }) => {
            serde_json::from_str::<RecentDownloads>(&body)
                .ok()
                .map(|payload| payload.data.last_month)
        }
        Ok(FetchOutcome::Absent) => None,
        Err(e) => {
            tracing::debug!(url, error = %e, "download stats attempt failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::{MemoryStore, ResponseCache};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher(base: &str) -> Fetcher {
        std::env::set_var("HUB_TEST_TOKEN", "test-token");
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
        let config: Config = toml::from_str(&toml).unwrap();
        let cache = ResponseCache::new(Box::new(MemoryStore::new()), 24);
        Fetcher::new(&config, cache).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_last_month_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/packages/st-card/recent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": {"last_day": 10, "last_month": 1234, "last_week": 99},
                    "package": "st-card", "type": "recent_downloads"}"#,
            ))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let count =
            resolve_downloads(&mut fetcher, &server.uri(), "st-card", Duration::ZERO).await;
        assert_eq!(count, 1234);
    }

    #[tokio::test]
    async fn test_repeated_failure_defaults_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/packages/st-card/recent"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let count =
            resolve_downloads(&mut fetcher, &server.uri(), "st-card", Duration::ZERO).await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_succeeds_on_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/packages/st-card/recent"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/packages/st-card/recent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": {"last_month": 7}}"#,
            ))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let count =
            resolve_downloads(&mut fetcher, &server.uri(), "st-card", Duration::ZERO).await;
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_malformed_payload_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/packages/st-card/recent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let count =
            resolve_downloads(&mut fetcher, &server.uri(), "st-card", Duration::ZERO).await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_absent_stats_default_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/packages/st-new/recent"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut fetcher = test_fetcher(&server.uri());
        let count =
            resolve_downloads(&mut fetcher, &server.uri(), "st-new", Duration::ZERO).await;
        assert_eq!(count, 0);
    }
}
