//! Enrichment pipeline orchestration
//!
//! Runs the five batch steps in a fixed order, strictly sequentially:
//!
//! 1. Forum tracker listing (mandatory; failure aborts the run)
//! 2. Package index crawl (mandatory; failure aborts the run)
//! 3. Repository enrichment (best-effort per record)
//! 4. Download metrics (retry once, then default to zero)
//! 5. Name normalization, curated overrides, search index
//!
//! The ordering is what makes first-writer-wins sound: writes from
//! different sources never race because nothing runs concurrently.

mod curated;
mod downloads;

pub use curated::{apply_override, load_curated, CuratedData, CuratedEntry};
pub use downloads::resolve_downloads;

use std::time::Duration;

use crate::catalog::{display_name_from_package, Catalog, ComponentRecord, RecordPatch, RecordStage};
use crate::config::Config;
use crate::extract::{
    parse_index, parse_project_page, parse_readme, parse_repo_metadata, parse_tracker,
    repo_slug_from_url, LinkClassifier,
};
use crate::fetch::{FetchOutcome, Fetcher};
use crate::{HubError, Result};

/// Runs the full pipeline and returns the finalized records
pub async fn run(config: &Config, fetcher: &mut Fetcher, curated: &CuratedData) -> Result<Vec<ComponentRecord>> {
    let links = LinkClassifier::from_sources(&config.sources);
    let mut catalog = Catalog::new();

    tracing::info!("Crawling forum tracker (step 1/5)");
    step_forum(config, fetcher, &links, &mut catalog).await?;

    tracing::info!("Crawling package index (step 2/5)");
    step_package_index(config, fetcher, curated, &mut catalog).await?;

    tracing::info!(records = catalog.len(), "Enriching from repository host (step 3/5)");
    step_repo_enrichment(config, fetcher, &links, &mut catalog).await;

    tracing::info!("Resolving download metrics (step 4/5)");
    step_downloads(config, fetcher, &mut catalog).await;

    tracing::info!("Applying curated data (step 5/5)");
    step_finalize(curated, &mut catalog);

    Ok(catalog.into_records())
}

/// Reads the body of a mandatory fetch; 404 is as fatal as any other failure
fn mandatory_body(url: &str, outcome: FetchOutcome) -> Result<String> {
    match outcome {
        FetchOutcome::Success { body, .. } => Ok(body),
        FetchOutcome::Absent => Err(HubError::Status {
            url: url.to_string(),
            status: 404,
        }),
    }
}

async fn step_forum(
    config: &Config,
    fetcher: &mut Fetcher,
    links: &LinkClassifier,
    catalog: &mut Catalog,
) -> Result<()> {
    let tracker_url = &config.sources.tracker_url;
    let body = mandatory_body(tracker_url, fetcher.get(tracker_url).await?)?;
    let entries = parse_tracker(&body, links)?;
    tracing::debug!(entries = entries.len(), "parsed tracker listing");

    for entry in entries {
        let mut package_name = entry.package_name;
        let mut package_index_url = entry.package_index_url;

        // No package-index link listed: probe the index for a package named
        // after the repository.
        if package_name.is_none() {
            if let Some(repo_url) = &entry.repo_url {
                if let Some((_, repo)) = repo_slug_from_url(repo_url, &config.sources.github_url) {
                    let probe_url = format!("{}/project/{}/", config.sources.pypi_url, repo);
                    match fetcher.get(&probe_url).await {
                        Ok(outcome) if outcome.is_present() => {
                            tracing::debug!(package = %repo, "adopted package from repo name");
                            package_name = Some(repo);
                            package_index_url = Some(probe_url);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(url = %probe_url, error = %e, "package probe failed")
                        }
                    }
                }
            }
        }

        let identity = package_name
            .clone()
            .unwrap_or_else(|| entry.display_name.clone());
        let record = catalog.upsert(&identity);
        record.absorb(RecordPatch {
            display_name: Some(entry.display_name).filter(|name| !name.is_empty()),
            package_name,
            package_index_url,
            repo_url: entry.repo_url,
            demo_url: entry.demo_url,
            forum_url: entry.forum_url,
            ..Default::default()
        });
    }

    Ok(())
}

async fn step_package_index(
    config: &Config,
    fetcher: &mut Fetcher,
    curated: &CuratedData,
    catalog: &mut Catalog,
) -> Result<()> {
    let index_url = format!("{}/simple/", config.sources.pypi_url);
    let body = mandatory_body(&index_url, fetcher.get(&index_url).await?)?;
    let names = parse_index(&body, &curated.exclude);
    tracing::debug!(packages = names.len(), "index names retained");

    for name in names {
        let detail_url = format!("{}/project/{}/", config.sources.pypi_url, name);
        let outcome = match fetcher.get(&detail_url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(package = %name, error = %e, "detail page fetch failed");
                continue;
            }
        };
        // 404 means the listing is stale and the package is gone.
        let Some(body) = outcome.body().map(str::to_string) else {
            continue;
        };

        let record = catalog.upsert(&name);
        record.absorb(RecordPatch {
            package_name: Some(name.clone()),
            package_index_url: Some(detail_url),
            ..Default::default()
        });

        if record.package_author.is_none() || record.repo_url.is_none() {
            let page = parse_project_page(&body, &config.sources.github_url);
            record.absorb(RecordPatch {
                package_author: page.author,
                repo_url: page.repo_url,
                package_description: page.description,
                ..Default::default()
            });
        }

        record.stage.advance_to(RecordStage::Resolved);
    }

    Ok(())
}

async fn step_repo_enrichment(
    config: &Config,
    fetcher: &mut Fetcher,
    links: &LinkClassifier,
    catalog: &mut Catalog,
) {
    for record in catalog.iter_mut() {
        if record.repo_url.is_none() {
            guess_repo_url(config, fetcher, record).await;
        }

        let Some(repo_url) = record.repo_url.clone() else {
            continue;
        };
        let Some((owner, repo)) = repo_slug_from_url(&repo_url, &config.sources.github_url) else {
            tracing::warn!(identity = %record.identity, url = %repo_url, "unparsable repository link");
            continue;
        };

        record.absorb(RecordPatch {
            repo_owner: Some(owner.clone()),
            ..Default::default()
        });

        // Metadata is best-effort: an unexpected failure leaves the fields
        // null and the run continues.
        let api_url = format!("{}/repos/{}/{}", config.sources.github_api_url, owner, repo);
        match fetcher.get_github(&api_url).await {
            Ok(FetchOutcome::Success { body, .. }) => match parse_repo_metadata(&body) {
                Ok(metadata) => record.absorb(RecordPatch {
                    star_count: Some(metadata.stargazers_count),
                    repo_description: metadata.description,
                    avatar_url: metadata.owner.avatar_url,
                    created_at: Some(metadata.created_at),
                    ..Default::default()
                }),
                Err(e) => {
                    tracing::warn!(identity = %record.identity, error = %e, "metadata payload unusable")
                }
            },
            Ok(FetchOutcome::Absent) => {
                tracing::debug!(identity = %record.identity, "repository gone from host")
            }
            Err(e) => {
                tracing::warn!(identity = %record.identity, error = %e, "repository metadata lookup failed")
            }
        }

        // Readme: preview image, fallback description, demo link.
        match fetcher.get_readme(&repo_url).await {
            Ok(FetchOutcome::Success { body, .. }) => {
                let readme = parse_readme(&body, &config.sources.github_url, links);
                record.absorb(RecordPatch {
                    preview_image_url: readme.preview_image_url,
                    repo_description: readme.description,
                    demo_url: readme.demo_url,
                    ..Default::default()
                });
            }
            Ok(FetchOutcome::Absent) => {}
            Err(e) => {
                tracing::warn!(identity = %record.identity, error = %e, "readme fetch failed")
            }
        }

        record.stage.advance_to(RecordStage::EnrichedRepo);
    }
}

/// Probes the repository host for `{author}/{package}`, preferring the
/// unmodified package name over the underscore variant
async fn guess_repo_url(config: &Config, fetcher: &mut Fetcher, record: &mut ComponentRecord) {
    let (Some(author), Some(package)) = (
        record.package_author.clone(),
        record.package_name.clone(),
    ) else {
        return;
    };

    // Package names often use "-" where the repository uses "_".
    let mut candidates = vec![package.clone()];
    if package.contains('-') {
        candidates.push(package.replace('-', "_"));
    }

    for candidate in candidates {
        let api_url = format!(
            "{}/repos/{}/{}",
            config.sources.github_api_url, author, candidate
        );
        match fetcher.get_github(&api_url).await {
            Ok(outcome) if outcome.is_present() => {
                let repo_url = format!("{}/{}/{}", config.sources.github_url, author, candidate);
                tracing::debug!(identity = %record.identity, url = %repo_url, "guessed repository");
                record.repo_url = Some(repo_url);
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(identity = %record.identity, error = %e, "repository probe failed")
            }
        }
    }
}

async fn step_downloads(config: &Config, fetcher: &mut Fetcher, catalog: &mut Catalog) {
    let backoff = Duration::from_millis(config.rate_limit.downloads_retry_backoff_ms);
    for record in catalog.iter_mut() {
        let Some(package) = record.package_name.clone() else {
            continue;
        };
        let count =
            resolve_downloads(fetcher, &config.sources.pypistats_url, &package, backoff).await;
        record.download_count = Some(count);
        record.stage.advance_to(RecordStage::EnrichedDownloads);
    }
}

fn step_finalize(curated: &CuratedData, catalog: &mut Catalog) {
    for record in catalog.iter_mut() {
        // The package name beats the forum-derived title; this is the one
        // deliberate late overwrite of display_name.
        if let Some(package) = &record.package_name {
            record.display_name = Some(display_name_from_package(package));
        }

        apply_override(record, curated);
        record.rebuild_search_index();
        record.stage.advance_to(RecordStage::Finalized);
    }
}
