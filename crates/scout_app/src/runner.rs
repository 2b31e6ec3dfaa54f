use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use scout_core::{normalize_title, BatchReport, JobId, JobStatus};
use scout_engine::{
    spawn_cleanup_loop, BatchRequest, CancellationToken, HttpClient, JobTracker,
    JsonCatalogProvider, JsonFileLibrarySource, LibrarySource, ScoutService, StaticLibrarySource,
    TokenCredentials,
};
use scout_logging::{scout_error, scout_info, scout_warn};
use serde::Serialize;
use url::Url;

use crate::config::{AppConfig, LIBRARY_SOURCE};

/// Outcome of one configured batch, printed as JSON at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub job_id: JobId,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: JobStatus,
    pub finished_at: DateTime<Utc>,
    pub report: Option<BatchReport>,
}

/// Submits every configured batch and waits for all of them to settle.
///
/// Ctrl-C cancels the jobs still running; their summaries are reported as
/// cancelled without a result.
pub async fn run(config: &AppConfig) -> anyhow::Result<Vec<RunSummary>> {
    let tracker_settings = config.tracker_settings();
    let tracker = Arc::new(JobTracker::new(tracker_settings.retention));
    let stop = CancellationToken::new();
    let cleanup = spawn_cleanup_loop(tracker.clone(), tracker_settings.cleanup_period, stop.clone());

    let service = build_service(config, tracker.clone()).await?;

    let mut submitted = Vec::new();
    for batch in &config.batches {
        let request = BatchRequest {
            source: batch.source.clone(),
            provider: batch.provider.clone(),
            filters: config.filters.clone(),
        };
        match service.submit(request).await {
            Ok(job_id) => submitted.push(job_id),
            Err(err) => scout_error!("batch {}/{} rejected: {}", batch.provider, batch.source, err),
        }
    }

    let watch_all = async {
        let mut summaries = Vec::with_capacity(submitted.len());
        for &job_id in &submitted {
            if let Some(summary) = watch(&service, job_id, config.poll_interval()).await {
                summaries.push(summary);
            }
        }
        summaries
    };

    let summaries = tokio::select! {
        summaries = watch_all => summaries,
        _ = tokio::signal::ctrl_c() => {
            scout_warn!("interrupted; cancelling {} jobs", submitted.len());
            tracker.shutdown();
            submitted
                .iter()
                .filter_map(|&job_id| summarize(&service, job_id))
                .collect()
        }
    };

    stop.cancel();
    if let Err(err) = cleanup.await {
        scout_warn!("cleanup loop ended abnormally: {}", err);
    }
    Ok(summaries)
}

pub async fn build_service(
    config: &AppConfig,
    tracker: Arc<JobTracker<BatchReport>>,
) -> anyhow::Result<ScoutService> {
    let http = HttpClient::new(config.http_settings()).context("building http client")?;
    let mut service = ScoutService::new(tracker, config.service_settings());

    let library = JsonFileLibrarySource::new(LIBRARY_SOURCE, &config.library_path);
    if !config.subsets.is_empty() {
        let items = library
            .fetch_items()
            .await
            .with_context(|| format!("reading {:?} for subsets", config.library_path))?;
        for subset in &config.subsets {
            let wanted: HashSet<String> = subset.titles.iter().map(|t| normalize_title(t)).collect();
            let picked: Vec<_> = items
                .iter()
                .filter(|item| wanted.contains(&normalize_title(&item.title)))
                .cloned()
                .collect();
            if picked.len() < wanted.len() {
                scout_warn!(
                    "subset {}: {} of {} titles found in the library",
                    subset.name,
                    picked.len(),
                    wanted.len()
                );
            }
            service.register_source(Arc::new(StaticLibrarySource::new(&subset.name, picked)));
        }
    }
    service.register_source(Arc::new(library));

    for provider in &config.providers {
        let base_url = Url::parse(&provider.base_url)
            .with_context(|| format!("provider {}: invalid base url", provider.name))?;
        let mut catalog = JsonCatalogProvider::new(&provider.name, base_url, http.clone())?;
        if let Some(token) = &provider.token {
            let token_url = Url::parse(&token.url)
                .with_context(|| format!("provider {}: invalid token url", provider.name))?;
            catalog = catalog.with_credentials(TokenCredentials {
                token_url,
                client_id: token.client_id.clone(),
                client_secret: token.client_secret.clone(),
            });
        }
        service.register_provider(Arc::new(catalog));
    }
    Ok(service)
}

async fn watch(service: &ScoutService, job_id: JobId, poll: Duration) -> Option<RunSummary> {
    let mut last_logged = None;
    loop {
        let view = service.progress(job_id)?;
        if view.status != JobStatus::Running {
            break;
        }
        let percent = view.percent();
        if last_logged != Some(percent) {
            scout_info!(
                "job {} {}: {}/{} ({}%) {}",
                job_id,
                view.job_type,
                view.current,
                view.total,
                percent,
                view.phase
            );
            last_logged = Some(percent);
        }
        tokio::time::sleep(poll).await;
    }
    summarize(service, job_id)
}

fn summarize(service: &ScoutService, job_id: JobId) -> Option<RunSummary> {
    let job = service.tracker().get_progress(job_id)?;
    Some(RunSummary {
        job_id,
        job_type: job.job_type,
        status: job.status,
        finished_at: Utc::now(),
        report: job.result,
    })
}
