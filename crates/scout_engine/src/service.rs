use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use scout_core::{
    aggregate, reconcile, BatchReport, ItemLookup, JobId, JobStatus, LibraryItem, ProgressView,
    ReconcileSettings, SearchFilters,
};
use scout_logging::{scout_error, scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::fanout::{fan_out, DEFAULT_WIDTH};
use crate::provider::{LibrarySource, SearchProvider};
use crate::tracker::JobTracker;
use crate::SubmitError;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Concurrent lookups per batch.
    pub width: usize,
    pub reconcile: ReconcileSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            reconcile: ReconcileSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Registered library source, e.g. the whole library or a named subset.
    pub source: String,
    pub provider: String,
    pub filters: SearchFilters,
}

/// Submission, progress and cancellation surfaces over one shared tracker.
pub struct ScoutService {
    tracker: Arc<JobTracker<BatchReport>>,
    sources: HashMap<String, Arc<dyn LibrarySource>>,
    providers: HashMap<String, Arc<dyn SearchProvider>>,
    settings: ServiceSettings,
}

impl ScoutService {
    pub fn new(tracker: Arc<JobTracker<BatchReport>>, settings: ServiceSettings) -> Self {
        Self {
            tracker,
            sources: HashMap::new(),
            providers: HashMap::new(),
            settings,
        }
    }

    pub fn register_source(&mut self, source: Arc<dyn LibrarySource>) {
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn register_provider(&mut self, provider: Arc<dyn SearchProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn tracker(&self) -> &Arc<JobTracker<BatchReport>> {
        &self.tracker
    }

    /// Reads the selected library, registers a job and starts the lookups in
    /// the background. Returns as soon as the job exists.
    pub async fn submit(&self, request: BatchRequest) -> Result<JobId, SubmitError> {
        let source = self
            .sources
            .get(&request.source)
            .cloned()
            .ok_or_else(|| SubmitError::UnknownSource(request.source.clone()))?;
        let provider = self
            .providers
            .get(&request.provider)
            .cloned()
            .ok_or_else(|| SubmitError::UnknownProvider(request.provider.clone()))?;

        let items = match source.fetch_items().await {
            Ok(items) => items,
            Err(err) => {
                scout_warn!("library source {} unavailable: {}", source.name(), err);
                Vec::new()
            }
        };

        let job_type = format!("{}/{}", request.provider, request.source);
        let (job_id, cancel) = self.tracker.create_job(&job_type, items.len());
        let batch = Batch {
            job_id,
            cancel,
            tracker: self.tracker.clone(),
            provider,
            items,
            filters: request.filters,
            settings: self.settings.clone(),
        };
        tokio::spawn(batch.run());
        Ok(job_id)
    }

    pub fn progress(&self, job_id: JobId) -> Option<ProgressView> {
        self.tracker.get_progress(job_id).map(|job| job.view())
    }

    pub fn cancel(&self, job_id: JobId) -> bool {
        self.tracker.cancel_job(job_id)
    }

    /// Final report of a completed job.
    pub fn report(&self, job_id: JobId) -> Option<BatchReport> {
        self.tracker.get_progress(job_id).and_then(|job| job.result)
    }

    /// Polls until the job leaves `Running`. `None` if the job is unknown or
    /// was cleaned up while waiting.
    pub async fn wait_until_settled(&self, job_id: JobId, poll: Duration) -> Option<ProgressView> {
        loop {
            let view = self.progress(job_id)?;
            if view.status != JobStatus::Running {
                return Some(view);
            }
            tokio::time::sleep(poll).await;
        }
    }
}

struct Batch {
    job_id: JobId,
    cancel: CancellationToken,
    tracker: Arc<JobTracker<BatchReport>>,
    provider: Arc<dyn SearchProvider>,
    items: Vec<LibraryItem>,
    filters: SearchFilters,
    settings: ServiceSettings,
}

impl Batch {
    async fn run(self) {
        let Batch {
            job_id,
            cancel,
            tracker,
            provider,
            items,
            filters,
            settings,
        } = self;
        let provider_name = provider.name().to_string();
        tracker.update_progress(job_id, 0, &format!("searching {provider_name}"));

        let provider = provider.as_ref();
        let filters = &filters;
        let slots = fan_out(
            items.iter().collect(),
            settings.width,
            &cancel,
            |done| tracker.update_progress(job_id, done, ""),
            |item| provider.search(item, filters),
        )
        .await;

        if cancel.is_cancelled() {
            scout_info!("job {} stopped before reconciliation", job_id);
            return;
        }

        // Without cancellation every slot is filled.
        let mut lookups = Vec::with_capacity(items.len());
        for (item, slot) in items.iter().zip(slots) {
            let Some(outcome) = slot else {
                continue;
            };
            match outcome {
                Ok(candidates) => lookups.push(ItemLookup::found(item.clone(), candidates)),
                Err(err) => {
                    if err.is_authorization() {
                        scout_error!("{}: lookup of {:?} rejected: {}", provider_name, item.title, err);
                    } else {
                        scout_warn!("{}: lookup of {:?} failed: {}", provider_name, item.title, err);
                    }
                    lookups.push(ItemLookup::failed(item.clone()));
                }
            }
        }

        let done = lookups.len();
        tracker.update_progress(job_id, done, "reconciling");
        let responses = reconcile(lookups, &settings.reconcile, Utc::now().year());
        let report = aggregate(&provider_name, responses);
        scout_info!(
            "job {}: {} responses, {} upgrades, {} new albums, {} failed",
            job_id,
            report.responses.len(),
            report.upgrades,
            report.new_albums,
            report.failed
        );
        tracker.mark_complete(job_id, report);
    }
}
