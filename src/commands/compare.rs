//! Price comparison run: list the catalog, resolve both regions per entry,
//! rank by savings.

use crate::config::Config;
use crate::pricing::{
    sort_by_savings, ComparisonRecord, ExchangeRate, SOURCE_REGION, TARGET_REGION,
};
use crate::steam::models::dedup_entries;
use crate::steam::{
    extract_price, AppData, CatalogEntry, CatalogLister, DetailResolver, FetchError, PriceQuote,
    Region, StoreApi, StoreClient,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Stages of a run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Idle,
    Listing,
    Comparing,
    Aggregating,
    Done,
}

/// What happened to each entry of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Unique entries dispatched for comparison
    pub listed: usize,
    /// Entries priced in both regions
    pub compared: usize,
    /// Entries without a price in at least one region
    pub unavailable: usize,
    /// Entries abandoned after retries or undecodable responses
    pub dropped: usize,
}

/// Ranked comparison records plus the run's bookkeeping.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Sorted by savings, highest first
    pub records: Vec<ComparisonRecord>,
    pub summary: RunSummary,
    pub phase: RunPhase,
}

/// Result of comparing a single entry.
#[derive(Debug, Clone)]
pub enum EntryOutcome {
    Compared(ComparisonRecord),
    Unavailable,
    Dropped(FetchError),
}

/// Executes a regional price comparison.
pub struct CompareCommand {
    config: Config,
    phase: RunPhase,
}

impl CompareCommand {
    /// Creates a new compare command.
    pub fn new(config: Config) -> Self {
        Self { config, phase: RunPhase::Idle }
    }

    /// Lists `max_pages` catalog pages and compares every entry found.
    pub async fn execute(&mut self, max_pages: u32) -> Result<RunReport> {
        let client = StoreClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(Arc::new(client), max_pages).await
    }

    /// Runs the comparison with a provided client (for testing).
    pub async fn execute_with_client<C: StoreApi + 'static>(
        &mut self,
        client: Arc<C>,
        max_pages: u32,
    ) -> Result<RunReport> {
        self.start_run();

        let lister = CatalogLister::new(
            client.as_ref(),
            SOURCE_REGION,
            self.config.page_retry(),
            self.config.page_pause(),
        )
        .with_source(self.config.source);
        let entries = lister.list_entries(max_pages).await;

        self.compare_entries(client, entries).await
    }

    /// Compares an explicit list of app ids, skipping catalog listing.
    pub async fn execute_apps(&mut self, app_ids: &[String]) -> Result<RunReport> {
        let client = StoreClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_apps_with_client(Arc::new(client), app_ids).await
    }

    /// Compares explicit app ids with a provided client (for testing).
    pub async fn execute_apps_with_client<C: StoreApi + 'static>(
        &mut self,
        client: Arc<C>,
        app_ids: &[String],
    ) -> Result<RunReport> {
        let mut entries = Vec::new();
        for id in app_ids {
            let id = id.trim();
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                anyhow::bail!("Invalid app id: '{}'. App ids are numeric.", id);
            }
            entries.push(CatalogEntry::new(id, id));
        }

        self.start_run();
        self.compare_entries(client, entries).await
    }

    /// Every run starts from `Idle`, so a command can be executed again.
    fn start_run(&mut self) {
        self.phase = RunPhase::Idle;
        self.advance(RunPhase::Listing);
    }

    fn advance(&mut self, next: RunPhase) {
        if next <= self.phase {
            warn!("Ignoring backward phase change {:?} -> {:?}", self.phase, next);
            return;
        }
        debug!("Run phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Fans entries out to a bounded worker pool and ranks the results.
    async fn compare_entries<C: StoreApi + 'static>(
        &mut self,
        client: Arc<C>,
        entries: Vec<CatalogEntry>,
    ) -> Result<RunReport> {
        self.advance(RunPhase::Comparing);

        let entries = dedup_entries(entries);
        let total = entries.len();
        let workers = self.config.workers();
        info!("Comparing {} entries with {} worker(s)", total, workers);

        let resolver = DetailResolver::new(
            client,
            self.config.detail_retry(),
            self.config.detail_pause(),
        );
        let rate = self.config.exchange_rate;

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        let mut outcomes: Vec<(CatalogEntry, EntryOutcome)> = Vec::with_capacity(total);

        for entry in entries {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .context("Worker pool closed unexpectedly")?;
            let resolver = resolver.clone();

            tasks.spawn(async move {
                let outcome = compare_entry(&resolver, &entry, rate).await;
                drop(permit);
                (entry, outcome)
            });

            while let Some(joined) = tasks.try_join_next() {
                collect(joined, &mut outcomes, total);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            collect(joined, &mut outcomes, total);
        }

        self.advance(RunPhase::Aggregating);

        let mut summary = RunSummary { listed: total, ..RunSummary::default() };
        let mut records = Vec::new();

        for (_, outcome) in outcomes {
            match outcome {
                EntryOutcome::Compared(record) => {
                    summary.compared += 1;
                    records.push(record);
                }
                EntryOutcome::Unavailable => summary.unavailable += 1,
                EntryOutcome::Dropped(_) => summary.dropped += 1,
            }
        }
        // Tasks that panicked never reported back
        summary.dropped += total - (summary.compared + summary.unavailable + summary.dropped);

        sort_by_savings(&mut records);

        info!(
            "Found {} entries with valid prices ({} unavailable, {} dropped)",
            summary.compared, summary.unavailable, summary.dropped
        );

        self.advance(RunPhase::Done);
        Ok(RunReport { records, summary, phase: self.phase })
    }
}

fn collect(
    joined: Result<(CatalogEntry, EntryOutcome), tokio::task::JoinError>,
    outcomes: &mut Vec<(CatalogEntry, EntryOutcome)>,
    total: usize,
) {
    match joined {
        Ok((entry, outcome)) => {
            let done = outcomes.len() + 1;
            match &outcome {
                EntryOutcome::Compared(record) => info!(
                    "[{}/{}] {}: {} {:.2} vs {} {:.2} ({:.2}%)",
                    done,
                    total,
                    record.name,
                    SOURCE_REGION.label(),
                    record.source_converted,
                    TARGET_REGION.label(),
                    record.target_price.final_price,
                    record.difference_percent
                ),
                EntryOutcome::Unavailable => {
                    info!("[{}/{}] {}: no price in both regions", done, total, entry.name)
                }
                EntryOutcome::Dropped(e) => {
                    warn!("[{}/{}] {}: dropped ({})", done, total, entry.name, e)
                }
            }
            outcomes.push((entry, outcome));
        }
        Err(e) => warn!("Comparison task failed: {}", e),
    }
}

/// Resolves both regions for one entry and compares them.
///
/// The target region is only queried when the source region has a price.
pub async fn compare_entry<C: StoreApi + ?Sized>(
    resolver: &DetailResolver<C>,
    entry: &CatalogEntry,
    rate: ExchangeRate,
) -> EntryOutcome {
    let source = match resolver.get_details(&entry.id, SOURCE_REGION).await {
        Ok(Some(data)) => data,
        Ok(None) => return EntryOutcome::Unavailable,
        Err(e) => return EntryOutcome::Dropped(e),
    };

    let Some(source_price) = priced(&source, entry, SOURCE_REGION) else {
        return EntryOutcome::Unavailable;
    };

    let target = match resolver.get_details(&entry.id, TARGET_REGION).await {
        Ok(Some(data)) => data,
        Ok(None) => return EntryOutcome::Unavailable,
        Err(e) => return EntryOutcome::Dropped(e),
    };

    let Some(target_price) = priced(&target, entry, TARGET_REGION) else {
        return EntryOutcome::Unavailable;
    };

    let name = if source.name.trim().is_empty() { entry.name.clone() } else { source.name };

    EntryOutcome::Compared(ComparisonRecord::new(
        entry.id.clone(),
        name,
        source_price,
        target_price,
        rate,
    ))
}

fn priced(data: &AppData, entry: &CatalogEntry, region: Region) -> Option<PriceQuote> {
    let price = extract_price(data);
    if price.is_none() {
        if data.is_free {
            debug!("{} is free to play in {}", entry.name, region.label());
        } else {
            debug!("{} has no {} price", entry.name, region.label());
        }
    }
    price
}
