// src/runner.rs
//
// Drives ingestion runs. One jurisdiction is a strictly sequential
// load → read → normalize → merge → save; jurisdictions are independent
// and fan out over a small worker pool. The work queue hands each
// jurisdiction to exactly one worker, which is what keeps the
// per-jurisdiction read-modify-write serialized.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use crate::adapters::{self, SourceAdapter};
use crate::config::consts::{JITTER_MS, REQUEST_PAUSE_MS, WORKERS};
use crate::core::net::{Fetch, HttpFetcher};
use crate::error::Result;
use crate::pipeline::merge::merge_snapshot;
use crate::progress::Progress;
use crate::store::{CsvSnapshotStore, SnapshotStore};

pub struct RunParams {
    pub jurisdictions: Vec<String>,
    pub store_dir: PathBuf,
    pub margin_days: i64,
}

/// What one successful jurisdiction run produced.
#[derive(Debug)]
pub struct IngestSummary {
    pub jurisdiction: String,
    pub prior_len: usize,
    pub fresh_len: usize,
    pub total_len: usize,
    pub path: PathBuf,
}

pub struct RunReport {
    pub summaries: Vec<IngestSummary>,
    pub failures: Vec<(String, String)>,
}

/// Full pipeline for one jurisdiction. All-or-nothing: any failure
/// leaves the prior snapshot untouched.
pub fn ingest_jurisdiction(
    adapter: &dyn SourceAdapter,
    store: &dyn SnapshotStore,
    fetch: &dyn Fetch,
    margin_days: i64,
) -> Result<IngestSummary> {
    let name = adapter.jurisdiction();

    let prior = store.load(name)?;
    let prior_len = prior.as_ref().map(|s| s.len()).unwrap_or(0);
    let last_update = prior.as_ref().and_then(|s| s.max_date());

    let raw = adapter.read(fetch, last_update)?;
    let fresh = adapter.normalize(raw)?;
    let fresh_len = fresh.len();

    let next = merge_snapshot(prior.as_ref(), fresh, margin_days)?;
    let total_len = next.len();
    let path = store.save(name, &next)?;

    info!(jurisdiction = name, prior_len, fresh_len, total_len, "snapshot written");

    Ok(IngestSummary {
        jurisdiction: s!(name),
        prior_len,
        fresh_len,
        total_len,
        path,
    })
}

/// Run the given jurisdictions, a few at a time.
pub fn run(params: &RunParams, mut progress: Option<&mut dyn Progress>) -> Result<RunReport> {
    let names = Arc::new(params.jurisdictions.clone());
    let store = Arc::new(CsvSnapshotStore::new(&params.store_dir));
    let fetch: Arc<dyn Fetch> = Arc::new(HttpFetcher::new()?);
    let margin_days = params.margin_days;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(names.len());
    }

    type WorkerResult = std::result::Result<IngestSummary, (String, String)>;

    let counter = Arc::new(AtomicUsize::new(0));
    let (res_tx, res_rx) = mpsc::channel::<WorkerResult>();
    let workers = WORKERS.min(names.len()).max(1);

    for _ in 0..workers {
        let names = Arc::clone(&names);
        let idx = Arc::clone(&counter);
        let store = Arc::clone(&store);
        let fetch = Arc::clone(&fetch);
        let tx = res_tx.clone();

        thread::spawn(move || {
            loop {
                let i = idx.fetch_add(1, Ordering::Relaxed);
                if i >= names.len() {
                    break;
                }
                let name = names[i].clone();
                let result = match adapters::adapter_for(&name) {
                    Ok(Some(adapter)) => ingest_jurisdiction(
                        adapter.as_ref(),
                        store.as_ref(),
                        fetch.as_ref(),
                        margin_days,
                    )
                    .map_err(|e| (name.clone(), e.to_string())),
                    Ok(None) => Err((name.clone(), s!("no adapter registered"))),
                    Err(e) => Err((name.clone(), e.to_string())),
                };
                let _ = tx.send(result);
                let jitter = (i as u64) % JITTER_MS.max(1);
                thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS + jitter)); // be polite
            }
        });
    }
    drop(res_tx); // main thread is sole receiver now

    let mut summaries = Vec::new();
    let mut failures = Vec::new();

    for _ in 0..names.len() {
        match res_rx.recv() {
            Ok(Ok(summary)) => {
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(&summary.jurisdiction);
                }
                summaries.push(summary);
            }
            Ok(Err((name, msg))) => {
                error!(jurisdiction = %name, "ingestion failed: {msg}");
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(&name, &msg);
                }
                failures.push((name, msg));
            }
            Err(_) => break, // workers ended early; bail gracefully
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    Ok(RunReport { summaries, failures })
}
