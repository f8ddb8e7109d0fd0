use crate::error::CleanError;
use crate::model::{CategoryType, ScanResult};
use crate::scanner;
use crate::storage::StorageInfo;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;

/// Everything the UI reads about the last completed scan.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerState {
    /// Batches started but not yet published. Batches may overlap.
    pub in_flight: usize,
    pub storage: StorageInfo,
    pub results: HashMap<CategoryType, ScanResult>,
    pub trash_size: u64,
}

/// Result of one scan batch. Failed categories kept their previous snapshot.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub scanned: Vec<CategoryType>,
    pub failures: Vec<CleanError>,
}

/// Completion handle for a background scan batch.
pub struct ScanHandle {
    rx: Option<Receiver<ScanOutcome>>,
}

impl ScanHandle {
    /// Non-blocking. Yields the outcome once, after the batch has published.
    pub fn try_wait(&mut self) -> Option<ScanOutcome> {
        let outcome = match self.rx.as_ref()?.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => ScanOutcome::default(),
        };
        self.rx = None;
        Some(outcome)
    }

    pub fn wait(self) -> ScanOutcome {
        self.rx
            .map(|rx| rx.recv().unwrap_or_default())
            .unwrap_or_default()
    }
}

/// Runs category scans off the calling thread and publishes the merged
/// snapshot in one step.
#[derive(Clone)]
pub struct DiskAnalyzer {
    home: PathBuf,
    state: Arc<RwLock<AnalyzerState>>,
}

impl DiskAnalyzer {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            state: Arc::default(),
        }
    }

    pub fn scan_all(&self) -> ScanHandle {
        self.rescan(&CategoryType::ALL)
    }

    /// Scans only `categories`; every other category keeps its snapshot.
    pub fn rescan(&self, categories: &[CategoryType]) -> ScanHandle {
        self.begin_batch();

        let (tx, rx) = mpsc::channel();
        let home = self.home.clone();
        let state = Arc::clone(&self.state);
        let categories = categories.to_vec();

        thread::spawn(move || {
            tracing::info!(categories = categories.len(), "scan started");

            let (scans, trash_size) = rayon::join(
                || {
                    categories
                        .par_iter()
                        .map(|&category| (category, scanner::scan_category(category, &home)))
                        .collect::<Vec<_>>()
                },
                || scanner::trash_size(&home),
            );

            let mut merged = HashMap::new();
            let mut outcome = ScanOutcome::default();
            for (category, result) in scans {
                match result {
                    Ok(result) => {
                        merged.insert(category, result);
                        outcome.scanned.push(category);
                    }
                    Err(e) => {
                        tracing::warn!(category = category.id(), error = %e, "scan failed");
                        outcome.failures.push(e);
                    }
                }
            }

            publish(&state, merged, trash_size);

            tracing::info!(
                scanned = outcome.scanned.len(),
                failed = outcome.failures.len(),
                "scan finished"
            );
            let _ = tx.send(outcome);
        });

        ScanHandle { rx: Some(rx) }
    }

    pub fn is_scanning(&self) -> bool {
        self.read().in_flight > 0
    }

    pub fn storage(&self) -> StorageInfo {
        self.read().storage
    }

    pub fn trash_size(&self) -> u64 {
        self.read().trash_size
    }

    /// Snapshots of every scanned category in display order.
    pub fn results(&self) -> Vec<ScanResult> {
        let state = self.read();
        CategoryType::ALL
            .iter()
            .filter_map(|c| state.results.get(c).cloned())
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, AnalyzerState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn begin_batch(&self) {
        let mut state = write_lock(&self.state);
        state.in_flight += 1;
        state.storage = StorageInfo::current();
    }
}

/// The only place scan results reach the shared state.
fn publish(
    state: &RwLock<AnalyzerState>,
    merged: HashMap<CategoryType, ScanResult>,
    trash_size: u64,
) {
    let mut state = write_lock(state);
    state.results.extend(merged);
    state.trash_size = trash_size;
    state.in_flight = state.in_flight.saturating_sub(1);
}

fn write_lock(state: &RwLock<AnalyzerState>) -> RwLockWriteGuard<'_, AnalyzerState> {
    state
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
