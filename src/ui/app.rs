use crate::analyzer::{DiskAnalyzer, ScanHandle};
use crate::cleaner::{Cleaner, ReclaimReport};
use crate::model::{CategoryType, ScanResult, ScannedItem};
use crate::progress::{DeletionProgress, ProgressSink};
use crate::storage::StorageInfo;
use ratatui::widgets::ListState;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

pub enum AppState {
    Scanning,
    Browsing,
    Confirming(CleanRequest),
    Cleaning,
    Done(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Items,
}

/// A pending reclaim. No items means everything in the category.
#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub category: CategoryType,
    pub items: Vec<ScannedItem>,
}

impl CleanRequest {
    pub fn prompt(&self) -> String {
        if self.category == CategoryType::SimulatorDevices {
            return match self.items.len() {
                0 => "Delete all simulators with simctl? This cannot be undone.".to_string(),
                n => format!("Delete {n} simulator(s) with simctl? This cannot be undone."),
            };
        }
        match self.items.len() {
            0 => format!("Move all {} to Trash?", self.category.name()),
            1 => "Move 1 selected item to Trash?".to_string(),
            n => format!("Move {n} selected items to Trash?"),
        }
    }

    pub fn declared_size(&self, results: &[ScanResult]) -> u64 {
        if self.items.is_empty() {
            results
                .iter()
                .find(|r| r.category == self.category)
                .map_or(0, |r| r.total_size)
        } else {
            self.items.iter().map(|i| i.size).sum()
        }
    }
}

const MAX_LISTED_FAILURES: usize = 5;

type CleanMessage = (CategoryType, Result<ReclaimReport, String>);

pub struct App {
    pub home: PathBuf,
    pub analyzer: DiskAnalyzer,
    pub results: Vec<ScanResult>,
    pub storage: StorageInfo,
    pub trash_size: u64,
    pub list_state: ListState,
    pub item_state: ListState,
    pub focus: Focus,
    pub state: AppState,
    pub progress: DeletionProgress,
    pub scan_handle: Option<ScanHandle>,
    pub cleaning_rx: Option<mpsc::Receiver<CleanMessage>>,
}

impl App {
    pub fn new_scanning(home: PathBuf) -> Self {
        let analyzer = DiskAnalyzer::new(home.clone());
        Self {
            home,
            analyzer,
            results: Vec::new(),
            storage: StorageInfo::default(),
            trash_size: 0,
            list_state: ListState::default(),
            item_state: ListState::default(),
            focus: Focus::Categories,
            state: AppState::Scanning,
            progress: DeletionProgress::new(),
            scan_handle: None,
            cleaning_rx: None,
        }
    }

    pub fn start_scan(&mut self) {
        self.state = AppState::Scanning;
        self.scan_handle = Some(self.analyzer.scan_all());
        self.storage = self.analyzer.storage();
    }

    /// Refreshes only the category that was just cleaned.
    fn start_rescan(&mut self, category: CategoryType) {
        self.scan_handle = Some(self.analyzer.rescan(&[category]));
        self.storage = self.analyzer.storage();
    }

    pub fn check_scan_status(&mut self) {
        let Some(handle) = self.scan_handle.as_mut() else {
            return;
        };
        let Some(outcome) = handle.try_wait() else {
            return;
        };
        self.scan_handle = None;

        self.results = self.analyzer.results();
        self.trash_size = self.analyzer.trash_size();
        self.storage = self.analyzer.storage();

        if self.list_state.selected().is_none() && !self.results.is_empty() {
            self.list_state.select(Some(0));
        }
        self.item_state.select(None);
        if self.focus == Focus::Items && self.current_items().is_empty() {
            self.focus = Focus::Categories;
        }

        if outcome.failures.is_empty() {
            if let AppState::Scanning = self.state {
                self.state = AppState::Browsing;
            }
            return;
        }

        let messages: Vec<String> = outcome.failures.iter().map(ToString::to_string).collect();
        let text = format!(
            "Some categories could not be scanned:\n{}",
            messages.join("\n")
        );
        // A rescan after a clean may finish while its summary is still shown.
        if let AppState::Done(msg) = &mut self.state {
            msg.push_str("\n\n");
            msg.push_str(&text);
        } else if matches!(self.state, AppState::Scanning | AppState::Browsing) {
            self.state = AppState::Done(text);
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_handle.is_some()
    }

    pub fn current_result(&self) -> Option<&ScanResult> {
        self.list_state.selected().and_then(|i| self.results.get(i))
    }

    fn current_items(&self) -> &[ScannedItem] {
        self.current_result().map_or(&[], |r| r.items.as_slice())
    }

    pub fn next(&mut self) {
        match self.focus {
            Focus::Categories => {
                step(&mut self.list_state, self.results.len(), true);
                self.item_state.select(None);
            }
            Focus::Items => {
                let len = self.current_items().len();
                step(&mut self.item_state, len, true);
            }
        }
    }

    pub fn previous(&mut self) {
        match self.focus {
            Focus::Categories => {
                step(&mut self.list_state, self.results.len(), false);
                self.item_state.select(None);
            }
            Focus::Items => {
                let len = self.current_items().len();
                step(&mut self.item_state, len, false);
            }
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Categories if !self.current_items().is_empty() => {
                self.item_state.select(Some(0));
                Focus::Items
            }
            _ => Focus::Categories,
        };
    }

    /// Space: toggles the focused item, or every item of the focused
    /// category.
    pub fn toggle(&mut self) {
        let Some(i) = self.list_state.selected() else {
            return;
        };
        let Some(result) = self.results.get_mut(i) else {
            return;
        };

        match self.focus {
            Focus::Items => {
                if let Some(item) = self
                    .item_state
                    .selected()
                    .and_then(|j| result.items.get_mut(j))
                {
                    item.is_selected = !item.is_selected;
                }
            }
            Focus::Categories => {
                let select = !result.items.iter().all(|item| item.is_selected);
                for item in &mut result.items {
                    item.is_selected = select;
                }
            }
        }
    }

    pub fn total_selected_size(&self) -> u64 {
        self.results
            .iter()
            .flat_map(|r| r.items.iter())
            .filter(|i| i.is_selected)
            .map(|i| i.size)
            .sum()
    }

    /// Enter: selected items of the focused category, or the whole
    /// category when nothing in it is selected.
    pub fn request_clean(&mut self) {
        let Some(result) = self.current_result() else {
            return;
        };
        if result.total_size == 0 {
            return;
        }
        let request = CleanRequest {
            category: result.category,
            items: result.selected_items(),
        };
        self.state = AppState::Confirming(request);
    }

    pub fn cancel(&mut self) {
        self.state = AppState::Browsing;
    }

    pub fn confirm_clean(&mut self) {
        let request = match std::mem::replace(&mut self.state, AppState::Cleaning) {
            AppState::Confirming(request) => request,
            other => {
                self.state = other;
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        self.cleaning_rx = Some(rx);

        let home = self.home.clone();
        let progress = self.progress.clone();
        thread::spawn(move || {
            let cleaner = Cleaner::new(home);
            let sink: Option<&dyn ProgressSink> = Some(&progress);
            let result = if request.items.is_empty() {
                cleaner
                    .remove_all_in_category(request.category, sink)
                    .map_err(|e| format!("Error during cleaning: {e}"))
            } else {
                Ok(cleaner.remove_selected(&request.items, Some(request.category), sink))
            };
            let _ = tx.send((request.category, result));
        });
    }

    pub fn check_cleaning_status(&mut self) {
        let Some(rx) = &self.cleaning_rx else {
            return;
        };
        let Ok((category, result)) = rx.try_recv() else {
            return;
        };
        self.cleaning_rx = None;

        self.state = AppState::Done(match result {
            Ok(report) => done_message(&report),
            Err(msg) => msg,
        });
        self.start_rescan(category);
    }

    pub fn progress_label(&self) -> String {
        let state = self.progress.snapshot();
        if state.is_active {
            state.status_text
        } else {
            "Cleaning... (This may take a while)".to_string()
        }
    }
}

fn done_message(report: &ReclaimReport) -> String {
    let mut msg = report.summary();
    for failure in report.failures.iter().take(MAX_LISTED_FAILURES) {
        let _ = write!(msg, "\n{}: {}", failure.path.display(), failure.reason);
    }
    if report.failures.len() > MAX_LISTED_FAILURES {
        let _ = write!(
            msg,
            "\n...and {} more",
            report.failures.len() - MAX_LISTED_FAILURES
        );
    }
    msg
}

fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}
