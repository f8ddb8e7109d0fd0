use std::sync::{Arc, Mutex, MutexGuard};

/// Receives progress from one reclaim batch at a time.
pub trait ProgressSink: Sync {
    fn start(&self);
    /// `fraction` is already within `0.0..=1.0`; sinks store it as given.
    fn update(&self, fraction: f64, status: &str);
    fn finish(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub is_active: bool,
    pub fraction_completed: f64,
    pub status_text: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            is_active: false,
            fraction_completed: 0.0,
            status_text: String::new(),
        }
    }
}

/// Shared progress of the in-flight reclaim, written by the worker and read
/// by the UI each frame.
#[derive(Debug, Clone, Default)]
pub struct DeletionProgress {
    state: Arc<Mutex<ProgressState>>,
}

impl DeletionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ProgressSink for DeletionProgress {
    fn start(&self) {
        let mut state = self.lock();
        state.is_active = true;
        state.fraction_completed = 0.0;
        state.status_text = "Preparing...".to_string();
    }

    fn update(&self, fraction: f64, status: &str) {
        let mut state = self.lock();
        state.fraction_completed = fraction;
        state.status_text = status.to_string();
    }

    fn finish(&self) {
        self.lock().is_active = false;
    }
}

/// Drives an indicatif bar for the non-interactive `clean` command.
pub struct BarProgress {
    bar: indicatif::ProgressBar,
}

impl BarProgress {
    const SCALE: u64 = 1000;

    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::new(Self::SCALE);
        if let Ok(style) =
            indicatif::ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}")
        {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn start(&self) {
        self.bar.set_position(0);
        self.bar.set_message("Preparing...");
    }

    fn update(&self, fraction: f64, status: &str) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        self.bar.set_position((fraction * Self::SCALE as f64) as u64);
        self.bar.set_message(status.to_string());
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
