use crate::logging::{Logger, Progress};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// [`Logger`] that records debug lines and progress activity so tests can
/// assert on them without touching the terminal.
#[derive(Default)]
pub struct RecordingLogger {
    messages: Mutex<Vec<String>>,
    pub progress: Arc<RecordingProgress>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn progress(&self) -> Box<dyn Progress> {
        self.progress.starts.fetch_add(1, Ordering::SeqCst);
        Box::new(SharedProgress(self.progress.clone()))
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    starts: AtomicUsize,
    updates: Mutex<Vec<f64>>,
    stops: AtomicUsize,
}

impl RecordingProgress {
    /// How many progress tasks were started.
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<f64> {
        self.updates.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

struct SharedProgress(Arc<RecordingProgress>);

impl Progress for SharedProgress {
    fn update(&self, completed: f64) {
        self.0.updates.lock().unwrap().push(completed);
    }

    fn stop(&self) {
        self.0.stops.fetch_add(1, Ordering::SeqCst);
    }
}
