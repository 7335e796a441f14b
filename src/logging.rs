use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent}%";

static PROGRESS_STYLE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE).ok()?;
    Some(
        style
            .progress_chars("#>-")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    )
});

/// Debug logging plus progress rendering, consumed by
/// [`HttpClient`](crate::client::HttpClient).
///
/// The facade uses no other logging levels.
pub trait Logger: Send + Sync {
    /// Logs a message at debug level.
    fn debug(&self, message: &str);

    /// Starts a progress task at 0% completion and returns its handle.
    fn progress(&self) -> Box<dyn Progress>;
}

/// Handle to a single progress task.
pub trait Progress: Send + Sync {
    /// Sets the completed percentage, in [0, 100].
    fn update(&self, completed: f64);

    /// Stops rendering the task.
    fn stop(&self);
}

/// [`Logger`] that writes through `tracing` and renders progress with an
/// indicatif bar.
#[derive(Debug, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn progress(&self) -> Box<dyn Progress> {
        let bar = ProgressBar::new(100);
        if let Some(style) = PROGRESS_STYLE.as_ref() {
            bar.set_style(style.clone());
        }
        Box::new(ConsoleProgress { bar })
    }
}

struct ConsoleProgress {
    bar: ProgressBar,
}

impl Progress for ConsoleProgress {
    fn update(&self, completed: f64) {
        self.bar.set_position(completed.round() as u64);
    }

    fn stop(&self) {
        self.bar.finish();
    }
}

/// Installs a stderr subscriber that shows the facade's debug logs.
///
/// Respects `RUST_LOG` when set.
pub fn initialize_logging() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .from_env_lossy(),
        )
        .with(fmt_layer)
        .init();
}
