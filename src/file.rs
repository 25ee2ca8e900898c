/// Marker-file controller: stop when a `STOP` file appears, pause while a
/// pause file exists.
///
/// Checked on every query, so an operator can `touch STOP` to end the loop
/// after the current iteration without sending a signal.
use crate::controller::Controller;
use crate::log::{Logger, TracingLogger};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct FileController {
    stop_file: Option<PathBuf>,
    pause_file: Option<PathBuf>,
    stopped: AtomicBool,
    logger: Arc<dyn Logger>,
}

impl FileController {
    pub fn new(stop_file: Option<PathBuf>, pause_file: Option<PathBuf>) -> Self {
        Self {
            stop_file,
            pause_file,
            stopped: AtomicBool::new(false),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Log through `logger` instead of `tracing` directly.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn stop_file(&self) -> Option<&Path> {
        self.stop_file.as_deref()
    }

    pub fn pause_file(&self) -> Option<&Path> {
        self.pause_file.as_deref()
    }
}

impl Controller for FileController {
    /// Sticky: removing the stop file after it was seen does not resume.
    fn should_stop(&self) -> bool {
        if self.stopped.load(Ordering::SeqCst) {
            return true;
        }
        match &self.stop_file {
            Some(path) if path.exists() => {
                self.stopped.store(true, Ordering::SeqCst);
                self.logger.info(
                    "stop file detected",
                    &[("path", path.display().to_string())],
                );
                true
            }
            _ => false,
        }
    }

    fn should_pause(&self) -> bool {
        self.pause_file.as_deref().is_some_and(Path::exists)
    }
}
