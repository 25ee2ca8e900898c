//! Test doubles shared by the unit tests.

use crate::controller::Controller;
use crate::log::{Context, Logger};
use crate::signal::SignalSource;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory signal facility. `deliver` simulates an asynchronous signal.
pub struct FakeSignalSource {
    available: bool,
    rejected: BTreeSet<i32>,
    registered: Mutex<Vec<i32>>,
    pending: Mutex<VecDeque<i32>>,
    polls: AtomicUsize,
}

impl FakeSignalSource {
    pub fn available() -> Self {
        Self {
            available: true,
            rejected: BTreeSet::new(),
            registered: Mutex::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    /// Registration of any of `signals` fails.
    pub fn rejecting(signals: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rejected: signals.into_iter().collect(),
            ..Self::available()
        }
    }

    pub fn deliver(&self, signal: i32) {
        self.pending.lock().unwrap().push_back(signal);
    }

    pub fn registered(&self) -> Vec<i32> {
        self.registered.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl SignalSource for FakeSignalSource {
    fn is_available(&self) -> bool {
        self.available
    }

    fn register(&self, signal: i32) -> std::io::Result<()> {
        if self.rejected.contains(&signal) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "signal rejected",
            ));
        }
        self.registered.lock().unwrap().push(signal);
        Ok(())
    }

    fn poll_pending(&self) -> Vec<i32> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().unwrap().drain(..).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// Captures every message for later assertions.
#[derive(Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.records().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: Level, message: &str) {
        self.records.lock().unwrap().push((level, message.to_string()));
    }
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str, _context: Context<'_>) {
        self.push(Level::Info, message);
    }

    fn warning(&self, message: &str, _context: Context<'_>) {
        self.push(Level::Warning, message);
    }

    fn error(&self, message: &str, _context: Context<'_>) {
        self.push(Level::Error, message);
    }
}

/// Controller with settable answers that counts calls and records the
/// order in which it was queried into a shared journal.
pub struct ScriptedController {
    name: &'static str,
    stop: AtomicBool,
    pause: AtomicBool,
    stop_calls: AtomicUsize,
    pause_calls: AtomicUsize,
    journal: Arc<Mutex<Vec<&'static str>>>,
}

impl ScriptedController {
    pub fn new(name: &'static str, stop: bool, pause: bool) -> Arc<Self> {
        Self::with_journal(name, stop, pause, Arc::default())
    }

    pub fn with_journal(
        name: &'static str,
        stop: bool,
        pause: bool,
        journal: Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            stop: AtomicBool::new(stop),
            pause: AtomicBool::new(pause),
            stop_calls: AtomicUsize::new(0),
            pause_calls: AtomicUsize::new(0),
            journal,
        })
    }

    pub fn set_stop(&self, value: bool) {
        self.stop.store(value, Ordering::SeqCst);
    }

    pub fn set_pause(&self, value: bool) {
        self.pause.store(value, Ordering::SeqCst);
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn pause_calls(&self) -> usize {
        self.pause_calls.load(Ordering::SeqCst)
    }
}

impl Controller for ScriptedController {
    fn should_stop(&self) -> bool {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push(self.name);
        self.stop.load(Ordering::SeqCst)
    }

    fn should_pause(&self) -> bool {
        self.pause_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push(self.name);
        self.pause.load(Ordering::SeqCst)
    }
}
