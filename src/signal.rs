/// Platform signal layer: signal identifiers, the name table, and the
/// injectable OS facility that delivers signals to controllers.
///
/// Handlers never touch controller state directly. The OS facility queues
/// deliveries and controllers drain that queue with `poll_pending()` at the
/// start of each query.
use crate::error::ControlError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A signal as written in configuration: symbolic name or raw number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SignalSpec {
    Number(i32),
    Name(String),
}

impl From<i32> for SignalSpec {
    fn from(value: i32) -> Self {
        SignalSpec::Number(value)
    }
}

impl From<&str> for SignalSpec {
    fn from(value: &str) -> Self {
        SignalSpec::Name(value.to_string())
    }
}

impl From<String> for SignalSpec {
    fn from(value: String) -> Self {
        SignalSpec::Name(value)
    }
}

impl FromStr for SignalSpec {
    type Err = std::convert::Infallible;

    /// Numeric strings become `Number`, everything else a `Name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i32>() {
            Ok(n) => SignalSpec::Number(n),
            Err(_) => SignalSpec::Name(s.to_string()),
        })
    }
}

impl fmt::Display for SignalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSpec::Number(n) => write!(f, "{n}"),
            SignalSpec::Name(name) => f.write_str(name),
        }
    }
}

/// Explicit signal name to number mapping for the target platform.
///
/// Names are stored in canonical `SIGXXX` form. Lookups accept any case
/// and an optional `SIG` prefix, so `"term"`, `"TERM"` and `"SIGTERM"`
/// are the same signal.
#[derive(Debug, Clone, Default)]
pub struct SignalTable {
    by_name: BTreeMap<String, i32>,
}

impl SignalTable {
    /// Build a table from `(name, number)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        let by_name = entries
            .into_iter()
            .map(|(name, number)| (canonical_name(name.as_ref()), number))
            .collect();
        Self { by_name }
    }

    /// The signals known to the current platform.
    #[cfg(unix)]
    pub fn platform() -> Self {
        use nix::sys::signal::Signal;
        Self::new(Signal::iterator().map(|s| (s.as_str(), s as i32)))
    }

    /// The signals known to the current platform (ISO C set).
    #[cfg(not(unix))]
    pub fn platform() -> Self {
        Self::new([
            ("SIGINT", 2),
            ("SIGILL", 4),
            ("SIGFPE", 8),
            ("SIGSEGV", 11),
            ("SIGTERM", 15),
            ("SIGABRT", 22),
        ])
    }

    /// Look up a signal number by name.
    pub fn lookup(&self, name: &str) -> Option<i32> {
        self.by_name.get(&canonical_name(name)).copied()
    }

    /// Canonical name of a signal number, if the table knows it.
    pub fn name_of(&self, signal: i32) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, &number)| number == signal)
            .map(|(name, _)| name.as_str())
    }

    /// Resolve a spec to a positive signal number.
    pub fn resolve(&self, spec: &SignalSpec) -> Result<i32, ControlError> {
        match spec {
            SignalSpec::Name(name) => self
                .lookup(name)
                .ok_or_else(|| ControlError::invalid(name.as_str(), "unknown signal name")),
            SignalSpec::Number(n) if *n > 0 => Ok(*n),
            SignalSpec::Number(n) => Err(ControlError::invalid(
                n.to_string(),
                "signal numbers must be positive",
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn canonical_name(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase();
    if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    }
}

/// The OS signal facility as seen by a controller.
///
/// `register` routes deliveries of a signal into this source's pending
/// queue; `poll_pending` drains that queue without blocking.
pub trait SignalSource: Send + Sync {
    /// Whether signals can be registered at all on this platform/runtime.
    fn is_available(&self) -> bool;

    /// Start queueing deliveries of `signal`.
    fn register(&self, signal: i32) -> std::io::Result<()>;

    /// Drain signals delivered since the last call, oldest first.
    fn poll_pending(&self) -> Vec<i32>;
}

/// Signal numbers are queued as single bytes, so anything at or above
/// this bound cannot be carried.
#[cfg(unix)]
const SIGNAL_LIMIT: i32 = 128;

/// Process signals delivered through `signal-hook` handlers into a
/// non-blocking socket pair.
///
/// Each handler writes its signal number as one byte, so the queue keeps
/// deliveries in arrival order and repeated deliveries are not merged.
/// If the socket buffer is full further deliveries are dropped.
#[cfg(unix)]
pub struct OsSignalSource {
    queue: Option<SignalQueue>,
}

#[cfg(unix)]
struct SignalQueue {
    read: std::sync::Mutex<std::os::unix::net::UnixStream>,
    write: std::sync::Arc<std::os::unix::net::UnixStream>,
}

#[cfg(unix)]
impl SignalQueue {
    fn open() -> std::io::Result<Self> {
        let (read, write) = std::os::unix::net::UnixStream::pair()?;
        read.set_nonblocking(true)?;
        write.set_nonblocking(true)?;
        Ok(Self {
            read: std::sync::Mutex::new(read),
            write: std::sync::Arc::new(write),
        })
    }
}

#[cfg(unix)]
impl OsSignalSource {
    /// Create the source. If the queue cannot be set up the source
    /// reports itself unavailable rather than failing.
    pub fn new() -> Self {
        match SignalQueue::open() {
            Ok(queue) => Self { queue: Some(queue) },
            Err(e) => {
                tracing::warn!(error = %e, "failed to set up signal queue");
                Self { queue: None }
            }
        }
    }
}

#[cfg(unix)]
impl SignalSource for OsSignalSource {
    fn is_available(&self) -> bool {
        self.queue.is_some()
    }

    fn register(&self, signal: i32) -> std::io::Result<()> {
        // signal-hook panics on these instead of returning an error.
        if signal_hook::consts::FORBIDDEN.contains(&signal) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("signal {signal} cannot be handled"),
            ));
        }
        if !(1..SIGNAL_LIMIT).contains(&signal) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("signal {signal} is out of range"),
            ));
        }
        let Some(queue) = &self.queue else {
            return Err(unsupported());
        };

        let write = std::sync::Arc::clone(&queue.write);
        let byte = [signal as u8];
        // SAFETY: the handler only issues a single write(2) on a
        // non-blocking socket, which is async-signal-safe. It neither
        // allocates nor takes locks.
        unsafe {
            signal_hook::low_level::register(signal, move || {
                use std::io::Write;
                let _ = (&*write).write(&byte);
            })?;
        }
        Ok(())
    }

    fn poll_pending(&self) -> Vec<i32> {
        use std::io::Read;

        let Some(queue) = &self.queue else {
            return Vec::new();
        };
        let read = queue
            .read
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut pending = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            match (&*read).read(&mut buf) {
                Ok(0) => break,
                Ok(n) => pending.extend(buf[..n].iter().map(|&b| i32::from(b))),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if e.kind() != std::io::ErrorKind::WouldBlock {
                        tracing::warn!(error = %e, "failed to drain signal queue");
                    }
                    break;
                }
            }
        }
        pending
    }
}

/// Signal delivery is not supported off Unix; this source is always
/// unavailable so controllers fall back.
#[cfg(not(unix))]
pub struct OsSignalSource;

#[cfg(not(unix))]
impl OsSignalSource {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignalSource {
    fn is_available(&self) -> bool {
        false
    }

    fn register(&self, _signal: i32) -> std::io::Result<()> {
        Err(unsupported())
    }

    fn poll_pending(&self) -> Vec<i32> {
        Vec::new()
    }
}

impl Default for OsSignalSource {
    fn default() -> Self {
        Self::new()
    }
}

fn unsupported() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "signal handling is not available",
    )
}
