/// Signal-backed controller: turns asynchronous OS signal delivery into
/// synchronously observable stop/pause state.
///
/// Signals are queued by the [`SignalSource`] and only applied when a query
/// reconciles them, so every state change happens on the polling thread.
/// Stop is sticky. Pause is set by pause signals and cleared by resume
/// signals.
use crate::controller::Controller;
use crate::error::ControlError;
use crate::log::{Logger, TracingLogger};
use crate::signal::{OsSignalSource, SignalSource, SignalSpec, SignalTable};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a delivered signal asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Stop,
    Pause,
    Resume,
}

enum Mode {
    /// Signals are registered and drained from this source.
    Signals(Arc<dyn SignalSource>),
    /// The facility was unavailable; every query goes to the fallback.
    Fallback(Box<dyn Controller>),
}

/// Controller driven by configurable stop, pause and resume signal sets.
pub struct SignalController {
    stop_signals: BTreeSet<i32>,
    pause_signals: BTreeSet<i32>,
    resume_signals: BTreeSet<i32>,
    stopped: AtomicBool,
    paused: AtomicBool,
    mode: Mode,
    table: SignalTable,
    logger: Arc<dyn Logger>,
}

impl SignalController {
    /// Start building a controller. Nothing is registered until `build()`.
    pub fn builder() -> SignalControllerBuilder {
        SignalControllerBuilder::default()
    }

    /// Drain signals delivered since the last reconciliation and apply
    /// them in delivery order. Never blocks. No-op in fallback mode.
    pub fn reconcile(&self) {
        if let Mode::Signals(source) = &self.mode {
            for signal in source.poll_pending() {
                self.handle_signal(signal);
            }
        }
    }

    /// Whether queries are proxied to the fallback controller.
    pub fn is_fallback(&self) -> bool {
        matches!(self.mode, Mode::Fallback(_))
    }

    pub fn stop_signals(&self) -> &BTreeSet<i32> {
        &self.stop_signals
    }

    pub fn pause_signals(&self) -> &BTreeSet<i32> {
        &self.pause_signals
    }

    pub fn resume_signals(&self) -> &BTreeSet<i32> {
        &self.resume_signals
    }

    fn action_for(&self, signal: i32) -> Option<Action> {
        if self.stop_signals.contains(&signal) {
            Some(Action::Stop)
        } else if self.pause_signals.contains(&signal) {
            Some(Action::Pause)
        } else if self.resume_signals.contains(&signal) {
            Some(Action::Resume)
        } else {
            None
        }
    }

    fn handle_signal(&self, signal: i32) {
        let Some(action) = self.action_for(signal) else {
            return;
        };

        let context = [
            ("signal", signal.to_string()),
            ("name", self.table.name_of(signal).unwrap_or("?").to_string()),
        ];

        match action {
            Action::Stop => {
                self.stopped.store(true, Ordering::SeqCst);
                self.logger.info("stop signal received", &context);
            }
            Action::Pause => {
                self.paused.store(true, Ordering::SeqCst);
                self.logger.info("pause signal received", &context);
            }
            Action::Resume => {
                self.paused.store(false, Ordering::SeqCst);
                self.logger.info("resume signal received", &context);
            }
        }
    }
}

impl Controller for SignalController {
    fn should_stop(&self) -> bool {
        match &self.mode {
            Mode::Fallback(fallback) => fallback.should_stop(),
            Mode::Signals(_) => {
                self.reconcile();
                self.stopped.load(Ordering::SeqCst)
            }
        }
    }

    fn should_pause(&self) -> bool {
        match &self.mode {
            Mode::Fallback(fallback) => fallback.should_pause(),
            Mode::Signals(_) => {
                self.reconcile();
                self.paused.load(Ordering::SeqCst)
            }
        }
    }
}

/// Builder for [`SignalController`].
///
/// Defaults: empty signal sets, the OS signal source, the platform signal
/// table, no fallback, and [`TracingLogger`].
#[derive(Default)]
pub struct SignalControllerBuilder {
    stop: Vec<SignalSpec>,
    pause: Vec<SignalSpec>,
    resume: Vec<SignalSpec>,
    fallback: Option<Box<dyn Controller>>,
    logger: Option<Arc<dyn Logger>>,
    source: Option<Arc<dyn SignalSource>>,
    table: Option<SignalTable>,
}

impl SignalControllerBuilder {
    /// Signals that stop the host.
    pub fn stop<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SignalSpec>,
    {
        self.stop.extend(signals.into_iter().map(Into::into));
        self
    }

    /// Signals that pause the host.
    pub fn pause<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SignalSpec>,
    {
        self.pause.extend(signals.into_iter().map(Into::into));
        self
    }

    /// Signals that resume a paused host.
    pub fn resume<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SignalSpec>,
    {
        self.resume.extend(signals.into_iter().map(Into::into));
        self
    }

    /// Controller to proxy to when the signal facility is unavailable.
    pub fn fallback(mut self, controller: impl Controller + 'static) -> Self {
        self.fallback = Some(Box::new(controller));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Signal facility to register with and drain from.
    pub fn source(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Name table used to resolve symbolic signal names.
    pub fn table(mut self, table: SignalTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Validate the configuration and register handlers.
    ///
    /// # Errors
    /// - `InvalidConfiguration` for unknown names, non-positive numbers or
    ///   overlapping sets.
    /// - `RegistrationFailed` when the facility rejects a signal.
    /// - `FacilityUnavailable` when there is no facility and no fallback.
    pub fn build(self) -> Result<SignalController, ControlError> {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger) as Arc<dyn Logger>);
        let table = self.table.unwrap_or_else(SignalTable::platform);

        logger.info(
            "initializing signal controller",
            &[
                ("stop", render_specs(&self.stop)),
                ("pause", render_specs(&self.pause)),
                ("resume", render_specs(&self.resume)),
            ],
        );

        let stop_signals = resolve_all(&table, &self.stop, logger.as_ref())?;
        let pause_signals = resolve_all(&table, &self.pause, logger.as_ref())?;
        let resume_signals = resolve_all(&table, &self.resume, logger.as_ref())?;

        ensure_disjoint(("stop", &stop_signals), ("pause", &pause_signals), logger.as_ref())?;
        ensure_disjoint(("stop", &stop_signals), ("resume", &resume_signals), logger.as_ref())?;
        ensure_disjoint(("pause", &pause_signals), ("resume", &resume_signals), logger.as_ref())?;

        let signal_source = self
            .source
            .unwrap_or_else(|| Arc::new(OsSignalSource::new()) as Arc<dyn SignalSource>);

        let mode = if signal_source.is_available() {
            let all: BTreeSet<i32> = stop_signals
                .iter()
                .chain(&pause_signals)
                .chain(&resume_signals)
                .copied()
                .collect();
            for signal in all {
                if let Err(e) = signal_source.register(signal) {
                    logger.error(
                        "failed to register signal handler",
                        &[("signal", signal.to_string()), ("error", e.to_string())],
                    );
                    return Err(ControlError::RegistrationFailed { signal, source: e });
                }
            }
            Mode::Signals(signal_source)
        } else {
            match self.fallback {
                Some(fallback) => {
                    logger.warning(
                        "signal handling unavailable, delegating to fallback controller",
                        &[],
                    );
                    Mode::Fallback(fallback)
                }
                None => {
                    logger.error(
                        "signal handling unavailable and no fallback controller given",
                        &[],
                    );
                    return Err(ControlError::FacilityUnavailable);
                }
            }
        };

        Ok(SignalController {
            stop_signals,
            pause_signals,
            resume_signals,
            stopped: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            mode,
            table,
            logger,
        })
    }
}

fn resolve_all(
    table: &SignalTable,
    specs: &[SignalSpec],
    logger: &dyn Logger,
) -> Result<BTreeSet<i32>, ControlError> {
    specs
        .iter()
        .map(|spec| {
            table.resolve(spec).inspect_err(|e| {
                logger.error(&e.to_string(), &[("value", spec.to_string())]);
            })
        })
        .collect()
}

fn ensure_disjoint(
    (a_name, a): (&str, &BTreeSet<i32>),
    (b_name, b): (&str, &BTreeSet<i32>),
    logger: &dyn Logger,
) -> Result<(), ControlError> {
    match a.intersection(b).next() {
        None => Ok(()),
        Some(signal) => {
            let err = ControlError::invalid(
                signal.to_string(),
                format!("signal appears in both the {a_name} and {b_name} sets"),
            );
            logger.error(&err.to_string(), &[("signal", signal.to_string())]);
            Err(err)
        }
    }
}

fn render_specs(specs: &[SignalSpec]) -> String {
    let names: Vec<String> = specs.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(", "))
}
