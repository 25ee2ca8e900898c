//! Cooperative process lifecycle control.
//!
//! A long-running loop asks its [`Controller`] once per iteration whether it
//! should stop or pause. Controllers answer from OS signals
//! ([`SignalController`]), marker files ([`FileController`]), or any
//! combination of them ([`ChainController`]).
//!
//! ```no_run
//! use process_control::{Controller, SignalController};
//!
//! let controller = SignalController::builder()
//!     .stop(["SIGTERM", "SIGINT"])
//!     .pause(["SIGTSTP"])
//!     .resume(["SIGCONT"])
//!     .build()?;
//!
//! while !controller.should_stop() {
//!     if controller.should_pause() {
//!         std::thread::sleep(std::time::Duration::from_millis(200));
//!         continue;
//!     }
//!     // one unit of work
//! }
//! # Ok::<(), process_control::ControlError>(())
//! ```

pub mod chain;
pub mod config;
pub mod controller;
pub mod error;
pub mod file;
pub mod log;
pub mod signal;
pub mod signal_controller;

#[cfg(test)]
mod testing;

pub use chain::ChainController;
pub use config::{load_config, ConfigError, ControlConfig};
pub use controller::{Controller, ControllerAware, NullController};
pub use error::ControlError;
pub use file::FileController;
pub use log::{Logger, NullLogger, TracingLogger};
pub use signal::{OsSignalSource, SignalSource, SignalSpec, SignalTable};
pub use signal_controller::{SignalController, SignalControllerBuilder};
