use crate::chain::ChainController;
use crate::controller::NullController;
use crate::error::ControlError;
use crate::file::FileController;
use crate::log::Logger;
use crate::signal::{OsSignalSource, SignalSource, SignalSpec};
use crate::signal_controller::SignalController;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Top-level configuration, typically loaded from `control.toml`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ControlConfig {
    pub signals: SignalConfig,
    pub files: FileConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub enabled: bool,
    pub stop: Vec<SignalSpec>,
    pub pause: Vec<SignalSpec>,
    pub resume: Vec<SignalSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub stop_file: Option<PathBuf>,
    pub pause_file: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stop: vec!["SIGTERM".into(), "SIGINT".into()],
            pause: vec!["SIGTSTP".into()],
            resume: vec!["SIGCONT".into()],
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            stop_file: Some(PathBuf::from("STOP")),
            pause_file: None,
        }
    }
}

/// Errors that can occur while loading the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Load config from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ControlConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(ControlConfig::default());
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

impl ControlConfig {
    /// Build the controller chain this config describes, using the OS
    /// signal facility.
    pub fn build_controller(
        &self,
        logger: Arc<dyn Logger>,
    ) -> Result<ChainController, ControlError> {
        self.build_controller_with(Arc::new(OsSignalSource::new()), logger)
    }

    /// Build the chain against an explicit signal source.
    ///
    /// Members in order: the signal controller (if enabled, falling back to
    /// "never stop" where signals are unavailable), then the file controller
    /// (if any marker file is configured).
    pub fn build_controller_with(
        &self,
        source: Arc<dyn SignalSource>,
        logger: Arc<dyn Logger>,
    ) -> Result<ChainController, ControlError> {
        let mut chain = ChainController::default();

        if self.signals.enabled {
            let signals = SignalController::builder()
                .stop(self.signals.stop.iter().cloned())
                .pause(self.signals.pause.iter().cloned())
                .resume(self.signals.resume.iter().cloned())
                .fallback(NullController)
                .source(source)
                .logger(Arc::clone(&logger))
                .build()?;
            chain.push(signals);
        }

        if self.files.stop_file.is_some() || self.files.pause_file.is_some() {
            chain.push(
                FileController::new(self.files.stop_file.clone(), self.files.pause_file.clone())
                    .with_logger(logger),
            );
        }

        Ok(chain)
    }
}
