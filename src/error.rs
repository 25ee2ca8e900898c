/// Construction-time errors for controllers.
///
/// Queries never fail; everything that can go wrong happens while a
/// controller is being built, so the host loop refuses to start instead of
/// misbehaving mid-run.
use std::fmt;

/// Errors that can occur while constructing a controller.
#[derive(Debug)]
pub enum ControlError {
    /// A signal name did not resolve, a number was not positive, or the
    /// stop/pause/resume sets overlap.
    InvalidConfiguration { value: String, reason: String },
    /// The OS facility rejected handler registration for a signal.
    RegistrationFailed {
        signal: i32,
        source: std::io::Error,
    },
    /// No signal facility on this platform and no fallback controller given.
    FacilityUnavailable,
}

impl ControlError {
    pub(crate) fn invalid(value: impl Into<String>, reason: impl Into<String>) -> Self {
        ControlError::InvalidConfiguration {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::InvalidConfiguration { value, reason } => {
                write!(f, "invalid signal configuration \"{}\": {}", value, reason)
            }
            ControlError::RegistrationFailed { signal, source } => {
                write!(
                    f,
                    "failed to register handler for signal {}: {}",
                    signal, source
                )
            }
            ControlError::FacilityUnavailable => {
                write!(
                    f,
                    "signal handling is not available on this platform and no fallback controller was given"
                )
            }
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlError::RegistrationFailed { source, .. } => Some(source),
            ControlError::InvalidConfiguration { .. } | ControlError::FacilityUnavailable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_configuration_display() {
        let err = ControlError::invalid("SIGBOGUS", "unknown signal name");
        assert_eq!(
            err.to_string(),
            "invalid signal configuration \"SIGBOGUS\": unknown signal name"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_registration_failed_exposes_source() {
        let err = ControlError::RegistrationFailed {
            signal: 9,
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "forbidden"),
        };
        assert!(err.to_string().contains("signal 9"));
        assert!(err.to_string().contains("forbidden"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_facility_unavailable_display() {
        let err = ControlError::FacilityUnavailable;
        assert!(err.to_string().contains("no fallback controller"));
    }
}
