/// Structured logging seam used by controllers.
///
/// Controllers log at registration, on every state transition and on
/// construction errors. The default sink forwards to `tracing`; `NullLogger`
/// discards everything.
use std::fmt::Write as _;

/// Key/value pairs attached to a log message.
pub type Context<'a> = &'a [(&'a str, String)];

/// Minimal structured log sink.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str, context: Context<'_>);
    fn warning(&self, message: &str, context: Context<'_>);
    fn error(&self, message: &str, context: Context<'_>);
}

/// Forwards to the `tracing` macros, rendering context into one field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, context: Context<'_>) {
        tracing::info!(context = %render(context), "{message}");
    }

    fn warning(&self, message: &str, context: Context<'_>) {
        tracing::warn!(context = %render(context), "{message}");
    }

    fn error(&self, message: &str, context: Context<'_>) {
        tracing::error!(context = %render(context), "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str, _context: Context<'_>) {}
    fn warning(&self, _message: &str, _context: Context<'_>) {}
    fn error(&self, _message: &str, _context: Context<'_>) {}
}

/// Render context as `key=value` pairs separated by spaces.
fn render(context: Context<'_>) -> String {
    let mut out = String::new();
    for (i, (key, value)) in context.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{key}={value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_context() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_multiple_pairs() {
        let ctx = [("signal", "15".to_string()), ("name", "SIGTERM".to_string())];
        assert_eq!(render(&ctx), "signal=15 name=SIGTERM");
    }

    #[test]
    fn test_tracing_and_null_loggers_accept_messages() {
        let ctx = [("k", "v".to_string())];
        for logger in [&TracingLogger as &dyn Logger, &NullLogger] {
            logger.info("info", &ctx);
            logger.warning("warning", &ctx);
            logger.error("error", &ctx);
        }
    }
}
