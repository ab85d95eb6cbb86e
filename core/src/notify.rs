//! Notification sink seam.
//!
//! Notifications are fire-and-forget: the controller never reads anything
//! back, and a sink must not block. Closures of the right shape are sinks,
//! which is what tests use to record them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(Severity, &str, &str) + Send + Sync,
{
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        self(severity, title, message)
    }
}

/// Sink that emits every notification as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        match severity {
            Severity::Error => tracing::error!(title, message, "notification"),
            Severity::Warning => tracing::warn!(title, message, "notification"),
            Severity::Success | Severity::Info => {
                tracing::info!(%severity, title, message, "notification")
            }
        }
    }
}
