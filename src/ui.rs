// src/ui.rs

use std::io::Write;
use std::sync::Mutex;

use crate::utils::text::sanitize;

/// A blocking message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Where screens send their alerts.
pub trait Alerts: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Prints alerts to stdout.
#[derive(Debug, Default)]
pub struct ConsoleAlerts;

impl Alerts for ConsoleAlerts {
    fn alert(&self, alert: Alert) {
        let mut out = std::io::stdout().lock();
        let _ = if alert.message.is_empty() {
            writeln!(out, "[!] {}", sanitize(&alert.title))
        } else {
            writeln!(
                out,
                "[!] {}: {}",
                sanitize(&alert.title),
                sanitize(&alert.message)
            )
        };
    }
}

/// Keeps every alert in memory.
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Alert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.all().into_iter().map(|a| a.title).collect()
    }

    pub fn last(&self) -> Option<Alert> {
        self.alerts.lock().ok().and_then(|a| a.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.clear();
        }
    }
}

impl Alerts for RecordingAlerts {
    fn alert(&self, alert: Alert) {
        tracing::debug!("alert: {} / {}", alert.title, alert.message);
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert);
        }
    }
}
