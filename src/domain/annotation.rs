use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Annotation event shown on the dashboard timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    /// Should be a precise, meaningful text
    pub description: String,
    /// Trigger an email-send request
    pub send_email: bool,
    /// Let a user confirm the annotation
    pub confirmation_needed: bool,
}

impl Annotation {
    pub fn new<Tz: TimeZone>(
        timestamp: DateTime<Tz>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.with_timezone(&Utc),
            severity,
            description: description.into(),
            send_email: false,
            confirmation_needed: false,
        }
    }

    pub fn with_email(mut self) -> Self {
        self.send_email = true;
        self
    }

    pub fn with_confirmation(mut self) -> Self {
        self.confirmation_needed = true;
        self
    }
}
