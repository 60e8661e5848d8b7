//! Weather alert model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert impact tier, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Also the neutral tier for unrecognized values
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parse an upstream severity string. Unknown values map to [`Severity::Low`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" | "severe" | "extreme" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            "low" | "minor" => Severity::Low,
            other => {
                tracing::debug!("Unrecognized alert severity '{}', treating as low", other);
                Severity::Low
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weather alert relevant to a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Alert category such as "rain" or "wind"
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Alert {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            kind: Some(kind.into()),
        }
    }
}
