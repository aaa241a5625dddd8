//! Severity labels, ranking and normalization.
//!
//! Every comparison of two severities in the crate goes through [`Severity::rank`],
//! which imposes the fixed order
//! `critical > high > medium > low > info > clean`. Labels that cannot be
//! recognized normalize to [`Severity::Unknown`] and rank alongside `clean`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Normalized vulnerability severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    /// Informational finding (`info`, `information`, `informational`)
    Info,
    /// Sentinel for "no direct vulnerabilities"
    Clean,
    /// Absent, empty or unrecognized label
    #[default]
    Unknown,
}

impl Severity {
    /// All severities that can be attached to a vulnerability, worst first.
    pub const REPORTABLE: [Self; 6] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Info,
        Self::Unknown,
    ];

    /// Numeric rank (higher = more severe).
    #[must_use]
    pub const fn rank(&self) -> i8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Info => 0,
            Self::Clean | Self::Unknown => -1,
        }
    }

    /// Normalize a raw label.
    ///
    /// Absent or empty input maps to [`Severity::Unknown`].
    #[must_use]
    pub fn normalize(label: Option<&str>) -> Self {
        label.map_or(Self::Unknown, Self::from_label)
    }

    fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "info" | "information" | "informational" => Self::Info,
            "clean" => Self::Clean,
            _ => Self::Unknown,
        }
    }

    /// Band a CVSS base score into a severity.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Critical
        } else if score >= 7.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::Info
        }
    }

    /// Strictly worse than `other`. Equal ranks are not worse.
    #[must_use]
    pub const fn is_worse_than(&self, other: &Self) -> bool {
        self.rank() > other.rank()
    }

    /// Lowercase display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
            Self::Clean => "clean",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        Self::from_label(s)
    }
}

/// Comparator putting the most severe first. Used with stable sorts so that
/// equal ranks keep their original order.
#[must_use]
pub fn severity_ordering(a: &Severity, b: &Severity) -> Ordering {
    b.rank().cmp(&a.rank())
}

/// Highest-ranked severity in `severities`, starting from [`Severity::Clean`].
///
/// Only strictly higher ranks replace the running value, so a list made only
/// of `unknown` severities stays `clean`.
pub fn max_severity<'a>(severities: impl IntoIterator<Item = &'a Severity>) -> Severity {
    severities.into_iter().fold(Severity::Clean, |current, s| {
        if s.is_worse_than(&current) {
            *s
        } else {
            current
        }
    })
}
