//! Resolver configuration.
//!
//! Sentinel reference-data names and the fallback posture for unresolved
//! lookups. Loaded from environment variables with defaults matching the
//! curated reference data.

use serde::{Deserialize, Serialize};

/// What the resolver does when reference data cannot be resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Widen to the whole catalog
    FailOpen,
    /// Narrow to nothing
    FailClosed,
}

impl FallbackPolicy {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackPolicy::FailOpen => "open",
            FallbackPolicy::FailClosed => "closed",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "fail_open" | "fail-open" => Some(FallbackPolicy::FailOpen),
            "closed" | "fail_closed" | "fail-closed" => Some(FallbackPolicy::FailClosed),
            _ => None,
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::FailOpen
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Posture for unresolved lookups.
    pub fallback: FallbackPolicy,

    /// Subspecialty name that grants catalog-wide visibility.
    pub generalist_name: String,

    /// Specialty name remapped to the foot-and-ankle subspecialty.
    pub podiatry_name: String,

    /// Specialty names searched for the remap target, in order.
    pub orthopaedic_names: Vec<String>,

    /// Subspecialty name used as the remap target.
    pub foot_and_ankle_name: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::FailOpen,
            generalist_name: "generalist".to_string(),
            podiatry_name: "podiatry".to_string(),
            orthopaedic_names: vec![
                "orthopaedic surgery".to_string(),
                "orthopedic surgery".to_string(),
            ],
            foot_and_ankle_name: "foot and ankle".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LIBRARY_VISIBILITY_FALLBACK`: `open` or `closed` (default: open)
    /// - `LIBRARY_GENERALIST_NAME`: (default: generalist)
    /// - `LIBRARY_PODIATRY_NAME`: (default: podiatry)
    /// - `LIBRARY_ORTHOPAEDIC_NAMES`: comma-separated, searched in order
    ///   (default: orthopaedic surgery,orthopedic surgery)
    /// - `LIBRARY_FOOT_AND_ANKLE_NAME`: (default: foot and ankle)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        let fallback = match std::env::var("LIBRARY_VISIBILITY_FALLBACK") {
            Ok(raw) => FallbackPolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unrecognized visibility fallback, using default");
                default.fallback
            }),
            Err(_) => default.fallback,
        };

        let orthopaedic_names = std::env::var("LIBRARY_ORTHOPAEDIC_NAMES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty())
            .unwrap_or(default.orthopaedic_names);

        Self {
            fallback,
            generalist_name: non_empty_var("LIBRARY_GENERALIST_NAME")
                .unwrap_or(default.generalist_name),
            podiatry_name: non_empty_var("LIBRARY_PODIATRY_NAME").unwrap_or(default.podiatry_name),
            orthopaedic_names,
            foot_and_ankle_name: non_empty_var("LIBRARY_FOOT_AND_ANKLE_NAME")
                .unwrap_or(default.foot_and_ankle_name),
        }
    }

    /// Set the fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
