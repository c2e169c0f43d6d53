//! Feature flag seam.
//!
//! Flag lookups gate behavior only; a broken flag provider must never break
//! a workflow, so the non-fallible accessor swallows provider errors and
//! reports the flag as disabled.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::warn;

/// Flag that routes publishing through the paid on-demand slot flow.
pub const LINKED_WEARABLES_PAYMENTS: &str = "linked-wearables-payments";

/// Application namespace a flag lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationName {
    Builder,
    Dapps,
}

impl ApplicationName {
    /// The namespace prefix used by flag providers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::Dapps => "dapps",
        }
    }
}

/// Error from a flag provider.
#[derive(Debug, thiserror::Error)]
#[error("Feature flag lookup failed: {0}")]
pub struct FlagError(pub String);

/// Provider of feature flags.
///
/// Implementors only supply `try_is_enabled`; callers go through
/// `is_enabled`, which defaults unknown or failed lookups to disabled.
pub trait FeatureFlags: Send + Sync {
    /// Look up a flag, surfacing provider failures.
    fn try_is_enabled(&self, app: ApplicationName, flag: &str) -> Result<bool, FlagError>;

    /// Look up a flag, treating any failure as disabled.
    fn is_enabled(&self, app: ApplicationName, flag: &str) -> bool {
        match self.try_is_enabled(app, flag) {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!(app = app.as_str(), flag, error = %e, "Flag lookup failed, defaulting to disabled");
                false
            }
        }
    }
}

/// Static in-memory flag provider.
///
/// Everything is disabled unless explicitly enabled.
pub struct StaticFlags {
    enabled: Mutex<HashSet<(ApplicationName, String)>>,
}

impl StaticFlags {
    /// Create a provider with every flag disabled.
    pub fn new() -> Self {
        Self {
            enabled: Mutex::new(HashSet::new()),
        }
    }

    /// Enable a flag.
    pub fn enable(self, app: ApplicationName, flag: impl Into<String>) -> Self {
        self.enabled.lock().unwrap().insert((app, flag.into()));
        self
    }
}

impl Default for StaticFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureFlags for StaticFlags {
    fn try_is_enabled(&self, app: ApplicationName, flag: &str) -> Result<bool, FlagError> {
        Ok(self
            .enabled
            .lock()
            .unwrap()
            .contains(&(app, flag.to_string())))
    }
}
