//! Runner configuration.
//!
//! [`RunnerConfig`] deserializes from any `serde` format with every field
//! optional, so a host can keep it in its own configuration file.

use serde::{Deserialize, Serialize};

/// Number of cases a randomized scenario runs by default.
pub const DEFAULT_PROPERTY_CASES: u32 = 100;

/// What happens to a scenario containing a step with no definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Fail the scenario (strict mode).
    Fail,
    /// Skip the scenario with a diagnostic (lenient mode).
    #[default]
    Skip,
}

/// Execution settings for a [`Runner`](super::Runner).
///
/// ```rust
/// use stepwire::runner::{RunnerConfig, UnresolvedPolicy};
///
/// let config: RunnerConfig =
///     serde_json::from_str(r#"{ "unresolved": "fail", "parallel": true }"#).expect("valid");
/// assert_eq!(config.unresolved, UnresolvedPolicy::Fail);
/// assert!(config.parallel);
/// assert_eq!(config.property_cases, 100);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Handling of steps nothing matches.
    pub unresolved: UnresolvedPolicy,
    /// Whether skipped scenarios make [`RunReport::is_success`] false.
    ///
    /// [`RunReport::is_success`]: super::RunReport::is_success
    pub skipped_fails_run: bool,
    /// Run scenarios on separate threads.
    pub parallel: bool,
    /// Keep running later steps after a step fails.
    pub continue_after_failure: bool,
    /// Cases per randomized scenario.
    pub property_cases: u32,
    /// Seed for randomized scenarios; `None` draws a fresh seed per run.
    pub property_seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::default(),
            skipped_fails_run: false,
            parallel: false,
            continue_after_failure: false,
            property_cases: DEFAULT_PROPERTY_CASES,
            property_seed: None,
        }
    }
}

impl RunnerConfig {
    /// Whether unresolved steps fail their scenario.
    #[must_use]
    pub fn is_strict(&self) -> bool { self.unresolved == UnresolvedPolicy::Fail }
}
