use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Configuration ────────────────────────────────────────────────────────────

/// Strategy for producing a finish when a limit is hit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EarlyStoppingMethod {
    /// Synthesize a canned finish without another decision-maker call.
    #[default]
    Force,
    /// Issue exactly one more decision-maker call, finish-only.
    Generate,
}

/// Limits applied once per completed iteration.
#[derive(Debug, Clone, Default)]
pub struct StoppingConfig {
    pub max_iterations: Option<u32>,
    pub max_execution_time: Option<Duration>,
    pub early_stopping_method: EarlyStoppingMethod,
}

// ── Policy ───────────────────────────────────────────────────────────────────

/// Which limit ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationLimit,
    TimeLimit,
}

/// Pure stop predicate: either configured limit suffices (logical OR).
///
/// Callers sample the monotonic clock once per completed iteration and pass
/// the elapsed time in; the policy never looks at the clock itself.
pub fn should_stop(
    iterations: u32,
    elapsed: Duration,
    config: &StoppingConfig,
) -> Option<StopReason> {
    if config
        .max_iterations
        .is_some_and(|limit| iterations >= limit)
    {
        return Some(StopReason::IterationLimit);
    }
    if config
        .max_execution_time
        .is_some_and(|limit| elapsed >= limit)
    {
        return Some(StopReason::TimeLimit);
    }
    None
}
