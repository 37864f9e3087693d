//! Light states and the aggregation of job verdicts into one state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual state shown by a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    /// Every monitored job is ok.
    Ok,
    /// Some jobs are not ok, but all of them are claimed.
    Claimed,
    /// At least one job is not ok and unclaimed.
    Alert,
}

impl LightState {
    /// Lowercase name used in logs and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Claimed => "claimed",
            Self::Alert => "alert",
        }
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health verdict of one job at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobVerdict {
    pub name: String,
    /// Job is acceptable under the alert tolerance
    pub ok: bool,
    /// The last completed build was claimed
    pub claimed: bool,
}

/// Fold per-job verdicts into the state a light should show.
pub fn aggregate_verdicts<'a, I>(verdicts: I) -> LightState
where
    I: IntoIterator<Item = &'a JobVerdict>,
{
    let mut state = LightState::Ok;
    for verdict in verdicts.into_iter().filter(|v| !v.ok) {
        if !verdict.claimed {
            return LightState::Alert;
        }
        state = LightState::Claimed;
    }
    state
}
