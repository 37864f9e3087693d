//! Light state color mapping for CLI output.
//!
//! Coloring is disabled automatically by `console` when stdout is not a terminal.

use console::{style, StyledObject};

use crate::domain::models::LightState;

/// Green for ok, yellow for claimed, red for alert.
pub fn colorize_state(state: LightState) -> StyledObject<&'static str> {
    match state {
        LightState::Ok => style(state.as_str()).green().bold(),
        LightState::Claimed => style(state.as_str()).yellow(),
        LightState::Alert => style(state.as_str()).red().bold(),
    }
}

/// Ok/failing marker for a single job verdict.
pub fn colorize_verdict(ok: bool, claimed: bool) -> StyledObject<&'static str> {
    match (ok, claimed) {
        (true, _) => style("ok").green(),
        (false, true) => style("claimed").yellow(),
        (false, false) => style("failing").red(),
    }
}
