//! Mission Lifecycle State Machine
//!
//! Defines the valid transitions for a delivery mission:
//!
//! ```text
//! pending -> assigned -> in-flight -> completed
//!     \_________\____________\______> failed
//! ```
//!
//! Terminal states (`completed`, `failed`) admit no further transitions.
//! Same-state updates on non-terminal missions are allowed as idempotent
//! refreshes. The legacy API accepted arbitrary status writes; this graph
//! deliberately tightens that.

use crate::MissionStatus;

/// Check if a transition from one mission status to another is valid
pub fn is_valid_transition(from: MissionStatus, to: MissionStatus) -> bool {
    use MissionStatus::*;

    match (from, to) {
        // Idempotent refresh, unless already terminal
        (a, b) if a == b => !a.is_terminal(),

        (Pending, Assigned) => true,
        (Assigned, InFlight) => true,
        (InFlight, Completed) => true,

        // Any live mission can be failed (cancellation, drone loss, abort)
        (Pending | Assigned | InFlight, Failed) => true,

        _ => false,
    }
}

/// All statuses reachable from the given one, excluding the identity refresh
pub fn valid_targets(from: MissionStatus) -> Vec<MissionStatus> {
    use MissionStatus::*;

    [Pending, Assigned, InFlight, Completed, Failed]
        .into_iter()
        .filter(|&to| to != from && is_valid_transition(from, to))
        .collect()
}
