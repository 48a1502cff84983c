//! Mission lifecycle management
//!
//! This module handles:
//! - Creating delivery missions and validating their payloads
//! - Assigning operators and enforcing the status transition graph
//! - Computing operator earnings when a mission completes
//! - Listing all and active missions for the API boundary

mod earnings;
mod store;

pub use earnings::compute_earnings;
pub use store::{EarningsEvent, MissionError, MissionStore};
