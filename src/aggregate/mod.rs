//! Cross-agent aggregation
//!
//! Fans one per-agent query out over every agent the directory knows and
//! folds the results:
//!
//! - Presence: agents with at least one matching row
//! - Value grouping: agents bucketed by a shared nested value
//! - Record listing: one record per agent, tagged with its identifier
//!
//! Agents are visited sequentially in directory order. An agent that no
//! longer exists when fetched is skipped; every other failure aborts the
//! aggregation. Validation happens once, before the fan-out.

mod fleet;
mod grouping;
mod listing;
mod presence;

pub use fleet::FleetAggregator;
pub use grouping::{Grouping, OS_GROUPING};
pub use listing::AGENT_ID_KEY;
pub use presence::AGENT_ID_FIELD;
