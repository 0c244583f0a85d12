//! Storage collaborators
//!
//! The query layer does not own persistence. It consumes two narrow
//! contracts:
//!
//! - `InventoryStore`: load one agent's rows for one table, already
//!   filtered, searched, sorted and paginated
//! - `AgentDirectory`: enumerate known agents in a deterministic order and
//!   report each agent's platform family
//!
//! `MemoryInventory` implements both over a JSON fleet snapshot.

mod contract;
mod errors;
mod memory;

pub use contract::{AgentDirectory, InventoryStore, LoadRequest, Loaded};
pub use errors::{StoreError, StoreResult};
pub use memory::{AgentSnapshot, FleetSnapshot, MemoryInventory};
