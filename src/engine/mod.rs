//! Round orchestration: the coordinator that owns the global counters and
//! routes stakes, votes and claims, the notifications it emits, and a
//! thread-safe handle around it.

mod coordinator;
mod events;
mod shared;

pub use coordinator::{EngineConfig, RoundCoordinator};
pub use events::{ClaimReceipt, Notification};
pub use shared::SharedEngine;
