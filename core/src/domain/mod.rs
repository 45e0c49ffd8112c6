//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod event;
mod state;

// Re-export all domain types
pub use event::{EventKey, KillEvent, KillEventInput};
pub use state::{EventStatus, EventView, TerminationOutcome, TerminationState};
