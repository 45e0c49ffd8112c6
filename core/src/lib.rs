//! KillOnStart Core Library
//!
//! Coordinates termination of processes that were allowed to start before a
//! security policy finished loading ("kill-on-startup" events).
//! Provides functionality to:
//! - Track the flagged events of one review window as a session
//! - Gate termination on each event's grace period
//! - Kill each exact process instance at most once
//! - Expose a read-only projection for presentation layers
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Uses `/proc/<pid>/stat` start times as generation tokens
//! - Other platforms: termination reports `UnsupportedPlatform`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    EventKey, EventStatus, EventView, KillEvent, KillEventInput, TerminationOutcome,
    TerminationState,
};

// Re-export other commonly used types
pub use adapters::SignalTerminator;
pub use application::{Session, TerminationCoordinator, DEFAULT_CONFIRMATION_DISPLAY};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use ports::ProcessTerminatorPort;
