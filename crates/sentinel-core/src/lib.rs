//! Simulation core for the Sentinel CAD dispatch console.
//!
//! Everything here is synchronous and deterministic: randomness arrives
//! through injected `rand::Rng` sources and time arrives as explicit tick
//! and timestamp inputs, so every invariant is unit-testable without
//! timers. The `sentinel-app` binary owns the tokio runtime that drives
//! these state machines; `sentinel-gen` owns the external-service calls
//! whose results feed into them.

pub mod config;
pub mod conversation;
pub mod emergency;
pub mod error;
pub mod fabricator;
pub mod queue;
pub mod roster;
pub mod scanner;
pub mod session;
pub mod terminal;

pub use config::SentinelConfig;
pub use conversation::{CallSession, HelperSession};
pub use emergency::EmergencyScheduler;
pub use error::{ConfigError, SessionError};
pub use queue::DispatchQueue;
pub use roster::CitizenRoster;
pub use scanner::{FrequencyScan, LockAttempt, signal_strength};
pub use session::Session;
