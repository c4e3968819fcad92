//! Shared type definitions for the Sentinel CAD dispatch simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Sentinel workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the console renderer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers for entities
//! - [`enums`] -- Enumeration types (modes, priorities, call states)
//! - [`structs`] -- Core entity structs (citizens, calls, cases, emergencies)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    CallSpeaker, CallState, Difficulty, EmergencyKind, EmergencyOutcome, EvidenceKind,
    HelperSpeaker, Language, Priority, SessionMode, Sex, VerdictOutcome,
};
pub use ids::{CaseId, CitizenId, DispatchCallId, EmergencyId, EvidenceId};
pub use structs::{
    CallTurn, CaseData, Citizen, DispatchCall, DispatchUnit, Emergency, EmergencyOption,
    EmergencyPhase, Evidence, FileNode, FileNodeKind, HelperTurn, Solution, Verdict,
};
