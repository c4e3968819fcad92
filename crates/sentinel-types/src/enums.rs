//! Enumeration types for the Sentinel CAD dispatch simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Interface language chosen at session start. Never reset once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Language {
    /// English.
    En,
    /// Finnish (suomi).
    Fi,
}

/// Case difficulty chosen at session start, lowest to highest.
///
/// Difficulty only shapes the generation request (subtlety of evidence,
/// number of red herrings); every generated case still carries exactly one
/// guilty suspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// Obvious evidence, no red herrings.
    Rookie,
    /// Straightforward cases with light misdirection.
    Officer,
    /// Evidence requires cross-referencing suspects.
    Detective,
    /// Subtle evidence, deliberate red herrings.
    Lieutenant,
    /// Contradictory statements, minimal direct evidence.
    Captain,
}

impl Difficulty {
    /// All difficulty levels, lowest first (the selector order).
    pub const ALL: [Self; 5] = [
        Self::Rookie,
        Self::Officer,
        Self::Detective,
        Self::Lieutenant,
        Self::Captain,
    ];
}

/// Top-level session mode. The session state machine is the sole owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SessionMode {
    /// Choosing the interface language (2 options).
    LanguageSelect,
    /// Choosing the case difficulty (5 levels).
    DifficultySelect,
    /// Dispatch queue and city map.
    Dashboard,
    /// Case-solving workspace for the active case.
    ActiveCase,
    /// Citizen database search screen.
    CitizenDb,
}

// ---------------------------------------------------------------------------
// Dispatch and cases
// ---------------------------------------------------------------------------

/// Incident priority, lowest to highest.
///
/// Queue replenishment only synthesizes `Medium` and `High`; `Immediate`
/// appears on generated cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Routine, no response deadline.
    Low,
    /// Standard response.
    Medium,
    /// Urgent response.
    High,
    /// Lights-and-sirens.
    Immediate,
}

/// Category of a logged evidence entry. Immutable after case generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum EvidenceKind {
    /// Physical traces: prints, fibers, residue.
    Forensic,
    /// Phone records, device data, transactions.
    Digital,
    /// Statements from people on scene.
    Witness,
    /// CCTV or dashcam footage.
    Camera,
}

/// Biological sex on a citizen record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// Phone-call connection state.
///
/// Legal transitions: `Idle -> Ringing -> Connected -> Ended`, plus
/// `Ended -> Ringing` when a new call is initiated. `Ringing` is always
/// visited before `Connected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CallState {
    /// No call in progress.
    #[default]
    Idle,
    /// Dialing; a timed transition to `Connected` is pending.
    Ringing,
    /// Live call; messages can be exchanged.
    Connected,
    /// Call finished; transcript remains until the next call resets it.
    Ended,
}

/// Speaker on a phone-call transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum CallSpeaker {
    /// The player, speaking as the dispatch operator.
    Dispatch,
    /// The simulated callee.
    Citizen,
}

/// Speaker on an AI-helper transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum HelperSpeaker {
    /// The player's query.
    User,
    /// The CAD assistant's reply.
    Assistant,
}

// ---------------------------------------------------------------------------
// Emergencies
// ---------------------------------------------------------------------------

/// Subtype of a timed emergency interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum EmergencyKind {
    /// Pick one of a small set of labeled options; exactly one is correct.
    Decision,
    /// Acquire a radio signal via the frequency scanner before time runs out.
    Tracking,
}

/// How an emergency was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EmergencyOutcome {
    /// Correct option chosen, or signal locked in time.
    Success,
    /// Incorrect option chosen.
    Failure,
    /// Countdown reached zero while unresolved; the incident escalated.
    TimedOut,
}

// ---------------------------------------------------------------------------
// Supervisor review
// ---------------------------------------------------------------------------

/// Structured classification of a supervisor verdict.
///
/// The external service returns free text; the adapter translates it to
/// this enum at the single point where untyped text crosses into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum VerdictOutcome {
    /// The warrant was authorized.
    Approved,
    /// The warrant was denied.
    Denied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_low_to_immediate() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert!(Priority::High < Priority::Immediate);
    }

    #[test]
    fn priority_serializes_screaming_snake() {
        let json = serde_json::to_string(&Priority::High).ok();
        assert_eq!(json.as_deref(), Some("\"HIGH\""));
    }

    #[test]
    fn evidence_kind_roundtrips_service_shape() {
        let parsed: Result<EvidenceKind, _> = serde_json::from_str("\"FORENSIC\"");
        assert_eq!(parsed.ok(), Some(EvidenceKind::Forensic));
    }

    #[test]
    fn difficulty_selector_has_five_levels() {
        assert_eq!(Difficulty::ALL.len(), 5);
        assert_eq!(Difficulty::ALL.first().copied(), Some(Difficulty::Rookie));
        assert_eq!(Difficulty::ALL.last().copied(), Some(Difficulty::Captain));
    }
}
