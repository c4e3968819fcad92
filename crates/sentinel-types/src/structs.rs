//! Core entity structs for the Sentinel CAD dispatch simulation.
//!
//! Field shapes follow the generative-service wire contract where one
//! exists (cases, suspects, evidence); everything else is owned by the
//! session core. Timestamps that exist purely for display (`"21:04"`,
//! incident times) stay as strings — the simulation never does arithmetic
//! on them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    CallSpeaker, EmergencyKind, EmergencyOutcome, EvidenceKind, HelperSpeaker, Priority, Sex,
    VerdictOutcome,
};
use crate::ids::{CaseId, CitizenId, DispatchCallId, EmergencyId, EvidenceId};

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

/// A citizen record: identity, biometrics, contact, and map position.
///
/// Created in bulk by the fabricator at session start, or appended when a
/// generated case's suspects are merged into the roster. The roster only
/// grows; records are never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Citizen {
    /// Unique display identifier.
    pub id: CitizenId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years.
    pub age: u8,
    /// Recorded sex.
    pub sex: Sex,
    /// Occupation text.
    pub occupation: String,
    /// Street address.
    pub address: String,
    /// Social security number (fabricated).
    pub ssn: String,
    /// Contact phone number.
    pub phone: String,
    /// Height as display text (`5'11"`).
    pub height: String,
    /// Weight as display text (`180 lbs`).
    pub weight: String,
    /// Blood type.
    pub blood_type: String,
    /// Free-text relationship list.
    pub relationships: Vec<String>,
    /// Criminal record text, or `"Clean"`.
    pub criminal_record: String,
    /// Free-text notes. For suspects this carries the alibi or initial
    /// statement the conversation engine injects as hidden context.
    pub notes: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Map coordinate X, percentage-normalized 0–100.
    pub x: f64,
    /// Map coordinate Y, percentage-normalized 0–100.
    pub y: f64,
    /// Set when the citizen was generated as a suspect in a case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspect_in_case: Option<CaseId>,
    /// Ground-truth guilt marker; populated only for generated suspects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guilty: Option<bool>,
    /// Hidden motive text; populated only for generated suspects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motive: Option<String>,
}

impl Citizen {
    /// Full display name, given name first.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ---------------------------------------------------------------------------
// Dispatch queue
// ---------------------------------------------------------------------------

/// A pending incident awaiting response on the dispatch queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DispatchCall {
    /// Monotonic numeric id (millisecond-derived).
    pub id: DispatchCallId,
    /// Incident type text (`"SILENT ALARM"`).
    pub call_type: String,
    /// Incident priority.
    pub priority: Priority,
    /// Display time of the call (`"21:04"`).
    pub time: String,
    /// Map coordinate X, 0–100.
    pub x: f64,
    /// Map coordinate Y, 0–100.
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

/// An immutable logged evidence entry. Never mutated after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Evidence {
    /// Unique evidence identifier within the case.
    pub id: EvidenceId,
    /// Evidence category.
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    /// What was found.
    pub description: String,
    /// Where it was found.
    pub location: String,
    /// When it was logged (display text).
    pub timestamp: String,
    /// The suspect this entry points at, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_suspect_id: Option<CitizenId>,
}

/// The ground-truth solution of a generated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Solution {
    /// The guilty suspect's citizen id.
    pub guilty_suspect_id: CitizenId,
    /// Why the evidence points at them.
    pub reasoning: String,
}

/// A generated investigation case.
///
/// Invariant: exactly one suspect has `is_guilty == Some(true)`, at every
/// difficulty. The adapter validates this before a case is installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CaseData {
    /// Unique case identifier, issued locally.
    pub id: CaseId,
    /// Display case number (`"24-0381"`).
    pub case_number: String,
    /// Crime type (`"BURGLARY"`).
    #[serde(rename = "type")]
    pub crime_type: String,
    /// Short incident title (`"459 Burglary"`).
    pub title: String,
    /// The initial 911 transcript or field report.
    pub description: String,
    /// Address or location name.
    pub location: String,
    /// Scene image URL, picked from a fixed pool.
    pub image_url: String,
    /// Incident priority.
    pub priority: Priority,
    /// Time of incident (display text, 24h).
    pub timestamp: String,
    /// Suspects, as full citizen records with guilt markers.
    pub suspects: Vec<Citizen>,
    /// Logged evidence entries.
    pub evidence: Vec<Evidence>,
    /// Ground-truth solution.
    pub correct_solution: Solution,
}

impl CaseData {
    /// Number of suspects marked guilty. A well-formed case has exactly 1.
    pub fn guilty_count(&self) -> usize {
        self.suspects
            .iter()
            .filter(|s| s.is_guilty == Some(true))
            .count()
    }

    /// Look up a suspect by citizen id.
    pub fn suspect(&self, id: &CitizenId) -> Option<&Citizen> {
        self.suspects.iter().find(|s| &s.id == id)
    }

    /// The suspect marked guilty, if the invariant holds.
    pub fn guilty_suspect(&self) -> Option<&Citizen> {
        self.suspects.iter().find(|s| s.is_guilty == Some(true))
    }
}

// ---------------------------------------------------------------------------
// Transcripts
// ---------------------------------------------------------------------------

/// One turn of a phone-call transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CallTurn {
    /// Who spoke.
    pub speaker: CallSpeaker,
    /// What they said.
    pub text: String,
}

/// One turn of the AI-helper transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HelperTurn {
    /// Who spoke.
    pub speaker: HelperSpeaker,
    /// What they said.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Emergencies
// ---------------------------------------------------------------------------

/// A labeled choice on a decision emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmergencyOption {
    /// Option label (`"SEND SWAT TEAM"`).
    pub label: String,
    /// Whether choosing this option resolves the emergency successfully.
    pub correct: bool,
}

/// Lifecycle phase of an active emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EmergencyPhase {
    /// Countdown running, awaiting player action.
    Active,
    /// Resolved; the result screen is shown for a fixed dwell before
    /// the emergency clears.
    ShowingResult(EmergencyOutcome),
}

/// A timed interrupt overlaying the current session mode.
///
/// At most one emergency exists at a time; the scheduler refuses to create
/// another while one is active or a case is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Emergency {
    /// Unique identifier.
    pub id: EmergencyId,
    /// Decision or tracking subtype.
    pub kind: EmergencyKind,
    /// Headline shown on the overlay.
    pub title: String,
    /// Situation description.
    pub description: String,
    /// Labeled options; empty for tracking emergencies.
    pub options: Vec<EmergencyOption>,
    /// Countdown duration in seconds.
    pub duration_secs: u32,
    /// Seconds remaining on the countdown.
    pub remaining_secs: u32,
    /// Current lifecycle phase.
    pub phase: EmergencyPhase,
}

// ---------------------------------------------------------------------------
// Supervisor review
// ---------------------------------------------------------------------------

/// A supervisor verdict: the raw memo text plus its structured
/// classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Verdict {
    /// The free-text memo returned by the supervisor.
    pub text: String,
    /// Approved or denied, classified at the adapter boundary.
    pub outcome: VerdictOutcome,
}

// ---------------------------------------------------------------------------
// Terminal reference data
// ---------------------------------------------------------------------------

/// A field unit on the radio contact list (static catalog).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DispatchUnit {
    /// Radio call sign (`"1-ADAM-12"`).
    pub call_sign: String,
    /// Unit type (`"PATROL"`, `"SWAT"`, `"K9"`, `"AIR"`).
    pub unit_type: String,
    /// Current status text.
    pub status: String,
    /// Radio frequency in megahertz.
    pub frequency_mhz: f64,
}

/// Payload of a node in the in-fiction terminal file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FileNodeKind {
    /// A directory; children live in [`FileNode::children`].
    Directory,
    /// A file with a fabricated size.
    File {
        /// Display size in bytes.
        size_bytes: u64,
    },
}

/// A node in the per-case generated document tree.
///
/// Ownership makes the tree well-formed by construction: every non-root
/// node has exactly one parent and cycles cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FileNode {
    /// Node name (`"EVIDENCE"`, `"incident_report.txt"`).
    pub name: String,
    /// Directory or file payload.
    pub kind: FileNodeKind,
    /// Child nodes; empty for files.
    pub children: Vec<FileNode>,
}

impl FileNode {
    /// Create a directory node.
    pub fn directory(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            kind: FileNodeKind::Directory,
            children,
        }
    }

    /// Create a file node.
    pub fn file(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            kind: FileNodeKind::File { size_bytes },
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1_usize.saturating_add(self.children.iter().map(Self::node_count).sum::<usize>())
    }

    /// Find a child node by slash-separated path relative to this node.
    pub fn find(&self, path: &str) -> Option<&Self> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.iter().find(|c| c.name == segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_suspect(id: &str, guilty: bool) -> Citizen {
        Citizen {
            id: CitizenId::from(id),
            first_name: String::from("Jane"),
            last_name: String::from("Doe"),
            age: 34,
            sex: Sex::Female,
            occupation: String::from("Clerk"),
            address: String::from("12 Oak St"),
            ssn: String::from("123-45-6789"),
            phone: String::from("555-123-4567"),
            height: String::from("5'6\""),
            weight: String::from("150 lbs"),
            blood_type: String::from("O+"),
            relationships: vec![String::from("Unknown")],
            criminal_record: String::from("Clean"),
            notes: String::from("Claims she was at work."),
            avatar_url: String::new(),
            x: 10.0,
            y: 20.0,
            suspect_in_case: None,
            is_guilty: Some(guilty),
            motive: Some(String::from("Debt")),
        }
    }

    fn sample_case() -> CaseData {
        CaseData {
            id: CaseId::new(),
            case_number: String::from("24-0381"),
            crime_type: String::from("BURGLARY"),
            title: String::from("459 Burglary"),
            description: String::from("Window forced at the rear."),
            location: String::from("88 Elm St"),
            image_url: String::new(),
            priority: Priority::High,
            timestamp: String::from("21:40"),
            suspects: vec![sample_suspect("S-1", false), sample_suspect("S-2", true)],
            evidence: vec![Evidence {
                id: EvidenceId::from("EV-1"),
                kind: EvidenceKind::Forensic,
                description: String::from("Glove print on sill."),
                location: String::from("Rear window"),
                timestamp: String::from("21:45"),
                related_suspect_id: Some(CitizenId::from("S-2")),
            }],
            correct_solution: Solution {
                guilty_suspect_id: CitizenId::from("S-2"),
                reasoning: String::from("Print matches work gloves."),
            },
        }
    }

    #[test]
    fn guilty_count_and_lookup() {
        let case = sample_case();
        assert_eq!(case.guilty_count(), 1);
        assert_eq!(
            case.guilty_suspect().map(|s| s.id.as_str()),
            Some("S-2")
        );
        assert!(case.suspect(&CitizenId::from("S-1")).is_some());
        assert!(case.suspect(&CitizenId::from("S-9")).is_none());
    }

    #[test]
    fn evidence_kind_uses_service_field_name() {
        let case = sample_case();
        let json = serde_json::to_value(&case).unwrap_or_default();
        let kind = json
            .get("evidence")
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("type"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(kind, Some("FORENSIC"));
    }

    #[test]
    fn file_tree_counts_and_finds() {
        let tree = FileNode::directory(
            "CAD",
            vec![
                FileNode::directory(
                    "EVIDENCE",
                    vec![FileNode::file("ev_1.txt", 1024)],
                ),
                FileNode::file("incident_report.txt", 2048),
            ],
        );
        assert_eq!(tree.node_count(), 4);
        assert!(tree.find("EVIDENCE/ev_1.txt").is_some());
        assert!(tree.find("EVIDENCE/missing.txt").is_none());
        assert_eq!(
            tree.find("incident_report.txt").map(|n| &n.kind),
            Some(&FileNodeKind::File { size_bytes: 2048 })
        );
    }

    #[test]
    fn citizen_camel_case_wire_shape() {
        let suspect = sample_suspect("S-1", false);
        let json = serde_json::to_value(&suspect).unwrap_or_default();
        assert!(json.get("firstName").is_some());
        assert!(json.get("criminalRecord").is_some());
        // Optional case markers serialize only when present.
        assert!(json.get("suspectInCase").is_none());
    }
}
