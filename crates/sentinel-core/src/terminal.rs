//! In-fiction system terminal data: the per-case document tree and the
//! radio unit contact list.
//!
//! Read-mostly reference data. The file tree is generated once per case
//! from its actual contents, so browsing it in the terminal lines up with
//! the evidence log and suspect list; sizes are fabricated from text
//! lengths for flavor.

use sentinel_types::{CaseData, DispatchUnit, FileNode};

/// The static radio contact list shown on the dispatch terminal.
pub fn dispatch_units() -> Vec<DispatchUnit> {
    [
        ("1-ADAM-12", "PATROL", "ON PATROL", 460.125),
        ("2-ADAM-7", "PATROL", "RESPONDING", 460.275),
        ("3-LINCOLN-9", "PATROL", "AT STATION", 460.350),
        ("SAM-3", "SWAT", "STAGING", 465.500),
        ("KING-9", "K9", "ON PATROL", 462.950),
        ("AIR-1", "AIR", "GROUNDED", 470.000),
    ]
    .into_iter()
    .map(|(call_sign, unit_type, status, frequency_mhz)| DispatchUnit {
        call_sign: call_sign.to_owned(),
        unit_type: unit_type.to_owned(),
        status: status.to_owned(),
        frequency_mhz,
    })
    .collect()
}

/// Build the terminal document tree for a case.
///
/// Layout: a root directory named after the case number containing an
/// incident report, the scene photo, an `EVIDENCE` directory with one
/// file per logged entry, and a `SUSPECTS` directory with one dossier
/// per suspect.
pub fn case_file_tree(case: &CaseData) -> FileNode {
    let evidence_files = case
        .evidence
        .iter()
        .map(|e| {
            FileNode::file(
                format!("{}.txt", e.id.as_str().to_lowercase()),
                text_size(&e.description),
            )
        })
        .collect();

    let suspect_files = case
        .suspects
        .iter()
        .map(|s| {
            FileNode::file(
                format!(
                    "{}_{}.dat",
                    s.last_name.to_lowercase(),
                    s.id.as_str().to_lowercase()
                ),
                text_size(&s.notes),
            )
        })
        .collect();

    FileNode::directory(
        format!("CASE_{}", case.case_number),
        vec![
            FileNode::file("incident_report.txt", text_size(&case.description)),
            FileNode::file("scene_photo.jpg", 48_604),
            FileNode::directory("EVIDENCE", evidence_files),
            FileNode::directory("SUSPECTS", suspect_files),
        ],
    )
}

/// Fabricated on-disk size for a text document.
fn text_size(text: &str) -> u64 {
    // Pad short strings so even terse entries look like real documents.
    (text.len() as u64).saturating_mul(12).saturating_add(512)
}
