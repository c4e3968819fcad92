//! Generated-case parsing and validation.
//!
//! The service returns raw text (ideally JSON) describing a case. This
//! module extracts it, deserializes it against the wire schema, validates
//! the case invariants, and completes the suspect records into full
//! [`Citizen`] entries (the service only authors the investigation-relevant
//! fields; biometrics and contact data are fabricated here).
//!
//! Unlike conversational replies, a malformed case is never silently
//! repaired into something playable -- it is rejected with
//! [`GenError::InvalidCase`] so the session can abort the mode transition.

use rand::Rng;
use sentinel_types::{
    CaseData, CaseId, Citizen, CitizenId, Evidence, EvidenceId, EvidenceKind, Priority, Sex,
    Solution,
};
use serde::Deserialize;

use crate::error::GenError;

/// Fixed pool of scene image URLs; one is picked per generated case.
pub const SCENE_IMAGES: [&str; 8] = [
    "https://i.postimg.cc/BQXSX1zB/image.png",
    "https://i.postimg.cc/PJckm2cH/image.png",
    "https://i.postimg.cc/jdJpp6mR/image.png",
    "https://i.postimg.cc/85X8SZTs/image.png",
    "https://i.postimg.cc/MTnwXCPG/image.png",
    "https://i.postimg.cc/FKB5tPrh/image.png",
    "https://i.postimg.cc/sXgFqkdP/image.png",
    "https://i.postimg.cc/sgjtMFx8/image.png",
];

/// Blood type pool used when completing suspect records.
const BLOOD_TYPES: [&str; 4] = ["A+", "O+", "B-", "AB+"];

// ---------------------------------------------------------------------------
// Wire schema
// ---------------------------------------------------------------------------

/// The case document as authored by the service, before completion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCase {
    #[serde(rename = "type")]
    crime_type: String,
    title: String,
    case_number: String,
    description: String,
    location: String,
    priority: Priority,
    timestamp: String,
    suspects: Vec<RawSuspect>,
    evidence: Vec<RawEvidence>,
    correct_solution: RawSolution,
}

/// A suspect as authored by the service: identity plus hidden case logic.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuspect {
    id: String,
    first_name: String,
    last_name: String,
    age: u8,
    occupation: String,
    address: String,
    criminal_record: String,
    notes: String,
    is_guilty: bool,
    motive: String,
}

/// An evidence entry as authored by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvidence {
    id: String,
    #[serde(rename = "type")]
    kind: EvidenceKind,
    description: String,
    location: String,
    timestamp: String,
    #[serde(default)]
    related_suspect_id: Option<String>,
}

/// The ground-truth solution as authored by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSolution {
    guilty_suspect_id: String,
    reasoning: String,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a raw service response into a validated [`CaseData`].
///
/// Attempts multiple recovery strategies if the raw text is not clean JSON:
/// 1. Direct `serde_json` deserialization
/// 2. Extract JSON from markdown code blocks
/// 3. Strip trailing commas and retry
///
/// # Errors
///
/// Returns [`GenError::Parse`] if no strategy yields valid JSON, or
/// [`GenError::InvalidCase`] if the parsed case violates its invariants.
pub fn parse_case(raw: &str, rng: &mut impl Rng) -> Result<CaseData, GenError> {
    let parsed = try_parse(raw)?;
    validate_case(&parsed)?;
    Ok(complete_case(parsed, rng))
}

/// Attempt to parse the response through multiple recovery strategies.
fn try_parse(raw: &str) -> Result<RawCase, GenError> {
    let trimmed = raw.trim();

    // Strategy 1: direct parse
    if let Ok(parsed) = serde_json::from_str::<RawCase>(trimmed) {
        return Ok(parsed);
    }

    // Strategy 2: extract from markdown code block
    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<RawCase>(json_str)
    {
        return Ok(parsed);
    }

    // Strategy 3: strip trailing commas and retry
    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(parsed) = serde_json::from_str::<RawCase>(&cleaned) {
        return Ok(parsed);
    }

    // Surface the direct-parse error; it carries the most useful detail.
    match serde_json::from_str::<RawCase>(trimmed) {
        Err(e) => Err(GenError::Parse(format!("case JSON rejected: {e}"))),
        Ok(parsed) => Ok(parsed),
    }
}

/// Check the case invariants before the document is trusted.
///
/// A violation here means the external service broke its contract; the
/// case is rejected rather than installed.
fn validate_case(raw: &RawCase) -> Result<(), GenError> {
    if raw.suspects.is_empty() {
        return Err(GenError::InvalidCase("case has no suspects".to_owned()));
    }

    let guilty: Vec<&RawSuspect> = raw.suspects.iter().filter(|s| s.is_guilty).collect();
    if guilty.len() != 1 {
        return Err(GenError::InvalidCase(format!(
            "expected exactly 1 guilty suspect, found {}",
            guilty.len()
        )));
    }

    if raw.evidence.is_empty() {
        return Err(GenError::InvalidCase("case has no evidence".to_owned()));
    }

    let guilty_id = guilty.first().map(|s| s.id.as_str()).unwrap_or_default();
    if raw.correct_solution.guilty_suspect_id != guilty_id {
        return Err(GenError::InvalidCase(format!(
            "solution names {} but the guilty suspect is {guilty_id}",
            raw.correct_solution.guilty_suspect_id
        )));
    }

    Ok(())
}

/// Complete the raw document into a full [`CaseData`].
///
/// Issues a fresh case id, picks a scene image, and fabricates the
/// biometric and contact fields the service does not author. Map
/// coordinates stay at zero; the session assigns them when the suspects
/// are merged into the roster.
fn complete_case(raw: RawCase, rng: &mut impl Rng) -> CaseData {
    let case_id = CaseId::new();

    let image_idx = rng.random_range(0..SCENE_IMAGES.len());
    let image_url = SCENE_IMAGES
        .get(image_idx)
        .copied()
        .unwrap_or(SCENE_IMAGES[0])
        .to_owned();

    let suspects = raw
        .suspects
        .into_iter()
        .map(|s| complete_suspect(s, case_id, rng))
        .collect();

    let evidence = raw
        .evidence
        .into_iter()
        .map(|e| Evidence {
            id: EvidenceId::from(e.id),
            kind: e.kind,
            description: e.description,
            location: e.location,
            timestamp: e.timestamp,
            related_suspect_id: e.related_suspect_id.map(CitizenId::from),
        })
        .collect();

    CaseData {
        id: case_id,
        case_number: raw.case_number,
        crime_type: raw.crime_type,
        title: raw.title,
        description: raw.description,
        location: raw.location,
        image_url,
        priority: raw.priority,
        timestamp: raw.timestamp,
        suspects,
        evidence,
        correct_solution: Solution {
            guilty_suspect_id: CitizenId::from(raw.correct_solution.guilty_suspect_id),
            reasoning: raw.correct_solution.reasoning,
        },
    }
}

/// Flesh a service-authored suspect out into a full citizen record.
fn complete_suspect(s: RawSuspect, case_id: CaseId, rng: &mut impl Rng) -> Citizen {
    let sex = if rng.random_bool(0.5) { Sex::Male } else { Sex::Female };
    let blood_idx = rng.random_range(0..BLOOD_TYPES.len());
    let avatar_url = format!(
        "https://ui-avatars.com/api/?name={}+{}&background=random",
        s.first_name, s.last_name
    );

    Citizen {
        id: CitizenId::from(s.id),
        first_name: s.first_name,
        last_name: s.last_name,
        age: s.age,
        sex,
        occupation: s.occupation,
        address: s.address,
        ssn: format!(
            "{}-{}-{}",
            rng.random_range(100..999_u32),
            rng.random_range(10..99_u32),
            rng.random_range(1000..9999_u32)
        ),
        phone: format!(
            "555-{}-{}",
            rng.random_range(100..999_u32),
            rng.random_range(1000..9999_u32)
        ),
        height: format!(
            "{}'{}\"",
            rng.random_range(5..=6_u32),
            rng.random_range(0..11_u32)
        ),
        weight: format!("{} lbs", rng.random_range(140..240_u32)),
        blood_type: BLOOD_TYPES.get(blood_idx).copied().unwrap_or("O+").to_owned(),
        relationships: vec![String::from("Unknown")],
        criminal_record: s.criminal_record,
        notes: s.notes,
        avatar_url,
        x: 0.0,
        y: 0.0,
        suspect_in_case: Some(case_id),
        is_guilty: Some(s.is_guilty),
        motive: Some(s.motive),
    }
}

// ---------------------------------------------------------------------------
// Raw-text recovery helpers
// ---------------------------------------------------------------------------

/// Extract JSON from a markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text
        .find("```json")
        .map(|i| skip_fence_line(text, i.checked_add(7).unwrap_or(i)))
        .or_else(|| {
            text.find("```")
                .map(|i| skip_fence_line(text, i.checked_add(3).unwrap_or(i)))
        })?;

    let remaining = text.get(start..)?;
    let end = remaining.find("```")?;
    remaining.get(..end).map(str::trim)
}

/// Advance past the newline that terminates a code-fence marker.
fn skip_fence_line(text: &str, after_tag: usize) -> usize {
    text.get(after_tag..)
        .and_then(|s| s.find('\n'))
        .and_then(|nl| after_tag.checked_add(nl))
        .and_then(|pos| pos.checked_add(1))
        .unwrap_or(after_tag)
}

/// Strip trailing commas before closing braces and brackets (common LLM error).
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut i = 0;
    while i < len {
        let c = chars.get(i).copied().unwrap_or(' ');
        if c == ',' {
            // Look ahead past whitespace for } or ]
            let mut j = i.checked_add(1).unwrap_or(i);
            while j < len && chars.get(j).copied().unwrap_or(' ').is_whitespace() {
                j = j.checked_add(1).unwrap_or(j);
            }
            let next = chars.get(j).copied().unwrap_or(' ');
            if next == '}' || next == ']' {
                // Skip this comma
                i = i.checked_add(1).unwrap_or(i);
                continue;
            }
        }
        result.push(c);
        i = i.checked_add(1).unwrap_or(len);
    }

    result
}
