//! Supervisor verdict classification.
//!
//! The watch commander's memo comes back as free text in the session
//! language. Approval is detected by substring, so the downstream case
//! lifecycle never has to interpret prose: the raw memo and its
//! classification travel together as a [`Verdict`].

use sentinel_types::{Verdict, VerdictOutcome};

/// Substrings whose presence in a supervisor memo means approval.
///
/// The English markers match the memo heading the prompt asks for; the
/// Finnish marker covers the localized memo. Matching is case-sensitive
/// because the markers are headings, not sentences.
pub const APPROVAL_MARKERS: [&str; 3] = ["Warrant Authorized", "Authorized", "Hyväksyn"];

/// Classify a supervisor memo into a structured verdict.
///
/// Approved iff any approval marker appears anywhere in the text;
/// everything else, including empty text, is a denial.
pub fn classify_verdict(text: String) -> Verdict {
    let outcome = if APPROVAL_MARKERS.iter().any(|m| text.contains(m)) {
        VerdictOutcome::Approved
    } else {
        VerdictOutcome::Denied
    };

    Verdict { text, outcome }
}
