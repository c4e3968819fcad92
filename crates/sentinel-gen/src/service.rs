//! The generative-service adapter.
//!
//! [`GenerativeService`] is the live implementation: it renders a prompt,
//! sends it to the configured LLM backend, and translates the response
//! into typed data. [`ScriptedService`] is a deterministic offline stand-in
//! with canned responses, used in tests and when no backend is configured.
//! [`GenerativeClient`] dispatches between them by enum, matching the
//! backend dispatch in [`crate::llm`].

use rand::Rng;
use sentinel_types::{
    CallSpeaker, CallTurn, CaseData, Citizen, CitizenId, Difficulty, HelperTurn, Language, Verdict,
};
use tracing::{debug, info, warn};

use crate::config::GenConfig;
use crate::error::GenError;
use crate::llm::{LlmBackend, create_backend};
use crate::parse::parse_case;
use crate::prompt::{PromptEngine, RenderedPrompt};
use crate::verdict::classify_verdict;

/// Per-language response instruction passed to every template.
fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::En => "Respond in English.",
        Language::Fi => "Vastaa suomeksi (respond in Finnish).",
    }
}

/// Difficulty shaping passed to the case template.
fn difficulty_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Rookie => "Make the evidence obvious and include no red herrings.",
        Difficulty::Officer => "Keep the case straightforward with light misdirection.",
        Difficulty::Detective => {
            "Require cross-referencing suspect statements against the evidence."
        }
        Difficulty::Lieutenant => "Use subtle evidence and include deliberate red herrings.",
        Difficulty::Captain => {
            "Use contradictory statements and minimal direct evidence; guilt must be inferred."
        }
    }
}

// ---------------------------------------------------------------------------
// Live service
// ---------------------------------------------------------------------------

/// Live adapter talking to a configured LLM backend.
pub struct GenerativeService {
    backend: LlmBackend,
    prompts: PromptEngine,
}

impl GenerativeService {
    /// Build the service from configuration: backend plus prompt templates.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Template`] if any prompt template is missing.
    pub fn new(config: &GenConfig) -> Result<Self, GenError> {
        let backend = create_backend(&config.backend);
        let prompts = PromptEngine::new(&config.templates_dir)?;
        info!(backend = backend.name(), "generative service ready");
        Ok(Self { backend, prompts })
    }

    /// Generate and validate a new case.
    ///
    /// The response is parsed, checked against the case invariants, and
    /// completed into a full [`CaseData`]. A response that violates the
    /// invariants is rejected, never repaired.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Backend`] on transport failure,
    /// [`GenError::Parse`] on unusable output, and
    /// [`GenError::InvalidCase`] on an invariant violation.
    pub async fn generate_case(
        &self,
        language: Language,
        difficulty: Difficulty,
        rng: &mut (impl Rng + Send),
    ) -> Result<CaseData, GenError> {
        let user = self.prompts.render(
            "case",
            &serde_json::json!({
                "language_instruction": language_instruction(language),
                "difficulty_instruction": difficulty_instruction(difficulty),
            }),
        )?;
        let prompt = RenderedPrompt::structured(
            "You are the scenario engine of a police dispatch training simulator. \
             You output only JSON matching the requested schema.",
            user,
        );

        debug!(?difficulty, "requesting case generation");
        let raw = self.backend.complete(&prompt).await?;
        let case = parse_case(&raw, rng)?;
        info!(case_number = %case.case_number, suspects = case.suspects.len(), "case generated");
        Ok(case)
    }

    /// Produce the callee's next line in a phone call.
    ///
    /// The callee roleplays a suspect (with hidden guilt, motive, and
    /// notes as context) when the call targets a suspect of the active
    /// case, or a confused ordinary citizen otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Backend`] on transport failure.
    pub async fn converse(
        &self,
        callee: &Citizen,
        case: Option<&CaseData>,
        history: &[CallTurn],
        message: &str,
        language: Language,
    ) -> Result<String, GenError> {
        let is_suspect = case.is_some_and(|c| c.suspect(&callee.id).is_some());
        let user = self.prompts.render(
            "call",
            &serde_json::json!({
                "callee_name": callee.full_name(),
                "occupation": callee.occupation,
                "is_suspect": is_suspect,
                "is_guilty": callee.is_guilty.unwrap_or(false),
                "motive": callee.motive.as_deref().unwrap_or(""),
                "notes": callee.notes,
                "case_title": case.map(|c| c.title.as_str()).unwrap_or(""),
                "case_description": case.map(|c| c.description.as_str()).unwrap_or(""),
                "history": transcript_context(history),
                "message": message,
                "language_instruction": language_instruction(language),
            }),
        )?;
        let prompt = RenderedPrompt::spoken(
            "You roleplay one citizen on a phone call with a police dispatcher. \
             Stay in character. Reply with spoken dialogue only, at most 30 words.",
            user,
        );

        self.backend.complete(&prompt).await.map(normalize_line)
    }

    /// Answer a CAD-assistant query about the active case.
    ///
    /// The assistant analyzes freely but is instructed never to state who
    /// is guilty.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Backend`] on transport failure.
    pub async fn ask_helper(
        &self,
        case: &CaseData,
        history: &[HelperTurn],
        query: &str,
        language: Language,
    ) -> Result<String, GenError> {
        let suspects: Vec<serde_json::Value> = case
            .suspects
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.full_name(),
                    "occupation": s.occupation,
                    "record": s.criminal_record,
                    "notes": s.notes,
                })
            })
            .collect();
        let evidence: Vec<serde_json::Value> = case
            .evidence
            .iter()
            .map(|e| {
                serde_json::json!({
                    "kind": e.kind,
                    "description": e.description,
                    "location": e.location,
                })
            })
            .collect();

        let user = self.prompts.render(
            "helper",
            &serde_json::json!({
                "case_title": case.title,
                "case_description": case.description,
                "suspects": suspects,
                "evidence": evidence,
                "history": history
                    .iter()
                    .map(|t| serde_json::json!({"speaker": t.speaker, "text": t.text}))
                    .collect::<Vec<_>>(),
                "query": query,
                "language_instruction": language_instruction(language),
            }),
        )?;
        let prompt = RenderedPrompt::spoken(
            "You are CAD ASSISTANT v4.0, a terse police computer aide. Analyze the case \
             facts when asked, but never state or imply which suspect is guilty.",
            user,
        );

        self.backend.complete(&prompt).await.map(normalize_line)
    }

    /// Submit an accusation for supervisor review and classify the memo.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Backend`] on transport failure and
    /// [`GenError::Parse`] if the accused id does not belong to the case.
    pub async fn review_submission(
        &self,
        case: &CaseData,
        accused_id: &CitizenId,
        notes: &str,
        language: Language,
    ) -> Result<Verdict, GenError> {
        let accused = case
            .suspect(accused_id)
            .ok_or_else(|| GenError::Parse(format!("accused {accused_id} is not a suspect")))?;
        let correct = case.correct_solution.guilty_suspect_id == *accused_id;

        let user = self.prompts.render(
            "review",
            &serde_json::json!({
                "case_title": case.title,
                "accused_name": accused.full_name(),
                "guilty_name": case.guilty_suspect().map(Citizen::full_name).unwrap_or_default(),
                "correct": correct,
                "reasoning": case.correct_solution.reasoning,
                "notes": notes,
                "language_instruction": language_instruction(language),
            }),
        )?;
        let prompt = RenderedPrompt::spoken(
            "You are the watch commander reviewing an arrest warrant request. Write a short \
             memo. If the accusation names the actual culprit, begin with 'Warrant Authorized' \
             (in Finnish, include the word 'Hyv\u{e4}ksyn'); otherwise deny it and hint at what \
             the evidence actually shows.",
            user,
        );

        let text = self.backend.complete(&prompt).await?;
        let verdict = classify_verdict(text);
        if !correct && verdict.outcome == sentinel_types::VerdictOutcome::Approved {
            // The supervisor contradicting ground truth is worth a trace,
            // but the memo still stands as issued.
            warn!(accused = %accused_id, "supervisor approved a wrong accusation");
        }
        Ok(verdict)
    }
}

/// Map a transcript onto the template context shape.
fn transcript_context(history: &[CallTurn]) -> Vec<serde_json::Value> {
    history
        .iter()
        .map(|t| {
            serde_json::json!({
                "speaker": match t.speaker {
                    CallSpeaker::Dispatch => "DISPATCHER",
                    CallSpeaker::Citizen => "CALLEE",
                },
                "text": t.text,
            })
        })
        .collect()
}

/// Strip quotes and surrounding whitespace models tend to wrap dialogue in.
fn normalize_line(raw: String) -> String {
    raw.trim().trim_matches('"').trim().to_owned()
}

// ---------------------------------------------------------------------------
// Scripted service
// ---------------------------------------------------------------------------

/// Deterministic offline stand-in with canned responses.
///
/// Used by tests and by the binary when no LLM backend is configured, so
/// the whole session remains playable without network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptedService;

impl ScriptedService {
    /// Return the fixed scripted case.
    ///
    /// The case passes the same validation pipeline as live output, so it
    /// exercises the full parse path.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the live service.
    pub fn generate_case(
        &self,
        language: Language,
        rng: &mut impl Rng,
    ) -> Result<CaseData, GenError> {
        let _ = language;
        parse_case(SCRIPTED_CASE_JSON, rng)
    }

    /// Canned phone-call reply.
    pub fn converse(&self, language: Language) -> String {
        match language {
            Language::En => {
                String::from("I already told the other officer everything I know.")
            }
            Language::Fi => String::from("Kerroin jo kaiken sille toiselle konstaapelille."),
        }
    }

    /// Canned assistant reply.
    pub fn ask_helper(&self) -> String {
        String::from("ANALYSIS: Cross-reference the forensic entry against suspect statements.")
    }

    /// Scripted supervisor review: approves iff the accusation is correct.
    pub fn review_submission(&self, case: &CaseData, accused_id: &CitizenId) -> Verdict {
        let correct = case.correct_solution.guilty_suspect_id == *accused_id;
        let text = if correct {
            String::from("MEMO: Warrant Authorized. The evidence chain supports the arrest.")
        } else {
            String::from("MEMO: Request denied. The evidence does not support this accusation.")
        };
        classify_verdict(text)
    }
}

/// The fixed case document served by [`ScriptedService`].
const SCRIPTED_CASE_JSON: &str = r#"{
    "type": "BURGLARY",
    "title": "459 Burglary - Pawn Shop",
    "caseNumber": "24-0417",
    "description": "Silent alarm at Crown Pawn, 114 Meridian Ave. Rear door forced. Display cases emptied of watches and rings. No witnesses on scene.",
    "location": "114 Meridian Ave",
    "priority": "HIGH",
    "timestamp": "02:13",
    "suspects": [
        {
            "id": "SUSP-1", "firstName": "Marcus", "lastName": "Hale",
            "age": 38, "occupation": "Locksmith", "address": "77 Birch Ct",
            "criminalRecord": "Prior burglary conviction, 2019",
            "notes": "Claims he was asleep at home. Lives alone.",
            "isGuilty": true, "motive": "Gambling debts to a street book"
        },
        {
            "id": "SUSP-2", "firstName": "Dana", "lastName": "Okafor",
            "age": 29, "occupation": "Night-shift courier", "address": "5 Wren St",
            "criminalRecord": "Clean",
            "notes": "Delivery log places her two blocks away at 02:05.",
            "isGuilty": false, "motive": "None apparent"
        },
        {
            "id": "SUSP-3", "firstName": "Pete", "lastName": "Sarkela",
            "age": 51, "occupation": "Former shop co-owner", "address": "230 Harbor Rd",
            "criminalRecord": "Civil dispute with current owner",
            "notes": "Bitter over the buyout. Was at a bar until 01:30 per bartender.",
            "isGuilty": false, "motive": "Resentment over the sale"
        }
    ],
    "evidence": [
        {
            "id": "EV-1", "type": "FORENSIC",
            "description": "Pick-gun marks on the rear door lock, professional tool.",
            "location": "Rear door", "timestamp": "02:40",
            "relatedSuspectId": "SUSP-1"
        },
        {
            "id": "EV-2", "type": "CAMERA",
            "description": "ATM camera across the street catches a van registered to Hale at 02:09.",
            "location": "Meridian Ave", "timestamp": "02:09",
            "relatedSuspectId": "SUSP-1"
        },
        {
            "id": "EV-3", "type": "WITNESS",
            "description": "Bartender confirms Sarkela left at 01:30, visibly drunk.",
            "location": "Anchor Bar", "timestamp": "03:10",
            "relatedSuspectId": "SUSP-3"
        }
    ],
    "correctSolution": {
        "guiltySuspectId": "SUSP-1",
        "reasoning": "Professional lock picking matches a locksmith's tools, and his van is on camera at the scene nine minutes before the alarm."
    }
}"#;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Dispatch between the live service and the scripted stand-in.
///
/// Enum dispatch rather than a trait object, for the same reason as
/// [`LlmBackend`]: async methods are not dyn-compatible.
pub enum GenerativeClient {
    /// Live LLM-backed service.
    Live(GenerativeService),
    /// Deterministic canned responses.
    Scripted(ScriptedService),
}

impl GenerativeClient {
    /// Build a client from the environment: live when LLM configuration is
    /// present, scripted otherwise.
    pub fn from_env() -> Self {
        match GenConfig::from_env().and_then(|c| GenerativeService::new(&c)) {
            Ok(service) => Self::Live(service),
            Err(e) => {
                warn!(error = %e, "no usable LLM backend, running scripted");
                Self::Scripted(ScriptedService)
            }
        }
    }

    /// Generate and validate a new case.
    ///
    /// # Errors
    ///
    /// See [`GenerativeService::generate_case`].
    pub async fn generate_case(
        &self,
        language: Language,
        difficulty: Difficulty,
        rng: &mut (impl Rng + Send),
    ) -> Result<CaseData, GenError> {
        match self {
            Self::Live(s) => s.generate_case(language, difficulty, rng).await,
            Self::Scripted(s) => s.generate_case(language, rng),
        }
    }

    /// Produce the callee's next line in a phone call.
    ///
    /// # Errors
    ///
    /// See [`GenerativeService::converse`].
    pub async fn converse(
        &self,
        callee: &Citizen,
        case: Option<&CaseData>,
        history: &[CallTurn],
        message: &str,
        language: Language,
    ) -> Result<String, GenError> {
        match self {
            Self::Live(s) => s.converse(callee, case, history, message, language).await,
            Self::Scripted(s) => Ok(s.converse(language)),
        }
    }

    /// Answer a CAD-assistant query about the active case.
    ///
    /// # Errors
    ///
    /// See [`GenerativeService::ask_helper`].
    pub async fn ask_helper(
        &self,
        case: &CaseData,
        history: &[HelperTurn],
        query: &str,
        language: Language,
    ) -> Result<String, GenError> {
        match self {
            Self::Live(s) => s.ask_helper(case, history, query, language).await,
            Self::Scripted(s) => Ok(s.ask_helper()),
        }
    }

    /// Submit an accusation for supervisor review.
    ///
    /// # Errors
    ///
    /// See [`GenerativeService::review_submission`].
    pub async fn review_submission(
        &self,
        case: &CaseData,
        accused_id: &CitizenId,
        notes: &str,
        language: Language,
    ) -> Result<Verdict, GenError> {
        match self {
            Self::Live(s) => s.review_submission(case, accused_id, notes, language).await,
            Self::Scripted(s) => {
                let _ = (notes, language);
                Ok(s.review_submission(case, accused_id))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sentinel_types::VerdictOutcome;

    use super::*;

    #[test]
    fn scripted_case_passes_validation() {
        let mut rng = SmallRng::seed_from_u64(3);
        let case = ScriptedService.generate_case(Language::En, &mut rng).unwrap();
        assert_eq!(case.guilty_count(), 1);
        assert_eq!(case.correct_solution.guilty_suspect_id.as_str(), "SUSP-1");
        assert!(!case.evidence.is_empty());
    }

    #[test]
    fn scripted_review_tracks_correctness() {
        let mut rng = SmallRng::seed_from_u64(3);
        let case = ScriptedService.generate_case(Language::En, &mut rng).unwrap();

        let right = ScriptedService.review_submission(&case, &CitizenId::from("SUSP-1"));
        assert_eq!(right.outcome, VerdictOutcome::Approved);

        let wrong = ScriptedService.review_submission(&case, &CitizenId::from("SUSP-2"));
        assert_eq!(wrong.outcome, VerdictOutcome::Denied);
    }

    #[test]
    fn scripted_converse_is_localized() {
        assert!(ScriptedService.converse(Language::En).contains("officer"));
        assert!(ScriptedService.converse(Language::Fi).contains("konstaapelille"));
    }

    #[test]
    fn normalize_line_strips_wrapping_quotes() {
        assert_eq!(
            normalize_line(String::from("  \"I was at work.\"  ")),
            "I was at work."
        );
        assert_eq!(normalize_line(String::from("Plain line")), "Plain line");
    }

    #[tokio::test]
    async fn client_dispatches_scripted() {
        let client = GenerativeClient::Scripted(ScriptedService);
        let mut rng = SmallRng::seed_from_u64(3);
        let case = client
            .generate_case(Language::En, Difficulty::Rookie, &mut rng)
            .await
            .unwrap();

        let verdict = client
            .review_submission(&case, &CitizenId::from("SUSP-1"), "He did it.", Language::En)
            .await
            .unwrap();
        assert_eq!(verdict.outcome, VerdictOutcome::Approved);

        let reply = client
            .converse(
                case.suspects.first().unwrap(),
                Some(&case),
                &[],
                "Where were you at 02:00?",
                Language::En,
            )
            .await
            .unwrap();
        assert!(!reply.is_empty());
    }
}
