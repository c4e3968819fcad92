//! The session state machine.
//!
//! Sole owner of the top-level mode and of every mutable state slice: the
//! citizen roster, the dispatch queue, the emergency slot, the phone call,
//! and the AI helper. All mutation funnels through the named transition
//! functions here, so each slice has a single writer.
//!
//! Async work (case generation, conversation replies, supervisor review)
//! is started by the app layer against tokens issued here; completions
//! re-present their token and are discarded when the context they belong
//! to has been superseded.

use rand::Rng;
use sentinel_types::{
    CaseData, Citizen, CitizenId, Difficulty, DispatchUnit, FileNode, Language, SessionMode,
    Verdict, VerdictOutcome,
};
use tracing::{info, warn};

use crate::config::SentinelConfig;
use crate::conversation::{CallSession, HelperSession};
use crate::emergency::EmergencyScheduler;
use crate::error::SessionError;
use crate::queue::DispatchQueue;
use crate::roster::CitizenRoster;
use crate::terminal;

/// Memo text substituted when the supervisor request fails. Classifies as
/// denied, which is the correct degraded behavior.
pub const SUPERVISOR_ERROR_LINE: &str = "ERROR: Supervisor line unreachable.";

/// The top-level session.
pub struct Session {
    mode: SessionMode,
    language: Option<Language>,
    difficulty: Option<Difficulty>,

    loading_case: bool,
    case_generation: u64,
    active_case: Option<CaseData>,
    file_tree: Option<FileNode>,

    submitting: bool,
    verdict: Option<Verdict>,

    roster: CitizenRoster,
    queue: DispatchQueue,
    scheduler: EmergencyScheduler,
    call: CallSession,
    helper: HelperSession,
    units: Vec<DispatchUnit>,
}

impl Session {
    /// A fresh session: language select, seeded roster, seeded queue.
    pub fn new(config: &SentinelConfig, rng: &mut impl Rng) -> Self {
        Self {
            mode: SessionMode::LanguageSelect,
            language: None,
            difficulty: None,
            loading_case: false,
            case_generation: 0,
            active_case: None,
            file_tree: None,
            submitting: false,
            verdict: None,
            roster: CitizenRoster::seeded(rng, config.roster.seed_count),
            queue: DispatchQueue::seeded(config.queue.floor),
            scheduler: EmergencyScheduler::new(&config.emergency),
            call: CallSession::new(),
            helper: HelperSession::new(),
            units: terminal::dispatch_units(),
        }
    }

    // -----------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------

    /// Choose the interface language. Only legal once, at session start.
    pub fn choose_language(&mut self, language: Language) -> Result<(), SessionError> {
        if self.mode != SessionMode::LanguageSelect {
            return Err(SessionError::InvalidMode(self.mode));
        }
        self.language = Some(language);
        self.mode = SessionMode::DifficultySelect;
        info!(?language, "language selected");
        Ok(())
    }

    /// Choose the case difficulty. Only legal once, after the language.
    pub fn choose_difficulty(&mut self, difficulty: Difficulty) -> Result<(), SessionError> {
        if self.mode != SessionMode::DifficultySelect {
            return Err(SessionError::InvalidMode(self.mode));
        }
        self.difficulty = Some(difficulty);
        self.mode = SessionMode::Dashboard;
        info!(?difficulty, "difficulty selected");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Case lifecycle
    // -----------------------------------------------------------------

    /// Respond to a queued call: raise the loading gate and issue the
    /// token the generation completion must present. The dispatch queue
    /// is not consumed here; one entry pops when the case closes.
    pub fn begin_case_request(&mut self) -> Result<(u64, Language, Difficulty), SessionError> {
        if self.mode != SessionMode::Dashboard {
            return Err(SessionError::InvalidMode(self.mode));
        }
        if self.loading_case {
            return Err(SessionError::GenerationInFlight);
        }
        let language = self.language.ok_or(SessionError::InvalidMode(self.mode))?;
        let difficulty = self.difficulty.ok_or(SessionError::InvalidMode(self.mode))?;

        self.loading_case = true;
        self.case_generation = self.case_generation.wrapping_add(1);
        Ok((self.case_generation, language, difficulty))
    }

    /// Install a validated generated case: position its suspects on the
    /// map, merge them into the roster, arm the helper, and enter
    /// `ActiveCase`. A stale token is discarded.
    pub fn install_case(&mut self, token: u64, mut case: CaseData, rng: &mut impl Rng) -> bool {
        if token != self.case_generation || !self.loading_case {
            warn!(token, "discarding stale case generation result");
            return false;
        }

        for suspect in &mut case.suspects {
            suspect.x = rng.random_range(0.0..100.0);
            suspect.y = rng.random_range(0.0..100.0);
        }
        self.roster.prepend(case.suspects.clone());

        if let Some(language) = self.language {
            self.helper.init(&case.case_number, language);
        }
        info!(case_number = %case.case_number, "case installed");
        self.file_tree = Some(terminal::case_file_tree(&case));
        self.active_case = Some(case);
        self.verdict = None;
        self.loading_case = false;
        self.mode = SessionMode::ActiveCase;
        true
    }

    /// Generation failed: clear the loading gate, stay on the dashboard.
    pub fn case_request_failed(&mut self, token: u64) -> bool {
        if token != self.case_generation || !self.loading_case {
            return false;
        }
        warn!("case generation failed, staying on dashboard");
        self.loading_case = false;
        true
    }

    /// Close the active case: drop it, end any call, pop the oldest
    /// dispatch entry, return to the dashboard. Deterministic no-op when
    /// no case is active.
    pub fn close_case(&mut self) {
        if self.active_case.is_none() {
            return;
        }
        self.active_case = None;
        self.file_tree = None;
        self.verdict = None;
        self.submitting = false;
        self.call.end();
        let popped = self.queue.pop_oldest();
        info!(popped = ?popped.map(|c| c.id.0), "case closed");
        self.mode = SessionMode::Dashboard;
    }

    // -----------------------------------------------------------------
    // Supervisor review
    // -----------------------------------------------------------------

    /// Submit the warrant request: validates the accused suspect and
    /// raises the submitting gate. The app layer runs the actual review
    /// call and reports back with the same token.
    pub fn begin_review(&mut self, accused_id: &CitizenId) -> Result<u64, SessionError> {
        if self.mode != SessionMode::ActiveCase {
            return Err(SessionError::InvalidMode(self.mode));
        }
        if self.submitting {
            return Err(SessionError::GenerationInFlight);
        }
        let case = self
            .active_case
            .as_ref()
            .ok_or(SessionError::InvalidMode(self.mode))?;
        if case.suspect(accused_id).is_none() {
            return Err(SessionError::UnknownCitizen(accused_id.as_str().to_owned()));
        }
        self.submitting = true;
        Ok(self.case_generation)
    }

    /// Record the supervisor's memo. Stale tokens (the case closed while
    /// the review was in flight) are discarded.
    pub fn record_verdict(&mut self, token: u64, verdict: Verdict) -> bool {
        if token != self.case_generation || !self.submitting {
            return false;
        }
        info!(outcome = ?verdict.outcome, "verdict recorded");
        self.verdict = Some(verdict);
        self.submitting = false;
        true
    }

    /// Review request failed: substitute the in-fiction error memo,
    /// which classifies as denied.
    pub fn review_failed(&mut self, token: u64) -> bool {
        self.record_verdict(
            token,
            Verdict {
                text: SUPERVISOR_ERROR_LINE.to_owned(),
                outcome: VerdictOutcome::Denied,
            },
        )
    }

    /// Acknowledge the memo and close the case.
    pub fn acknowledge_verdict(&mut self) {
        if self.verdict.is_some() {
            self.close_case();
        }
    }

    // -----------------------------------------------------------------
    // Citizen database
    // -----------------------------------------------------------------

    /// Open the citizen database screen from the dashboard.
    pub fn open_citizen_db(&mut self) -> Result<(), SessionError> {
        if self.mode != SessionMode::Dashboard {
            return Err(SessionError::InvalidMode(self.mode));
        }
        self.mode = SessionMode::CitizenDb;
        Ok(())
    }

    /// Return from the citizen database to the dashboard.
    pub fn close_citizen_db(&mut self) -> Result<(), SessionError> {
        if self.mode != SessionMode::CitizenDb {
            return Err(SessionError::InvalidMode(self.mode));
        }
        self.mode = SessionMode::Dashboard;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Phone calls
    // -----------------------------------------------------------------

    /// Initiate a call to a citizen (case suspect or roster entry).
    /// Returns the ring token for the delayed connect.
    pub fn initiate_call(&mut self, citizen_id: &CitizenId) -> Result<u64, SessionError> {
        let callee = self
            .active_case
            .as_ref()
            .and_then(|c| c.suspect(citizen_id))
            .or_else(|| self.roster.get(citizen_id))
            .cloned()
            .ok_or_else(|| SessionError::UnknownCitizen(citizen_id.as_str().to_owned()))?;
        Ok(self.call.initiate(callee))
    }

    /// Ring delay elapsed for the given call token.
    pub fn connect_call(&mut self, token: u64) -> bool {
        match self.language {
            Some(language) => self.call.connect(token, language),
            None => false,
        }
    }

    // -----------------------------------------------------------------
    // Emergencies
    // -----------------------------------------------------------------

    /// Emergency poll tick. Never spawns while a case is open or loading.
    pub fn poll_emergency(&mut self, rng: &mut impl Rng) -> bool {
        let case_open = self.active_case.is_some() || self.loading_case;
        self.scheduler.poll(rng, case_open).is_some()
    }

    // -----------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------

    /// Dispatch replenishment tick.
    pub fn replenish_queue(&mut self, rng: &mut impl Rng, now_ms: u64) {
        self.queue.replenish(rng, now_ms);
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current top-level mode.
    pub const fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Chosen language, once selected.
    pub const fn language(&self) -> Option<Language> {
        self.language
    }

    /// Chosen difficulty, once selected.
    pub const fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Whether a case generation request is in flight.
    pub const fn is_loading_case(&self) -> bool {
        self.loading_case
    }

    /// Whether a supervisor review is in flight.
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The active case, if any.
    pub const fn active_case(&self) -> Option<&CaseData> {
        self.active_case.as_ref()
    }

    /// Terminal document tree for the active case, if one is open.
    pub const fn file_tree(&self) -> Option<&FileNode> {
        self.file_tree.as_ref()
    }

    /// The radio unit contact list shown on the dispatch terminal.
    pub fn units(&self) -> &[DispatchUnit] {
        &self.units
    }

    /// The recorded verdict awaiting acknowledgement, if any.
    pub const fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// The citizen roster.
    pub const fn roster(&self) -> &CitizenRoster {
        &self.roster
    }

    /// The dispatch queue.
    pub const fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// The emergency scheduler.
    pub const fn emergencies(&self) -> &EmergencyScheduler {
        &self.scheduler
    }

    /// Mutable emergency scheduler, for option selection and ticks.
    pub const fn emergencies_mut(&mut self) -> &mut EmergencyScheduler {
        &mut self.scheduler
    }

    /// The phone-call session.
    pub const fn call(&self) -> &CallSession {
        &self.call
    }

    /// Mutable phone-call session, for message flow and teardown.
    pub const fn call_mut(&mut self) -> &mut CallSession {
        &mut self.call
    }

    /// The AI helper session.
    pub const fn helper(&self) -> &HelperSession {
        &self.helper
    }

    /// Mutable AI helper session, for query flow.
    pub const fn helper_mut(&mut self) -> &mut HelperSession {
        &mut self.helper
    }

    /// A clone of a citizen visible to the session, case suspects first.
    pub fn find_citizen(&self, id: &CitizenId) -> Option<Citizen> {
        self.active_case
            .as_ref()
            .and_then(|c| c.suspect(id))
            .or_else(|| self.roster.get(id))
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sentinel_types::{
        CallState, CaseId, Evidence, EvidenceId, EvidenceKind, Priority, Sex, Solution,
    };

    use super::*;

    fn session() -> (Session, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(20);
        let config = SentinelConfig::default();
        (Session::new(&config, &mut rng), rng)
    }

    fn onboarded() -> (Session, SmallRng) {
        let (mut s, rng) = session();
        s.choose_language(Language::En).unwrap();
        s.choose_difficulty(Difficulty::Detective).unwrap();
        (s, rng)
    }

    fn sample_case() -> CaseData {
        let suspect = |id: &str, guilty: bool| Citizen {
            id: CitizenId::from(id),
            first_name: String::from("Marcus"),
            last_name: String::from("Hale"),
            age: 38,
            sex: Sex::Male,
            occupation: String::from("Locksmith"),
            address: String::from("77 Birch Ct"),
            ssn: String::from("321-54-9876"),
            phone: String::from("555-321-7654"),
            height: String::from("5'10\""),
            weight: String::from("180 lbs"),
            blood_type: String::from("O+"),
            relationships: vec![String::from("Unknown")],
            criminal_record: String::from("Clean"),
            notes: String::from("Claims he was asleep."),
            avatar_url: String::new(),
            x: 0.0,
            y: 0.0,
            suspect_in_case: None,
            is_guilty: Some(guilty),
            motive: None,
        };
        CaseData {
            id: CaseId::new(),
            case_number: String::from("24-0417"),
            crime_type: String::from("BURGLARY"),
            title: String::from("459 Burglary"),
            description: String::from("Rear door forced."),
            location: String::from("114 Meridian Ave"),
            image_url: String::new(),
            priority: Priority::High,
            timestamp: String::from("02:13"),
            suspects: vec![suspect("SUSP-1", true), suspect("SUSP-2", false)],
            evidence: vec![Evidence {
                id: EvidenceId::from("EV-1"),
                kind: EvidenceKind::Forensic,
                description: String::from("Pick-gun marks."),
                location: String::from("Rear door"),
                timestamp: String::from("02:40"),
                related_suspect_id: None,
            }],
            correct_solution: Solution {
                guilty_suspect_id: CitizenId::from("SUSP-1"),
                reasoning: String::from("Tools match."),
            },
        }
    }

    #[test]
    fn onboarding_is_one_way() {
        let (mut s, _) = session();
        assert_eq!(s.mode(), SessionMode::LanguageSelect);
        assert!(s.choose_difficulty(Difficulty::Rookie).is_err());

        s.choose_language(Language::Fi).unwrap();
        assert_eq!(s.mode(), SessionMode::DifficultySelect);
        assert!(s.choose_language(Language::En).is_err(), "never reset");

        s.choose_difficulty(Difficulty::Captain).unwrap();
        assert_eq!(s.mode(), SessionMode::Dashboard);
        assert!(s.choose_difficulty(Difficulty::Rookie).is_err());
        assert_eq!(s.language(), Some(Language::Fi));
        assert_eq!(s.difficulty(), Some(Difficulty::Captain));
    }

    #[test]
    fn roster_and_queue_are_seeded() {
        let (s, _) = session();
        assert_eq!(s.roster().len(), 200);
        assert_eq!(s.queue().len(), 5);
    }

    #[test]
    fn case_install_merges_suspects_and_positions_them() {
        let (mut s, mut rng) = onboarded();
        let before = s.roster().len();

        let (token, language, difficulty) = s.begin_case_request().unwrap();
        assert_eq!(language, Language::En);
        assert_eq!(difficulty, Difficulty::Detective);
        assert!(s.is_loading_case());
        // The gate blocks a second request.
        assert_eq!(s.begin_case_request(), Err(SessionError::GenerationInFlight));

        assert!(s.install_case(token, sample_case(), &mut rng));
        assert_eq!(s.mode(), SessionMode::ActiveCase);
        assert!(!s.is_loading_case());
        assert_eq!(s.roster().len(), before + 2);

        let installed = s.active_case().unwrap();
        for suspect in &installed.suspects {
            assert!((0.0..100.0).contains(&suspect.x));
            assert!((0.0..100.0).contains(&suspect.y));
        }
        // Helper was armed with the case banner.
        assert!(s.helper().transcript().first().unwrap().text.contains("24-0417"));
    }

    #[test]
    fn terminal_data_tracks_the_case_lifecycle() {
        let (mut s, mut rng) = onboarded();
        assert_eq!(s.units().len(), 6, "radio contact list is always up");
        assert!(s.file_tree().is_none());

        let (token, _, _) = s.begin_case_request().unwrap();
        assert!(s.install_case(token, sample_case(), &mut rng));

        let tree = s.file_tree().unwrap();
        assert_eq!(tree.name, "CASE_24-0417");
        assert!(tree.find("EVIDENCE/ev-1.txt").is_some());
        assert!(tree.find("SUSPECTS/hale_susp-1.dat").is_some());

        s.close_case();
        assert!(s.file_tree().is_none(), "tree is torn down with the case");
        assert_eq!(s.units().len(), 6);
    }

    #[test]
    fn failed_generation_stays_on_dashboard() {
        let (mut s, _) = onboarded();
        let (token, _, _) = s.begin_case_request().unwrap();
        s.case_request_failed(token);
        assert_eq!(s.mode(), SessionMode::Dashboard);
        assert!(!s.is_loading_case());
        assert!(s.active_case().is_none());
        // A new request is possible immediately.
        assert!(s.begin_case_request().is_ok());
    }

    #[test]
    fn stale_case_install_is_discarded() {
        let (mut s, mut rng) = onboarded();
        let (token, _, _) = s.begin_case_request().unwrap();
        s.case_request_failed(token);
        let (second, _, _) = s.begin_case_request().unwrap();

        assert!(!s.install_case(token, sample_case(), &mut rng));
        assert_eq!(s.mode(), SessionMode::Dashboard);
        assert!(s.install_case(second, sample_case(), &mut rng));
    }

    #[test]
    fn close_case_pops_queue_and_is_idempotent() {
        let (mut s, mut rng) = onboarded();
        let (token, _, _) = s.begin_case_request().unwrap();
        s.install_case(token, sample_case(), &mut rng);

        let queue_before = s.queue().len();
        s.close_case();
        assert_eq!(s.mode(), SessionMode::Dashboard);
        assert!(s.active_case().is_none());
        assert_eq!(s.queue().len(), queue_before - 1);

        // Closing again changes nothing.
        s.close_case();
        assert_eq!(s.queue().len(), queue_before - 1);
        assert_eq!(s.mode(), SessionMode::Dashboard);
    }

    #[test]
    fn review_flow_records_and_acknowledges() {
        let (mut s, mut rng) = onboarded();
        let (token, _, _) = s.begin_case_request().unwrap();
        s.install_case(token, sample_case(), &mut rng);

        assert!(matches!(
            s.begin_review(&CitizenId::from("NOBODY")),
            Err(SessionError::UnknownCitizen(_))
        ));

        let review = s.begin_review(&CitizenId::from("SUSP-1")).unwrap();
        assert!(s.is_submitting());
        assert_eq!(
            s.begin_review(&CitizenId::from("SUSP-1")),
            Err(SessionError::GenerationInFlight)
        );

        assert!(s.record_verdict(
            review,
            Verdict {
                text: String::from("Warrant Authorized."),
                outcome: VerdictOutcome::Approved,
            }
        ));
        assert!(!s.is_submitting());
        assert_eq!(s.verdict().unwrap().outcome, VerdictOutcome::Approved);

        s.acknowledge_verdict();
        assert_eq!(s.mode(), SessionMode::Dashboard);
        assert!(s.verdict().is_none());
    }

    #[test]
    fn failed_review_substitutes_denied_memo() {
        let (mut s, mut rng) = onboarded();
        let (token, _, _) = s.begin_case_request().unwrap();
        s.install_case(token, sample_case(), &mut rng);

        let review = s.begin_review(&CitizenId::from("SUSP-2")).unwrap();
        assert!(s.review_failed(review));
        let verdict = s.verdict().unwrap();
        assert_eq!(verdict.text, SUPERVISOR_ERROR_LINE);
        assert_eq!(verdict.outcome, VerdictOutcome::Denied);
        // The case is still open; the player may retry.
        assert_eq!(s.mode(), SessionMode::ActiveCase);
    }

    #[test]
    fn citizen_db_roundtrip_leaves_state_alone() {
        let (mut s, _) = onboarded();
        s.open_citizen_db().unwrap();
        assert_eq!(s.mode(), SessionMode::CitizenDb);
        assert!(s.open_citizen_db().is_err());

        s.close_citizen_db().unwrap();
        assert_eq!(s.mode(), SessionMode::Dashboard);
    }

    #[test]
    fn no_emergency_while_case_open_or_loading() {
        let (mut s, mut rng) = onboarded();
        let config = SentinelConfig {
            emergency: crate::config::EmergencyConfig {
                probability: 1.0,
                duration_secs: 15,
            },
            ..SentinelConfig::default()
        };
        s.scheduler = EmergencyScheduler::new(&config.emergency);

        s.begin_case_request().unwrap();
        assert!(!s.poll_emergency(&mut rng), "not while loading");
        let token = s.case_generation;
        s.install_case(token, sample_case(), &mut rng);
        assert!(!s.poll_emergency(&mut rng), "not while a case is open");

        s.close_case();
        assert!(s.poll_emergency(&mut rng));
    }

    #[test]
    fn calls_resolve_case_suspects_and_roster_citizens() {
        let (mut s, mut rng) = onboarded();
        let (token, _, _) = s.begin_case_request().unwrap();
        s.install_case(token, sample_case(), &mut rng);

        let ring = s.initiate_call(&CitizenId::from("SUSP-1")).unwrap();
        assert_eq!(s.call().state(), CallState::Ringing);
        assert!(s.connect_call(ring));
        assert_eq!(s.call().state(), CallState::Connected);

        // Roster citizens are callable too.
        let roster_id = CitizenId::from("CIT-10000");
        let ring2 = s.initiate_call(&roster_id).unwrap();
        assert!(s.connect_call(ring2));

        assert!(s.initiate_call(&CitizenId::from("NOBODY")).is_err());
    }

    #[test]
    fn replenish_tick_flows_through_session() {
        let (mut s, mut rng) = onboarded();
        while s.queue().len() < 6 {
            s.replenish_queue(&mut rng, 1_700_000_000_000);
        }
        assert_eq!(s.queue().len(), 6);
        s.replenish_queue(&mut rng, 1_700_000_100_000);
        assert_eq!(s.queue().len(), 6);
    }
}
