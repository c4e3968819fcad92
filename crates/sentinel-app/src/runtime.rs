//! The tokio event loop driving the simulation.
//!
//! The core state machines are synchronous; this runtime owns everything
//! temporal around them: the three periodic timers (dispatch
//! replenishment, emergency poll, emergency countdown), the one-shot
//! delays (ring connect, result dwell, lock confirmation), and the
//! background generative-service calls. Every delayed or asynchronous
//! completion re-enters the loop as an [`Event`] tagged with the token of
//! the context it was started for, and the core discards it when that
//! context has been superseded.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use sentinel_core::scanner::{FrequencyScan, LockAttempt};
use sentinel_core::{SentinelConfig, Session};
use sentinel_gen::{GenError, GenerativeClient};
use sentinel_types::{
    CallState, CaseData, CitizenId, Difficulty, DispatchUnit, Emergency, EmergencyKind, FileNode,
    Language, SessionMode, Verdict,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

/// Commands from the interaction surface into the runtime.
#[derive(Debug)]
pub enum UiCommand {
    /// Pick the interface language.
    ChooseLanguage(Language),
    /// Pick the case difficulty.
    ChooseDifficulty(Difficulty),
    /// Respond to the dispatch queue: request a generated case.
    RespondToCall,
    /// Open the citizen database screen.
    OpenCitizenDb,
    /// Return from the citizen database.
    CloseCitizenDb,
    /// Dial a citizen.
    InitiateCall(CitizenId),
    /// Hang up the active call.
    EndCall,
    /// Say something on the active call.
    SendCallMessage(String),
    /// Query the CAD assistant.
    AskHelper(String),
    /// Submit the warrant request for supervisor review.
    SubmitWarrant {
        /// The accused suspect.
        accused: CitizenId,
        /// The probable-cause statement.
        notes: String,
    },
    /// Acknowledge the supervisor memo and close the case.
    AcknowledgeVerdict,
    /// Pick a decision-emergency option by index.
    ChooseEmergencyOption(usize),
    /// Move the frequency-scanner dial.
    SetScannerDial(f64),
    /// Attempt a signal lock at the current dial position.
    AttemptSignalLock,
    /// Report the current state through a oneshot.
    Inspect(oneshot::Sender<Snapshot>),
    /// Stop the runtime.
    Shutdown,
}

/// A point-in-time view of the session, for the renderer and for tests.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Current top-level mode.
    pub mode: SessionMode,
    /// Whether case generation is in flight.
    pub loading_case: bool,
    /// Active case number, if a case is open.
    pub case_number: Option<String>,
    /// Pending dispatch-call count.
    pub queue_len: usize,
    /// Citizen roster size.
    pub roster_len: usize,
    /// Phone-call state.
    pub call_state: CallState,
    /// Phone transcript length.
    pub call_turns: usize,
    /// Helper transcript length.
    pub helper_turns: usize,
    /// The emergency occupying the slot, if any.
    pub emergency: Option<Emergency>,
    /// Terminal document tree for the active case.
    pub file_tree: Option<FileNode>,
    /// Radio unit contact list shown on the dispatch terminal.
    pub units: Vec<DispatchUnit>,
    /// Scanner signal strength, when a tracking scan is live.
    pub signal_strength: Option<f64>,
    /// The verdict awaiting acknowledgement, if any.
    pub verdict: Option<Verdict>,
}

/// Completions re-entering the loop: elapsed one-shot delays and
/// finished service calls.
enum Event {
    /// Ring delay elapsed for a call token.
    ConnectCall(u64),
    /// Result dwell elapsed; clear the resolved emergency.
    ClearEmergency,
    /// Lock confirmation delay elapsed.
    ConfirmLock,
    /// Failed-scan animation finished.
    ScanSettled,
    /// Case generation finished.
    CaseReady {
        token: u64,
        result: Result<CaseData, GenError>,
    },
    /// Phone-call reply arrived.
    CallReply {
        token: u64,
        result: Result<String, GenError>,
    },
    /// Helper reply arrived.
    HelperReply {
        token: u64,
        result: Result<String, GenError>,
    },
    /// Supervisor review finished.
    ReviewDone {
        token: u64,
        result: Result<Verdict, GenError>,
    },
}

/// The simulation runtime: session plus everything temporal.
pub struct Runtime {
    session: Session,
    client: Arc<GenerativeClient>,
    config: SentinelConfig,
    rng: SmallRng,
    commands: mpsc::Receiver<UiCommand>,
    tasks: JoinSet<Event>,
    scan: Option<FrequencyScan>,
    scanning: bool,
}

impl Runtime {
    /// Build a runtime around a fresh session.
    pub fn new(
        config: SentinelConfig,
        client: Arc<GenerativeClient>,
        mut rng: SmallRng,
        commands: mpsc::Receiver<UiCommand>,
    ) -> Self {
        let session = Session::new(&config, &mut rng);
        Self {
            session,
            client,
            config,
            rng,
            commands,
            tasks: JoinSet::new(),
            scan: None,
            scanning: false,
        }
    }

    /// Run the event loop until shutdown or channel close.
    pub async fn run(mut self) {
        let mut dispatch = interval(Duration::from_secs(self.config.timing.dispatch_interval_secs));
        let mut poll = interval(Duration::from_secs(self.config.timing.emergency_poll_secs));
        let mut countdown = interval(Duration::from_secs(self.config.timing.countdown_tick_secs));

        // The first tick of a tokio interval fires immediately; consume
        // them so the timers measure full periods from startup.
        dispatch.tick().await;
        poll.tick().await;
        countdown.tick().await;

        info!("sentinel runtime started");
        loop {
            // Biased so pending completions always apply before a later
            // command observes (or races) the state they belong to.
            tokio::select! {
                biased;
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match joined {
                        Ok(event) => self.handle_event(event),
                        Err(e) => warn!(error = %e, "background task failed"),
                    }
                }
                _ = dispatch.tick() => {
                    self.session.replenish_queue(&mut self.rng, now_ms());
                }
                _ = poll.tick() => {
                    if self.poll_emergency() {
                        // The countdown arm was disabled until now; ticks
                        // missed while idle must not count against the
                        // fresh emergency.
                        countdown.reset();
                    }
                }
                _ = countdown.tick(), if self.session.emergencies().is_counting_down() => {
                    if self.session.emergencies_mut().countdown_tick().is_some() {
                        self.schedule_result_dwell();
                    }
                }
                command = self.commands.recv() => {
                    match command {
                        None | Some(UiCommand::Shutdown) => break,
                        Some(command) => {
                            self.handle_command(command);
                            // Tasks spawned by this command must get a
                            // chance to complete before the next queued
                            // command observes the state they produce.
                            tokio::task::yield_now().await;
                        }
                    }
                }
            }
        }
        info!("sentinel runtime stopped");
    }

    // -----------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------

    fn handle_command(&mut self, command: UiCommand) {
        match command {
            UiCommand::ChooseLanguage(language) => {
                if let Err(e) = self.session.choose_language(language) {
                    debug!(error = %e, "language select rejected");
                }
            }
            UiCommand::ChooseDifficulty(difficulty) => {
                if let Err(e) = self.session.choose_difficulty(difficulty) {
                    debug!(error = %e, "difficulty select rejected");
                }
            }
            UiCommand::RespondToCall => self.start_case_generation(),
            UiCommand::OpenCitizenDb => {
                if let Err(e) = self.session.open_citizen_db() {
                    debug!(error = %e, "citizen db open rejected");
                }
            }
            UiCommand::CloseCitizenDb => {
                if let Err(e) = self.session.close_citizen_db() {
                    debug!(error = %e, "citizen db close rejected");
                }
            }
            UiCommand::InitiateCall(citizen_id) => self.start_call(&citizen_id),
            UiCommand::EndCall => self.session.call_mut().end(),
            UiCommand::SendCallMessage(text) => self.send_call_message(text),
            UiCommand::AskHelper(query) => self.ask_helper(query),
            UiCommand::SubmitWarrant { accused, notes } => self.submit_warrant(&accused, notes),
            UiCommand::AcknowledgeVerdict => self.session.acknowledge_verdict(),
            UiCommand::ChooseEmergencyOption(index) => {
                if self.session.emergencies_mut().choose_option(index).is_some() {
                    self.schedule_result_dwell();
                }
            }
            UiCommand::SetScannerDial(dial) => {
                if let Some(scan) = self.scan.as_mut() {
                    scan.set_dial(dial);
                }
            }
            UiCommand::AttemptSignalLock => self.attempt_signal_lock(),
            UiCommand::Inspect(reply) => {
                let _ = reply.send(self.snapshot());
            }
            UiCommand::Shutdown => {}
        }
    }

    fn start_case_generation(&mut self) {
        let (token, language, difficulty) = match self.session.begin_case_request() {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "case request rejected");
                return;
            }
        };
        let client = Arc::clone(&self.client);
        let mut task_rng = SmallRng::from_rng(&mut self.rng);
        self.tasks.spawn(async move {
            let result = client.generate_case(language, difficulty, &mut task_rng).await;
            Event::CaseReady { token, result }
        });
    }

    fn start_call(&mut self, citizen_id: &CitizenId) {
        let token = match self.session.initiate_call(citizen_id) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "call rejected");
                return;
            }
        };
        let delay = Duration::from_millis(self.config.timing.ring_delay_ms);
        self.tasks.spawn(async move {
            sleep(delay).await;
            Event::ConnectCall(token)
        });
    }

    fn send_call_message(&mut self, text: String) {
        let Some(language) = self.session.language() else {
            return;
        };
        let Some(token) = self.session.call_mut().push_dispatch(text.clone()) else {
            debug!("message dropped, call not connected");
            return;
        };
        let Some(callee) = self.session.call().callee().cloned() else {
            return;
        };
        // History excludes the turn just pushed; the template carries the
        // new message separately.
        let history: Vec<_> = self
            .session
            .call()
            .transcript()
            .iter()
            .take(self.session.call().transcript().len().saturating_sub(1))
            .cloned()
            .collect();
        let case = self.session.active_case().cloned();
        let client = Arc::clone(&self.client);
        self.tasks.spawn(async move {
            let result = client
                .converse(&callee, case.as_ref(), &history, &text, language)
                .await;
            Event::CallReply { token, result }
        });
    }

    fn ask_helper(&mut self, query: String) {
        let Some(language) = self.session.language() else {
            return;
        };
        let Some(case) = self.session.active_case().cloned() else {
            return;
        };
        let Some(token) = self.session.helper_mut().submit(query.clone()) else {
            debug!("helper query dropped, one already in flight");
            return;
        };
        let history: Vec<_> = self
            .session
            .helper()
            .transcript()
            .iter()
            .take(self.session.helper().transcript().len().saturating_sub(1))
            .cloned()
            .collect();
        let client = Arc::clone(&self.client);
        self.tasks.spawn(async move {
            let result = client.ask_helper(&case, &history, &query, language).await;
            Event::HelperReply { token, result }
        });
    }

    fn submit_warrant(&mut self, accused: &CitizenId, notes: String) {
        let Some(language) = self.session.language() else {
            return;
        };
        let token = match self.session.begin_review(accused) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "warrant submission rejected");
                return;
            }
        };
        let Some(case) = self.session.active_case().cloned() else {
            return;
        };
        let accused = accused.clone();
        let client = Arc::clone(&self.client);
        self.tasks.spawn(async move {
            let result = client.review_submission(&case, &accused, &notes, language).await;
            Event::ReviewDone { token, result }
        });
    }

    fn attempt_signal_lock(&mut self) {
        if self.scanning {
            return;
        }
        let Some(scan) = self.scan.as_ref() else {
            return;
        };
        self.scanning = true;
        match scan.attempt_lock() {
            LockAttempt::Locking => {
                let delay = Duration::from_millis(self.config.timing.lock_confirm_ms);
                self.tasks.spawn(async move {
                    sleep(delay).await;
                    Event::ConfirmLock
                });
            }
            LockAttempt::NoSignal => {
                let delay = Duration::from_millis(self.config.timing.scan_fail_ms);
                self.tasks.spawn(async move {
                    sleep(delay).await;
                    Event::ScanSettled
                });
            }
        }
    }

    // -----------------------------------------------------------------
    // Timer and completion events
    // -----------------------------------------------------------------

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::ConnectCall(token) => {
                self.session.connect_call(token);
            }
            Event::ClearEmergency => {
                self.session.emergencies_mut().clear_result();
                self.scan = None;
                self.scanning = false;
            }
            Event::ConfirmLock => {
                self.scanning = false;
                if self.session.emergencies_mut().signal_locked().is_some() {
                    self.schedule_result_dwell();
                }
            }
            Event::ScanSettled => {
                self.scanning = false;
            }
            Event::CaseReady { token, result } => match result {
                Ok(case) => {
                    self.session.install_case(token, case, &mut self.rng);
                }
                Err(e) => {
                    warn!(error = %e, "case generation failed");
                    self.session.case_request_failed(token);
                }
            },
            Event::CallReply { token, result } => match result {
                Ok(text) => {
                    self.session.call_mut().push_reply(token, text);
                }
                Err(e) => {
                    warn!(error = %e, "call reply failed");
                    self.session.call_mut().push_error(token);
                }
            },
            Event::HelperReply { token, result } => match result {
                Ok(text) => {
                    self.session.helper_mut().resolve(token, text);
                }
                Err(e) => {
                    warn!(error = %e, "helper query failed");
                    self.session.helper_mut().fail(token);
                }
            },
            Event::ReviewDone { token, result } => match result {
                Ok(verdict) => {
                    self.session.record_verdict(token, verdict);
                }
                Err(e) => {
                    warn!(error = %e, "supervisor review failed");
                    self.session.review_failed(token);
                }
            },
        }
    }

    /// Poll tick; returns whether an emergency spawned.
    fn poll_emergency(&mut self) -> bool {
        if !self.session.poll_emergency(&mut self.rng) {
            return false;
        }
        // A fresh tracking emergency brings its own scan session.
        if self.session.emergencies().active().map(|e| e.kind) == Some(EmergencyKind::Tracking) {
            self.scan = Some(FrequencyScan::new(
                &mut self.rng,
                self.config.scanner.lock_threshold,
                self.config.scanner.falloff,
            ));
            self.scanning = false;
        }
        true
    }

    fn schedule_result_dwell(&mut self) {
        let dwell = Duration::from_secs(self.config.timing.result_dwell_secs);
        self.tasks.spawn(async move {
            sleep(dwell).await;
            Event::ClearEmergency
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.session.mode(),
            loading_case: self.session.is_loading_case(),
            case_number: self.session.active_case().map(|c| c.case_number.clone()),
            queue_len: self.session.queue().len(),
            roster_len: self.session.roster().len(),
            call_state: self.session.call().state(),
            call_turns: self.session.call().transcript().len(),
            helper_turns: self.session.helper().transcript().len(),
            emergency: self.session.emergencies().active().cloned(),
            file_tree: self.session.file_tree().cloned(),
            units: self.session.units().to_vec(),
            signal_strength: self.scan.as_ref().map(FrequencyScan::strength),
            verdict: self.session.verdict().cloned(),
        }
    }
}

/// Wall-clock milliseconds, for dispatch-call ids.
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
