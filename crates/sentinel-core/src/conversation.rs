//! Conversation state machines: the phone call and the AI helper.
//!
//! Both are pure state holders; the app layer owns the timers (ring
//! delay) and the async service calls, and feeds results back in. Every
//! pending async step carries a generation token, so a completion for a
//! superseded call or a stale query is detected and discarded instead of
//! corrupting a newer transcript.

use sentinel_types::{CallSpeaker, CallState, CallTurn, Citizen, HelperSpeaker, HelperTurn, Language};
use tracing::debug;

/// Fallback turn appended when a phone-call request fails.
pub const CONNECTION_ERROR_LINE: &str = "(Connection Error)";

/// Fallback turn appended when a helper query fails.
pub const HELPER_ERROR_LINE: &str = "System Error.";

/// The callee's synthetic opening line on connect.
fn opening_line(language: Language) -> &'static str {
    match language {
        Language::En => "Hello? Who is this?",
        Language::Fi => "Haloo? Kuka siellä?",
    }
}

// ---------------------------------------------------------------------------
// Phone call
// ---------------------------------------------------------------------------

/// The phone-call state machine.
///
/// Legal state flow: `Idle -> Ringing -> Connected -> Ended`, with
/// `Ringing` always visited before `Connected`. Initiating a new call from
/// any state supersedes the old one: the generation token advances and
/// everything pending against the old call becomes stale.
#[derive(Debug, Default)]
pub struct CallSession {
    state: CallState,
    callee: Option<Citizen>,
    transcript: Vec<CallTurn>,
    generation: u64,
}

impl CallSession {
    /// A session with no call in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initiate a call to `callee`: force-end any current call, clear the
    /// transcript, and enter `Ringing`. Returns the generation token the
    /// app must present when the ring delay elapses.
    pub fn initiate(&mut self, callee: Citizen) -> u64 {
        if self.state == CallState::Connected || self.state == CallState::Ringing {
            debug!(old = ?self.callee.as_ref().map(Citizen::full_name), "superseding active call");
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = CallState::Ringing;
        self.transcript.clear();
        self.callee = Some(callee);
        self.generation
    }

    /// Ring delay elapsed: move `Ringing -> Connected` and append the
    /// callee's opening line. A stale token (the call was superseded or
    /// ended while ringing) is discarded; returns whether the connect
    /// was applied.
    pub fn connect(&mut self, token: u64, language: Language) -> bool {
        if token != self.generation || self.state != CallState::Ringing {
            return false;
        }
        self.state = CallState::Connected;
        self.transcript.push(CallTurn {
            speaker: CallSpeaker::Citizen,
            text: opening_line(language).to_owned(),
        });
        true
    }

    /// Append the dispatcher's outgoing message. Only legal while
    /// connected; returns the token the async reply must present.
    pub fn push_dispatch(&mut self, text: impl Into<String>) -> Option<u64> {
        if self.state != CallState::Connected {
            return None;
        }
        self.transcript.push(CallTurn {
            speaker: CallSpeaker::Dispatch,
            text: text.into(),
        });
        Some(self.generation)
    }

    /// Append the callee's reply from a completed service call. Stale
    /// tokens and replies arriving after the call ended are discarded.
    /// Overlapping sends append in completion order by construction.
    pub fn push_reply(&mut self, token: u64, text: impl Into<String>) -> bool {
        if token != self.generation || self.state != CallState::Connected {
            return false;
        }
        self.transcript.push(CallTurn {
            speaker: CallSpeaker::Citizen,
            text: text.into(),
        });
        true
    }

    /// Append the in-fiction fallback for a failed reply request. The
    /// call stays connected.
    pub fn push_error(&mut self, token: u64) -> bool {
        self.push_reply(token, CONNECTION_ERROR_LINE)
    }

    /// End the call. The transcript survives until the next initiate;
    /// the token advances so pending completions go stale.
    pub fn end(&mut self) {
        if self.state == CallState::Ringing || self.state == CallState::Connected {
            self.state = CallState::Ended;
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Current call state.
    pub const fn state(&self) -> CallState {
        self.state
    }

    /// The current callee, if a call exists in any state.
    pub const fn callee(&self) -> Option<&Citizen> {
        self.callee.as_ref()
    }

    /// The transcript of the current (or just-ended) call.
    pub fn transcript(&self) -> &[CallTurn] {
        &self.transcript
    }
}

// ---------------------------------------------------------------------------
// AI helper
// ---------------------------------------------------------------------------

/// The CAD-assistant state machine.
///
/// No ringing or ended states; a single loading flag gates concurrent
/// queries (a query while loading is rejected, not queued). The
/// transcript resets when (re)initialized with a case.
#[derive(Debug, Default)]
pub struct HelperSession {
    transcript: Vec<HelperTurn>,
    loading: bool,
    generation: u64,
}

impl HelperSession {
    /// A helper with an empty transcript, awaiting initialization.
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)initialize for a case: reset the transcript and seed it with
    /// the online banner referencing the case number.
    pub fn init(&mut self, case_number: &str, language: Language) {
        self.generation = self.generation.wrapping_add(1);
        self.loading = false;
        self.transcript.clear();
        let awaiting = match language {
            Language::En => "Awaiting query regarding case",
            Language::Fi => "Odotetaan kyselyä tapauksesta",
        };
        self.transcript.push(HelperTurn {
            speaker: HelperSpeaker::Assistant,
            text: format!("CAD ASSISTANT v4.0 ONLINE. {awaiting} {case_number}"),
        });
    }

    /// Submit a query: appends the user turn, raises the loading gate,
    /// and returns the completion token. `None` while a query is already
    /// in flight.
    pub fn submit(&mut self, query: impl Into<String>) -> Option<u64> {
        if self.loading {
            return None;
        }
        self.transcript.push(HelperTurn {
            speaker: HelperSpeaker::User,
            text: query.into(),
        });
        self.loading = true;
        Some(self.generation)
    }

    /// Apply a completed reply. A stale token (the helper was re-inited
    /// for a new case) is discarded without touching the loading gate of
    /// the new context.
    pub fn resolve(&mut self, token: u64, text: impl Into<String>) -> bool {
        if token != self.generation {
            return false;
        }
        self.transcript.push(HelperTurn {
            speaker: HelperSpeaker::Assistant,
            text: text.into(),
        });
        self.loading = false;
        true
    }

    /// Apply a failed reply: the in-fiction error line, gate released.
    pub fn fail(&mut self, token: u64) -> bool {
        self.resolve(token, HELPER_ERROR_LINE)
    }

    /// Whether a query is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The helper transcript, banner first.
    pub fn transcript(&self) -> &[HelperTurn] {
        &self.transcript
    }
}
