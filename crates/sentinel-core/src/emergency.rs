//! The emergency event scheduler.
//!
//! A probabilistic interrupt system: a poll tick may spawn a timed
//! emergency overlaying whatever the player is doing. Decision emergencies
//! resolve on option selection; tracking emergencies resolve through the
//! frequency scanner's lock callback; either times out when the countdown
//! reaches zero. At most one emergency exists at a time, and none spawns
//! while a case is open.

use rand::Rng;
use sentinel_types::{
    Emergency, EmergencyId, EmergencyKind, EmergencyOption, EmergencyOutcome, EmergencyPhase,
};
use tracing::info;

use crate::config::EmergencyConfig;

/// A decision scenario template: title, description, labeled options.
struct DecisionScenario {
    title: &'static str,
    description: &'static str,
    options: [(&'static str, bool); 3],
}

const DECISION_SCENARIOS: [DecisionScenario; 3] = [
    DecisionScenario {
        title: "HOSTAGE SITUATION",
        description: "Armed subject holding two hostages at the First Union branch on Main. \
                      Negotiation line is dead. Tactical window is closing.",
        options: [
            ("SEND SWAT TEAM", true),
            ("SEND NEGOTIATOR", false),
            ("OBSERVE ONLY", false),
        ],
    },
    DecisionScenario {
        title: "OFFICER DOWN",
        description: "Unit 2-ADAM-7 reports shots fired and an officer hit at Lake and 5th. \
                      Suspect still on scene.",
        options: [
            ("DISPATCH ALL NEARBY UNITS", true),
            ("WAIT FOR SUPERVISOR", false),
            ("REQUEST STATUS UPDATE", false),
        ],
    },
    DecisionScenario {
        title: "ARMED PURSUIT",
        description: "High-speed pursuit entering the school zone on Cedar. Suspect vehicle \
                      confirmed armed. Pursuing units request instructions.",
        options: [
            ("DEPLOY SPIKE STRIPS AHEAD", true),
            ("RAM THE VEHICLE", false),
            ("CONTINUE FOLLOWING", false),
        ],
    },
];

const TRACKING_SCENARIOS: [(&str, &str); 2] = [
    (
        "ROGUE SIGNAL DETECTED",
        "Unidentified transmitter active on the tactical band. Isolate and lock the \
         frequency before the trace window closes.",
    ),
    (
        "SUSPECT PHONE TRACE",
        "Warrant cell-trace is live but the carrier frequency is drifting. Lock the \
         signal to fix the suspect's position.",
    ),
];

/// Owns the single active emergency slot and its spawn logic.
///
/// Timing is external: the app layer drives [`EmergencyScheduler::poll`]
/// and [`EmergencyScheduler::countdown_tick`] from its timers, so every
/// path here is synchronous and deterministic under a seeded RNG.
#[derive(Debug)]
pub struct EmergencyScheduler {
    probability: f64,
    duration_secs: u32,
    active: Option<Emergency>,
}

impl EmergencyScheduler {
    /// A scheduler with no active emergency.
    pub const fn new(config: &EmergencyConfig) -> Self {
        Self {
            probability: config.probability,
            duration_secs: config.duration_secs,
            active: None,
        }
    }

    /// Poll tick. Rolls the spawn die unless an emergency is already
    /// present or a case is open; on a hit, creates an emergency of a
    /// uniformly chosen subtype. Returns the new emergency, if any.
    pub fn poll(&mut self, rng: &mut impl Rng, case_open: bool) -> Option<&Emergency> {
        if self.active.is_some() || case_open {
            return None;
        }
        if rng.random::<f64>() >= self.probability {
            return None;
        }

        let kind = if rng.random_bool(0.5) {
            EmergencyKind::Decision
        } else {
            EmergencyKind::Tracking
        };
        let emergency = self.build(rng, kind);
        info!(kind = ?emergency.kind, title = %emergency.title, "emergency spawned");
        self.active = Some(emergency);
        self.active.as_ref()
    }

    fn build(&self, rng: &mut impl Rng, kind: EmergencyKind) -> Emergency {
        let (title, description, options) = match kind {
            EmergencyKind::Decision => {
                let idx = rng.random_range(0..DECISION_SCENARIOS.len());
                let scenario = DECISION_SCENARIOS.get(idx).unwrap_or(&DECISION_SCENARIOS[0]);
                let options = scenario
                    .options
                    .iter()
                    .map(|(label, correct)| EmergencyOption {
                        label: (*label).to_owned(),
                        correct: *correct,
                    })
                    .collect();
                (scenario.title, scenario.description, options)
            }
            EmergencyKind::Tracking => {
                let idx = rng.random_range(0..TRACKING_SCENARIOS.len());
                let (title, description) =
                    TRACKING_SCENARIOS.get(idx).copied().unwrap_or(TRACKING_SCENARIOS[0]);
                (title, description, Vec::new())
            }
        };

        Emergency {
            id: EmergencyId::new(),
            kind,
            title: title.to_owned(),
            description: description.to_owned(),
            options,
            duration_secs: self.duration_secs,
            remaining_secs: self.duration_secs,
            phase: EmergencyPhase::Active,
        }
    }

    /// Select a decision option by index. Resolves immediately: success
    /// for the correct option, failure otherwise. Returns the outcome, or
    /// `None` when there is nothing to decide (no active decision
    /// emergency, bad index, or already resolved).
    pub fn choose_option(&mut self, index: usize) -> Option<EmergencyOutcome> {
        let emergency = self.active.as_ref()?;
        if emergency.phase != EmergencyPhase::Active || emergency.kind != EmergencyKind::Decision {
            return None;
        }
        let correct = emergency.options.get(index)?.correct;
        let outcome = if correct {
            EmergencyOutcome::Success
        } else {
            EmergencyOutcome::Failure
        };
        self.resolve(outcome);
        Some(outcome)
    }

    /// Signal-locked callback from the frequency scanner. Resolves an
    /// active tracking emergency to success.
    pub fn signal_locked(&mut self) -> Option<EmergencyOutcome> {
        let emergency = self.active.as_ref()?;
        if emergency.phase != EmergencyPhase::Active || emergency.kind != EmergencyKind::Tracking {
            return None;
        }
        self.resolve(EmergencyOutcome::Success);
        Some(EmergencyOutcome::Success)
    }

    /// Countdown tick. Decrements the remaining time of an active
    /// emergency; hitting zero resolves it as timed out. Returns the
    /// timeout outcome on the resolving tick.
    pub fn countdown_tick(&mut self) -> Option<EmergencyOutcome> {
        let emergency = self.active.as_mut()?;
        if emergency.phase != EmergencyPhase::Active {
            return None;
        }
        emergency.remaining_secs = emergency.remaining_secs.saturating_sub(1);
        if emergency.remaining_secs == 0 {
            self.resolve(EmergencyOutcome::TimedOut);
            return Some(EmergencyOutcome::TimedOut);
        }
        None
    }

    /// Clear a resolved emergency after its result dwell. Returns whether
    /// anything was cleared; an unresolved emergency is never cleared.
    pub fn clear_result(&mut self) -> bool {
        match self.active.as_ref().map(|e| e.phase) {
            Some(EmergencyPhase::ShowingResult(_)) => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    fn resolve(&mut self, outcome: EmergencyOutcome) {
        if let Some(emergency) = self.active.as_mut() {
            info!(outcome = ?outcome, title = %emergency.title, "emergency resolved");
            emergency.phase = EmergencyPhase::ShowingResult(outcome);
        }
    }

    /// The current emergency, in any phase.
    pub const fn active(&self) -> Option<&Emergency> {
        self.active.as_ref()
    }

    /// Whether an emergency occupies the slot (countdown or result dwell).
    pub const fn is_engaged(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the countdown timer should be ticking.
    pub fn is_counting_down(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|e| e.phase == EmergencyPhase::Active)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn config() -> EmergencyConfig {
        EmergencyConfig {
            probability: 0.15,
            duration_secs: 15,
        }
    }

    fn always() -> EmergencyConfig {
        EmergencyConfig {
            probability: 1.0,
            duration_secs: 15,
        }
    }

    fn spawn(scheduler: &mut EmergencyScheduler, rng: &mut SmallRng, kind: EmergencyKind) {
        loop {
            scheduler.poll(rng, false);
            if scheduler.active().map(|e| e.kind) == Some(kind) {
                return;
            }
            scheduler.active = None;
        }
    }

    #[test]
    fn poll_respects_probability() {
        let mut rng = SmallRng::seed_from_u64(10);
        let mut scheduler = EmergencyScheduler::new(&config());

        let mut fired = 0_u32;
        for _ in 0..1000 {
            if scheduler.poll(&mut rng, false).is_some() {
                fired += 1;
            }
            scheduler.active = None;
        }
        // Expect ~150 of 1000; allow a wide band.
        assert!((80..250).contains(&fired), "fired {fired} of 1000");
    }

    #[test]
    fn no_spawn_while_case_open_or_emergency_active() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut scheduler = EmergencyScheduler::new(&always());

        assert!(scheduler.poll(&mut rng, true).is_none());

        assert!(scheduler.poll(&mut rng, false).is_some());
        assert!(scheduler.is_engaged());
        // Slot occupied: no second emergency, ever.
        for _ in 0..50 {
            assert!(scheduler.poll(&mut rng, false).is_none());
        }
    }

    #[test]
    fn decision_has_exactly_one_correct_option() {
        let mut rng = SmallRng::seed_from_u64(12);
        let mut scheduler = EmergencyScheduler::new(&always());
        spawn(&mut scheduler, &mut rng, EmergencyKind::Decision);

        let emergency = scheduler.active().unwrap();
        assert_eq!(emergency.options.iter().filter(|o| o.correct).count(), 1);
        assert_eq!(emergency.remaining_secs, 15);
    }

    #[test]
    fn wrong_option_resolves_to_failure() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut scheduler = EmergencyScheduler::new(&always());
        spawn(&mut scheduler, &mut rng, EmergencyKind::Decision);

        let wrong = scheduler
            .active()
            .unwrap()
            .options
            .iter()
            .position(|o| !o.correct)
            .unwrap();
        assert_eq!(scheduler.choose_option(wrong), Some(EmergencyOutcome::Failure));

        // Resolved: further choices and ticks are ignored.
        assert!(scheduler.choose_option(0).is_none());
        assert!(scheduler.countdown_tick().is_none());

        assert!(scheduler.clear_result());
        assert!(!scheduler.is_engaged());
    }

    #[test]
    fn correct_option_resolves_to_success() {
        let mut rng = SmallRng::seed_from_u64(14);
        let mut scheduler = EmergencyScheduler::new(&always());
        spawn(&mut scheduler, &mut rng, EmergencyKind::Decision);

        let right = scheduler
            .active()
            .unwrap()
            .options
            .iter()
            .position(|o| o.correct)
            .unwrap();
        assert_eq!(scheduler.choose_option(right), Some(EmergencyOutcome::Success));
    }

    #[test]
    fn tracking_resolves_via_signal_lock() {
        let mut rng = SmallRng::seed_from_u64(15);
        let mut scheduler = EmergencyScheduler::new(&always());
        spawn(&mut scheduler, &mut rng, EmergencyKind::Tracking);

        assert!(scheduler.active().unwrap().options.is_empty());
        // Option selection means nothing to a tracking emergency.
        assert!(scheduler.choose_option(0).is_none());

        assert_eq!(scheduler.signal_locked(), Some(EmergencyOutcome::Success));
        assert!(scheduler.signal_locked().is_none());
    }

    #[test]
    fn countdown_times_out_after_fifteen_ticks() {
        let mut rng = SmallRng::seed_from_u64(16);
        let mut scheduler = EmergencyScheduler::new(&always());
        spawn(&mut scheduler, &mut rng, EmergencyKind::Decision);

        for _ in 0..14 {
            assert!(scheduler.countdown_tick().is_none());
        }
        assert_eq!(scheduler.countdown_tick(), Some(EmergencyOutcome::TimedOut));
        assert!(!scheduler.is_counting_down());
        assert!(scheduler.is_engaged());
    }

    #[test]
    fn unresolved_emergency_cannot_be_cleared() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut scheduler = EmergencyScheduler::new(&always());
        scheduler.poll(&mut rng, false);

        assert!(!scheduler.clear_result());
        assert!(scheduler.is_engaged());
    }
}
