//! The frequency-scan minigame.
//!
//! Backs the tracking emergency: the player sweeps a dial across a band
//! until the signal emerges, then attempts a lock. Strength is a pure
//! function of dial and target position; the scheduler only cares about
//! the lock succeeded/failed contract.

use rand::Rng;

/// Signal strength in [0,1] for a dial position against a target.
///
/// Linear falloff: full strength on the target, zero at `falloff` units
/// away or further.
pub fn signal_strength(dial: f64, target: f64, falloff: f64) -> f64 {
    if falloff <= 0.0 {
        return 0.0;
    }
    (1.0 - (dial - target).abs() / falloff).max(0.0)
}

/// Result of a lock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAttempt {
    /// Strength above threshold; the app confirms the lock after a
    /// fixed decrypt delay.
    Locking,
    /// Not enough signal; the scan animation ends with no resolution.
    NoSignal,
}

/// One scan session: a hidden target and the player's dial.
#[derive(Debug, Clone)]
pub struct FrequencyScan {
    dial: f64,
    target: f64,
    lock_threshold: f64,
    falloff: f64,
}

impl FrequencyScan {
    /// Start a scan with a fresh hidden target, uniform in 10..90 so the
    /// signal zone never clips the band edges. The dial starts centered.
    pub fn new(rng: &mut impl Rng, lock_threshold: f64, falloff: f64) -> Self {
        Self {
            dial: 50.0,
            target: f64::from(rng.random_range(10..90_u32)),
            lock_threshold,
            falloff,
        }
    }

    /// Move the dial, clamped to the 0..100 band.
    pub fn set_dial(&mut self, dial: f64) {
        self.dial = dial.clamp(0.0, 100.0);
    }

    /// Current dial position.
    pub const fn dial(&self) -> f64 {
        self.dial
    }

    /// Current signal strength in [0,1].
    pub fn strength(&self) -> f64 {
        signal_strength(self.dial, self.target, self.falloff)
    }

    /// Attempt a lock at the current dial position.
    pub fn attempt_lock(&self) -> LockAttempt {
        if self.strength() > self.lock_threshold {
            LockAttempt::Locking
        } else {
            LockAttempt::NoSignal
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn strength_is_one_on_target_and_falls_linearly() {
        assert!((signal_strength(40.0, 40.0, 15.0) - 1.0).abs() < f64::EPSILON);
        assert!((signal_strength(47.5, 40.0, 15.0) - 0.5).abs() < f64::EPSILON);
        assert!((signal_strength(55.0, 40.0, 15.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn strength_clamps_to_zero_beyond_falloff() {
        assert!(signal_strength(0.0, 90.0, 15.0).abs() < f64::EPSILON);
        assert!(signal_strength(100.0, 10.0, 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn strength_is_symmetric() {
        let above = signal_strength(45.0, 40.0, 15.0);
        let below = signal_strength(35.0, 40.0, 15.0);
        assert!((above - below).abs() < f64::EPSILON);
    }

    #[test]
    fn lock_requires_strength_above_threshold() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut scan = FrequencyScan::new(&mut rng, 0.95, 15.0);

        // Exactly on target: locks.
        scan.set_dial(scan.target);
        assert_eq!(scan.attempt_lock(), LockAttempt::Locking);

        // One falloff unit away: strength ~0.93, below threshold.
        scan.set_dial(scan.target + 1.0);
        assert!(scan.strength() < 0.95);
        assert_eq!(scan.attempt_lock(), LockAttempt::NoSignal);

        // Far away: no signal at all.
        scan.set_dial((scan.target + 50.0).clamp(0.0, 100.0));
        assert_eq!(scan.attempt_lock(), LockAttempt::NoSignal);
    }

    #[test]
    fn target_stays_clear_of_band_edges() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let scan = FrequencyScan::new(&mut rng, 0.95, 15.0);
            assert!((10.0..90.0).contains(&scan.target));
        }
    }

    #[test]
    fn dial_clamps_to_band() {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut scan = FrequencyScan::new(&mut rng, 0.95, 15.0);
        scan.set_dial(-20.0);
        assert!(scan.dial().abs() < f64::EPSILON);
        scan.set_dial(250.0);
        assert!((scan.dial() - 100.0).abs() < f64::EPSILON);
    }
}
