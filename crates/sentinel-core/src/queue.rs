//! The dispatch queue.
//!
//! An ordered list of pending incidents, kept topped up by a periodic
//! replenishment tick and drained one entry per closed case. The queue is
//! not a request/fulfillment pair-matched structure: closing a case pops
//! the oldest entry, which models "one call resolved per case" rather
//! than resolving the specific call that spawned the case.

use chrono::DateTime;
use rand::Rng;
use sentinel_types::{DispatchCall, DispatchCallId, Priority};
use tracing::debug;

/// Incident types synthesized by the replenishment tick.
const REPLENISH_TYPES: [&str; 5] = [
    "911 HANGUP",
    "THEFT REPORT",
    "TRESPASSING",
    "TRAFFIC ACCIDENT",
    "ASSAULT REPORT",
];

/// Ordered pending-incident list with monotonic ids.
#[derive(Debug, Clone)]
pub struct DispatchQueue {
    calls: Vec<DispatchCall>,
    floor: usize,
    last_id: u64,
}

impl DispatchQueue {
    /// A queue seeded with the five fixed opening incidents.
    pub fn seeded(floor: usize) -> Self {
        let calls = vec![
            seed_call(101, "DOMESTIC DISTURBANCE", Priority::High, "21:04", 45.0, 30.0),
            seed_call(102, "SUSPICIOUS PERSON", Priority::Low, "21:15", 12.0, 78.0),
            seed_call(103, "SILENT ALARM", Priority::High, "21:22", 67.0, 22.0),
            seed_call(104, "NOISE COMPLAINT", Priority::Low, "21:28", 89.0, 55.0),
            seed_call(105, "VANDALISM REPORT", Priority::Medium, "21:35", 33.0, 60.0),
        ];
        Self {
            calls,
            floor,
            last_id: 105,
        }
    }

    /// Replenishment tick: append exactly one synthesized call iff the
    /// queue is below the floor. Returns the appended call, if any.
    ///
    /// `now_ms` seeds the new id (wall-clock milliseconds in the app);
    /// the id is bumped past the last issued id when the clock has not
    /// advanced, so ids stay strictly increasing.
    pub fn replenish(&mut self, rng: &mut impl Rng, now_ms: u64) -> Option<&DispatchCall> {
        if self.calls.len() >= self.floor {
            return None;
        }

        let id = now_ms.max(self.last_id.saturating_add(1));
        self.last_id = id;

        let type_idx = rng.random_range(0..REPLENISH_TYPES.len());
        let priority = if rng.random::<f64>() > 0.7 {
            Priority::High
        } else {
            Priority::Medium
        };

        let call = DispatchCall {
            id: DispatchCallId(id),
            call_type: REPLENISH_TYPES.get(type_idx).copied().unwrap_or("911 HANGUP").to_owned(),
            priority,
            time: time_label(now_ms),
            x: rng.random_range(0.0..100.0),
            y: rng.random_range(0.0..100.0),
        };
        debug!(id, call_type = %call.call_type, "dispatch call synthesized");
        self.calls.push(call);
        self.calls.last()
    }

    /// Drop and return the oldest entry. Called once per closed case.
    pub fn pop_oldest(&mut self) -> Option<DispatchCall> {
        if self.calls.is_empty() {
            None
        } else {
            Some(self.calls.remove(0))
        }
    }

    /// Pending calls, oldest first.
    pub fn calls(&self) -> &[DispatchCall] {
        &self.calls
    }

    /// Queue length.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

fn seed_call(
    id: u64,
    call_type: &str,
    priority: Priority,
    time: &str,
    x: f64,
    y: f64,
) -> DispatchCall {
    DispatchCall {
        id: DispatchCallId(id),
        call_type: call_type.to_owned(),
        priority,
        time: time.to_owned(),
        x,
        y,
    }
}

/// Display label (`"HH:MM"`, UTC) for a millisecond timestamp.
fn time_label(now_ms: u64) -> String {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| String::from("--:--"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn seeds_the_five_opening_incidents() {
        let queue = DispatchQueue::seeded(6);
        assert_eq!(queue.len(), 5);
        let types: Vec<&str> = queue.calls().iter().map(|c| c.call_type.as_str()).collect();
        assert_eq!(
            types,
            [
                "DOMESTIC DISTURBANCE",
                "SUSPICIOUS PERSON",
                "SILENT ALARM",
                "NOISE COMPLAINT",
                "VANDALISM REPORT"
            ]
        );
    }

    #[test]
    fn replenish_stops_at_the_floor() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut queue = DispatchQueue::seeded(6);

        // 5 -> 6 grows, then the queue holds.
        assert!(queue.replenish(&mut rng, 1_700_000_000_000).is_some());
        assert_eq!(queue.len(), 6);
        assert!(queue.replenish(&mut rng, 1_700_000_010_000).is_none());
        assert_eq!(queue.len(), 6);
    }

    #[test]
    fn replenish_adds_exactly_one_per_tick() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut queue = DispatchQueue::seeded(6);
        while queue.pop_oldest().is_some() {}
        assert!(queue.is_empty());

        queue.replenish(&mut rng, 1_700_000_000_000);
        assert_eq!(queue.len(), 1);
        let call = queue.calls().first().unwrap();
        assert!(matches!(call.priority, Priority::High | Priority::Medium));
    }

    #[test]
    fn ids_stay_strictly_increasing_with_a_stuck_clock() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut queue = DispatchQueue::seeded(6);
        while queue.pop_oldest().is_some() {}

        let now = 1_700_000_000_000;
        queue.replenish(&mut rng, now);
        queue.replenish(&mut rng, now);
        queue.replenish(&mut rng, now);

        let ids: Vec<u64> = queue.calls().iter().map(|c| c.id.0).collect();
        assert!(ids.iter().zip(ids.iter().skip(1)).all(|(a, b)| a < b));
    }

    #[test]
    fn pop_removes_oldest_first() {
        let mut queue = DispatchQueue::seeded(6);
        let popped = queue.pop_oldest().unwrap();
        assert_eq!(popped.id.0, 101);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.calls().first().unwrap().id.0, 102);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut queue = DispatchQueue::seeded(6);
        while queue.pop_oldest().is_some() {}
        assert!(queue.pop_oldest().is_none());
    }

    #[test]
    fn time_label_formats_utc() {
        // 2023-11-14T22:13:20Z
        assert_eq!(time_label(1_700_000_000_000), "22:13");
        assert_eq!(time_label(u64::MAX), "--:--");
    }
}
