//! The citizen roster.
//!
//! One append-only collection backing the citizen database screen and the
//! city map. Seeded by the fabricator at session start; case suspects are
//! prepended when a case installs. Records are never edited or removed, so
//! readers can hold indices across appends without invalidation.

use rand::Rng;
use sentinel_types::{Citizen, CitizenId};

use crate::fabricator::generate_citizens;

/// Append-only citizen collection.
#[derive(Debug, Clone, Default)]
pub struct CitizenRoster {
    citizens: Vec<Citizen>,
}

impl CitizenRoster {
    /// An empty roster.
    pub const fn new() -> Self {
        Self {
            citizens: Vec::new(),
        }
    }

    /// A roster seeded with `count` fabricated citizens.
    pub fn seeded(rng: &mut impl Rng, count: usize) -> Self {
        Self {
            citizens: generate_citizens(rng, count),
        }
    }

    /// Prepend case suspects so they surface first in database searches.
    ///
    /// Duplicate ids are acceptable: suspects are new citizens entering
    /// the roster, never updates of existing records.
    pub fn prepend(&mut self, suspects: Vec<Citizen>) {
        let mut merged = suspects;
        merged.append(&mut self.citizens);
        self.citizens = merged;
    }

    /// Look up a citizen by id; first match wins.
    pub fn get(&self, id: &CitizenId) -> Option<&Citizen> {
        self.citizens.iter().find(|c| &c.id == id)
    }

    /// Case-insensitive search over name, id, and SSN.
    ///
    /// An empty query matches nothing: the database screen starts blank.
    pub fn search(&self, query: &str) -> Vec<&Citizen> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.citizens
            .iter()
            .filter(|c| {
                c.full_name().to_lowercase().contains(&needle)
                    || c.id.as_str().to_lowercase().contains(&needle)
                    || c.ssn.contains(&needle)
            })
            .collect()
    }

    /// All citizens, insertion order (latest suspects first).
    pub fn citizens(&self) -> &[Citizen] {
        &self.citizens
    }

    /// Roster size.
    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sentinel_types::Sex;

    use super::*;

    fn suspect(id: &str, first: &str, last: &str) -> Citizen {
        Citizen {
            id: CitizenId::from(id),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            age: 40,
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
            notes: String::new(),
            avatar_url: String::new(),
            x: 1.0,
            y: 2.0,
            suspect_in_case: None,
            is_guilty: Some(true),
            motive: None,
        }
    }

    #[test]
    fn prepend_puts_suspects_first_and_only_grows() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut roster = CitizenRoster::seeded(&mut rng, 10);
        assert_eq!(roster.len(), 10);

        roster.prepend(vec![suspect("SUSP-1", "Marcus", "Hale")]);
        assert_eq!(roster.len(), 11);
        assert_eq!(roster.citizens().first().unwrap().id.as_str(), "SUSP-1");
        // The seeded population is intact behind the suspects.
        assert_eq!(roster.citizens().get(1).unwrap().id.as_str(), "CIT-10000");
    }

    #[test]
    fn search_matches_name_id_and_ssn() {
        let mut roster = CitizenRoster::new();
        roster.prepend(vec![suspect("SUSP-1", "Marcus", "Hale")]);

        assert_eq!(roster.search("marcus hale").len(), 1);
        assert_eq!(roster.search("susp-1").len(), 1);
        assert_eq!(roster.search("321-54-9876").len(), 1);
        assert!(roster.search("nobody").is_empty());
        assert!(roster.search("   ").is_empty());
    }

    #[test]
    fn duplicate_ids_are_tolerated_first_match_wins() {
        let mut roster = CitizenRoster::new();
        roster.prepend(vec![suspect("SUSP-1", "Old", "Entry")]);
        roster.prepend(vec![suspect("SUSP-1", "New", "Entry")]);
        assert_eq!(roster.len(), 2);
        assert_eq!(
            roster.get(&CitizenId::from("SUSP-1")).unwrap().first_name,
            "New"
        );
    }
}
