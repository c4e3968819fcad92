//! Citizen fabrication.
//!
//! Fills the citizen database with schema-valid synthetic records at
//! session start. Pure function of the injected random source; ids are
//! sequential within a batch so a batch can never collide with itself.

use rand::Rng;
use sentinel_types::{Citizen, CitizenId, Sex};

/// Given-name pool.
const FIRST_NAMES: [&str; 20] = [
    "John", "Jane", "Michael", "Emily", "David", "Sarah", "Robert", "Jessica", "William",
    "Ashley", "James", "Linda", "George", "Patricia", "Joseph", "Elizabeth", "Thomas",
    "Jennifer", "Charles", "Maria",
];

/// Family-name pool.
const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

/// Street-name pool for fabricated addresses.
const STREETS: [&str; 10] = [
    "Maple", "Oak", "Washington", "Park", "Lake", "Hill", "Cedar", "High", "Elm", "Main",
];

/// Occupation pool.
const OCCUPATIONS: [&str; 15] = [
    "Accountant", "Nurse", "Teacher", "Engineer", "Sales", "Driver", "Clerk", "Manager",
    "Student", "Retired", "Mechanic", "Chef", "Security", "Artist", "Unemployed",
];

/// Blood type pool.
const BLOOD_TYPES: [&str; 4] = ["A+", "O+", "B-", "AB+"];

/// First id in a fabricated batch; the display id is `CIT-{10000 + i}`.
const ID_BASE: u32 = 10_000;

/// Fabricate `count` citizen records.
///
/// Ids are `CIT-10000` through `CIT-{10000 + count - 1}`, unique within
/// the batch. Always succeeds; `count == 0` yields an empty vec.
pub fn generate_citizens(rng: &mut impl Rng, count: usize) -> Vec<Citizen> {
    (0..count).map(|i| generate_citizen(rng, i)).collect()
}

fn generate_citizen(rng: &mut impl Rng, index: usize) -> Citizen {
    let first_name = pick(rng, &FIRST_NAMES);
    let last_name = pick(rng, &LAST_NAMES);

    // ~10% of the population carries a minor record.
    let criminal_record = if rng.random_bool(0.1) {
        "Minor Traffic Violations"
    } else {
        "Clean"
    };

    Citizen {
        id: CitizenId::from(format!(
            "CIT-{}",
            ID_BASE.saturating_add(u32::try_from(index).unwrap_or(u32::MAX))
        )),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        age: rng.random_range(18..78),
        sex: if rng.random_bool(0.5) { Sex::Male } else { Sex::Female },
        occupation: pick(rng, &OCCUPATIONS).to_owned(),
        address: format!("{} {} St", rng.random_range(100..1000), pick(rng, &STREETS)),
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
        weight: format!("{} lbs", rng.random_range(130..230_u32)),
        blood_type: pick(rng, &BLOOD_TYPES).to_owned(),
        relationships: vec![
            format!("Mother: {}", pick(rng, &LAST_NAMES)),
            String::from("Single"),
        ],
        criminal_record: criminal_record.to_owned(),
        notes: String::from("No active alerts."),
        avatar_url: format!(
            "https://ui-avatars.com/api/?name={first_name}+{last_name}&background=random"
        ),
        x: rng.random_range(0.0..100.0),
        y: rng.random_range(0.0..100.0),
        suspect_in_case: None,
        is_guilty: None,
        motive: None,
    }
}

/// Pick a uniform element from a non-empty pool.
fn pick<'a>(rng: &mut impl Rng, pool: &[&'a str]) -> &'a str {
    let idx = rng.random_range(0..pool.len());
    pool.get(idx).copied().unwrap_or("")
}
