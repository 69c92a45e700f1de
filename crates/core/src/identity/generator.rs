//! Random identity generation.

use chrono::{NaiveDate, TimeZone, Utc};
use rand::distr::Alphanumeric;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::types::Identity;

const FIRST_NAMES: &[&str] = &[
    "Oliver", "Charlotte", "Jack", "Amelia", "William", "Olivia", "Noah", "Isla", "Thomas",
    "Mia", "James", "Ava", "Lucas", "Grace", "Henry", "Chloe", "Liam", "Zoe", "Ethan", "Ruby",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Williams", "Brown", "Wilson", "Taylor", "Johnson", "White", "Martin",
    "Anderson", "Thompson", "Nguyen", "Thomas", "Walker", "Harris", "Lee", "Ryan", "Robinson",
    "Kelly", "King",
];

/// Produces a fresh identity for each workflow run.
pub trait IdentityGenerator: Send + Sync {
    fn generate(&self) -> Identity;
}

/// Generates plausible Australian identities on the given mail domains.
#[derive(Debug, Clone)]
pub struct RandomIdentityGenerator {
    domains: Vec<String>,
}

impl RandomIdentityGenerator {
    /// `domains` must not be empty; the mailbox has to be able to read
    /// whatever address is generated.
    pub fn new(domains: Vec<String>) -> Self {
        Self { domains }
    }
}

impl IdentityGenerator for RandomIdentityGenerator {
    fn generate(&self) -> Identity {
        let mut rng = rand::rng();

        let first_name = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex");
        let last_name = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Taylor");
        let domain = self
            .domains
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or("1secmail.com");

        let email = format!(
            "{}.{}{}@{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            rng.random_range(100..100_000),
            domain
        );

        Identity {
            email,
            password: password(&mut rng),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone: mobile_number(&mut rng),
            birth_timestamp: birth_timestamp(&mut rng),
        }
    }
}

/// Alphanumeric body plus one uppercase letter and one digit.
fn password(rng: &mut impl Rng) -> String {
    let mut password: String = (0..12).map(|_| rng.sample(Alphanumeric) as char).collect();
    password.push(rng.random_range(b'A'..=b'Z') as char);
    password.push(rng.random_range(b'0'..=b'9') as char);
    password
}

/// Australian mobile number: `04` followed by eight digits.
fn mobile_number(rng: &mut impl Rng) -> String {
    format!("04{:08}", rng.random_range(0..100_000_000u32))
}

/// Unix seconds between 1980-02-01 and 1995-02-01.
fn birth_timestamp(rng: &mut impl Rng) -> i64 {
    let (start, end) = birth_range();
    rng.random_range(start..end)
}

fn birth_range() -> (i64, i64) {
    let at_midnight = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or_default()
    };
    (at_midnight(1980, 2, 1), at_midnight(1995, 2, 1))
}
