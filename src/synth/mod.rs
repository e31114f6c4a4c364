use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::{Entity, EntityType, Transaction};

const TRANSACTION_TYPES: &[&str] = &[
    "Payment",
    "Transfer",
    "Invoice",
    "Service fee",
    "Consulting fee",
];

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CHF"];

const EVIDENCE_SOURCES: &[&str] = &[
    "Company Registry",
    "SEC EDGAR",
    "LEI Database",
    "Wikipedia",
    "News Analysis",
    "Sanctions List",
];

/// Jurisdictions a synthetic entity may be registered in.
const COUNTRY_POOL: &[&str] = &[
    "RU", "CN", "IR", "KP", "SY", "VE", "MM", "ZW", "US", "GB", "DE", "FR", "CA",
];

/// Shell companies are seeded into the risky end of the pool.
const HIGH_RISK_COUNTRIES: &[&str] = &["RU", "CN", "IR", "VE", "MM", "ZW", "KP", "SY"];

/// Jurisdictions that bump the sanctions probability.
const SANCTION_PRONE: &[&str] = &["RU", "IR", "KP", "SY"];

const FIRST_NAMES: &[&str] = &[
    "James", "Maria", "Wei", "Fatima", "Lucas", "Ingrid", "Rajesh", "Elena", "Tomas", "Aisha",
    "Viktor", "Claire", "Diego", "Hana", "Samuel", "Nadia",
];

const SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Walker", "Baxter", "Whitfield", "Ferguson", "Lindqvist", "Moreau",
    "Tanaka", "Novak", "Okafor", "Petrov", "Silva", "Keller", "Donovan", "Hart",
];

const COMPANY_WORDS: &[&str] = &[
    "Apex", "Vertex", "Northwind", "Meridian", "Atlas", "Orion", "Summit", "Cascade", "Pinnacle",
    "Horizon", "Quantum", "Sterling", "Beacon", "Crescent", "Ironwood", "Lakeshore",
];

fn pick<'a>(rng: &mut impl Rng, items: &'a [&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Generation-time entity type table. Deliberately NOT the extraction-time
/// classifier: different keyword set, different order (shell before
/// financial), and a Corporation default instead of Unknown. Used only to
/// seed synthetic data.
pub fn generator_entity_type(name: &str) -> EntityType {
    let lower = name.to_lowercase();

    const SHELL: &[&str] = &["holdings", "investments", "group", "capital", "partners"];
    const FINANCIAL: &[&str] = &["bank", "financial", "invest", "capital", "fund"];
    const GOVERNMENT: &[&str] = &["government", "ministry", "agency", "department"];
    const NONPROFIT: &[&str] = &["foundation", "charity", "trust", "association"];

    if SHELL.iter().any(|w| lower.contains(w)) {
        return EntityType::ShellCompany;
    }
    if FINANCIAL.iter().any(|w| lower.contains(w)) {
        return EntityType::FinancialIntermediary;
    }
    if GOVERNMENT.iter().any(|w| lower.contains(w)) {
        return EntityType::GovernmentAgency;
    }
    if NONPROFIT.iter().any(|w| lower.contains(w)) {
        return EntityType::NonProfit;
    }

    EntityType::Corporation
}

/// A plausible company display name, drawn from the same five shapes the
/// transaction descriptions use.
pub fn company_name(rng: &mut impl Rng) -> String {
    match rng.gen_range(0..5) {
        0 => format!(
            "{} {}",
            pick(rng, COMPANY_WORDS),
            pick(rng, &["Systems", "Logistics", "Trading", "Solutions"]),
        ),
        1 => format!(
            "{} {}",
            pick(rng, SURNAMES),
            pick(rng, &["Inc", "LLC", "Corp", "Group"]),
        ),
        2 => format!(
            "{} & {} {}",
            pick(rng, SURNAMES),
            pick(rng, SURNAMES),
            pick(rng, &["Associates", "Partners"]),
        ),
        3 => format!(
            "{} {}",
            pick(rng, COMPANY_WORDS),
            pick(rng, &["Holdings", "Investments", "Capital", "Industries"]),
        ),
        _ => format!(
            "{} {} {}",
            pick(rng, &["Global", "International", "United", "National"]),
            pick(rng, COMPANY_WORDS),
            pick(rng, &["Corp", "Inc", "Co", "Ltd"]),
        ),
    }
}

fn person_name(rng: &mut impl Rng) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, SURNAMES))
}

/// One synthetic transaction: amounts weighted toward the normal band,
/// with occasional suspiciously round figures.
pub fn generate_transaction(now: DateTime<Utc>, rng: &mut impl Rng) -> Transaction {
    let mut amount = match rng.gen_range(0..11) {
        9 => rng.gen_range(50_000..200_000) as f64,
        10 => rng.gen_range(500_000..2_000_000) as f64,
        _ => rng.gen_range(1_000..50_000) as f64,
    };
    if rng.gen_bool(0.2) {
        amount = (amount / 1_000.0).round() * 1_000.0;
    }

    let sender = company_name(rng);
    let recipient = company_name(rng);
    let description = format!(
        "{} from {sender} to {recipient}",
        pick(rng, TRANSACTION_TYPES)
    );
    let date = (now - Duration::days(rng.gen_range(0..=30)))
        .format("%Y-%m-%d")
        .to_string();

    Transaction {
        transaction_id: format!("TXN{:08X}", rng.r#gen::<u32>()),
        description,
        amount,
        currency: pick(rng, CURRENCIES).to_string(),
        date,
    }
}

/// A fully populated synthetic entity profile for a name. Deterministic
/// only through the supplied generator; callers cache per name.
pub fn generate_entity(name: &str, now: DateTime<Utc>, rng: &mut impl Rng) -> Entity {
    let entity_type = generator_entity_type(name);
    let is_shell = entity_type == EntityType::ShellCompany;

    let jurisdiction = if is_shell {
        pick(rng, HIGH_RISK_COUNTRIES).to_string()
    } else {
        pick(rng, COUNTRY_POOL).to_string()
    };

    let directors: Vec<String> = (0..rng.gen_range(1..=5)).map(|_| person_name(rng)).collect();
    let shareholders: Vec<String> = if is_shell {
        (0..rng.gen_range(0..=2)).map(|_| person_name(rng)).collect()
    } else {
        (0..rng.gen_range(1..=8)).map(|_| person_name(rng)).collect()
    };

    // Freshly incorporated shells are the suspicious case.
    let incorporation_days_ago = if is_shell && rng.gen_bool(0.4) {
        rng.gen_range(30..180)
    } else {
        365 * rng.gen_range(1..=30)
    };
    let incorporation_date = (now - Duration::days(incorporation_days_ago))
        .format("%Y-%m-%d")
        .to_string();

    let mut sanctions_probability = 0.05;
    if is_shell {
        sanctions_probability += 0.1;
    }
    if SANCTION_PRONE.contains(&jurisdiction.as_str()) {
        sanctions_probability += 0.2;
    }

    let evidence_count = rng.gen_range(1..=EVIDENCE_SOURCES.len());
    let evidence_sources: Vec<String> = EVIDENCE_SOURCES
        .choose_multiple(rng, evidence_count)
        .map(|s| s.to_string())
        .collect();

    let mut entity = Entity::new(name, entity_type, rng.gen_range(0.7..=1.0), evidence_sources);
    entity.registration_number = Some(format!("{jurisdiction}{:07}", rng.gen_range(0..10_000_000)));
    entity.jurisdiction = Some(jurisdiction);
    entity.incorporation_date = Some(incorporation_date);
    entity.directors = Some(directors);
    entity.shareholders = Some(shareholders);
    entity.sanctions_status = rng.gen_bool(sanctions_probability);
    entity.risk_factors = Some(risk_factors(entity_type, rng));
    entity.reputation_score = Some(reputation_score(entity_type, rng));
    entity
}

fn risk_factors(entity_type: EntityType, rng: &mut impl Rng) -> HashMap<String, f64> {
    let mut factors = HashMap::new();

    if entity_type == EntityType::ShellCompany {
        factors.insert("shell_structure".to_string(), rng.gen_range(0.6..0.9));
        factors.insert("complex_ownership".to_string(), rng.gen_range(0.5..0.8));
    }
    if entity_type == EntityType::FinancialIntermediary {
        factors.insert("high_volume".to_string(), rng.gen_range(0.4..0.7));
    }
    if rng.gen_bool(0.2) {
        factors.insert("news_mention".to_string(), rng.gen_range(0.3..0.7));
    }
    if rng.gen_bool(0.1) {
        factors.insert("regulatory_issue".to_string(), rng.gen_range(0.5..0.9));
    }

    factors
}

fn reputation_score(entity_type: EntityType, rng: &mut impl Rng) -> f64 {
    let (low, high) = match entity_type {
        EntityType::ShellCompany => (0.2, 0.5),
        EntityType::FinancialIntermediary => (0.3, 0.7),
        EntityType::GovernmentAgency => (0.5, 0.8),
        _ => (0.4, 0.9),
    };
    rng.gen_range(low..high)
}
