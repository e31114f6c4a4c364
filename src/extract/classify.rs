use crate::core::EntityType;

/// Non-profit indicators, checked first.
const NONPROFIT_INDICATORS: &[&str] = &[
    "foundation",
    "charity",
    "ngo",
    "non-profit",
    "nonprofit",
    "association",
    "society",
    "trust",
];

/// Shell-company indicators, checked before corporate suffixes so that
/// "Quantum Holdings Ltd" reads as a shell, not a plain corporation.
const SHELL_INDICATORS: &[&str] = &[
    "holdings",
    "investments",
    "group",
    "capital",
    "partners",
    "management",
    "consulting",
    "advisory",
];

/// Corporate legal-form suffixes, with and without trailing period.
const CORPORATE_SUFFIXES: &[&str] = &[
    "inc",
    "inc.",
    "corp",
    "corp.",
    "corporation",
    "ltd",
    "ltd.",
    "limited",
    "llc",
    "gmbh",
    "s.a.",
    "s.p.a.",
    "plc",
];

const GOVERNMENT_KEYWORDS: &[&str] = &["government", "ministry", "department", "agency"];

const FINANCIAL_KEYWORDS: &[&str] = &["bank", "financial", "investment", "fund"];

/// True if the lowercased name ends with the indicator or carries it as a
/// whole word. Token matching is what lets "Example Foundation Inc" hit the
/// non-profit tier even though "inc" terminates the name.
fn has_indicator(lower: &str, indicator: &str) -> bool {
    lower.ends_with(indicator) || lower.split_whitespace().any(|token| token == indicator)
}

/// Map a display name to an entity type.
///
/// Pure, total, case-insensitive. Categories overlap by keyword, so the
/// tiers are checked in fixed priority order and the first match wins.
pub fn classify(name: &str) -> EntityType {
    let lower = name.to_lowercase();

    if NONPROFIT_INDICATORS.iter().any(|i| has_indicator(&lower, i)) {
        return EntityType::NonProfit;
    }
    if SHELL_INDICATORS.iter().any(|i| has_indicator(&lower, i)) {
        return EntityType::ShellCompany;
    }
    if CORPORATE_SUFFIXES.iter().any(|i| has_indicator(&lower, i)) {
        return EntityType::Corporation;
    }
    if GOVERNMENT_KEYWORDS.iter().any(|w| lower.contains(w)) {
        return EntityType::GovernmentAgency;
    }
    if FINANCIAL_KEYWORDS.iter().any(|w| lower.contains(w)) {
        return EntityType::FinancialIntermediary;
    }

    EntityType::Unknown
}

/// Classification confidence for a name/type pair, in [0.5, 1.0].
pub fn confidence(name: &str, entity_type: EntityType) -> f64 {
    let mut score: f64 = 0.5;

    if entity_type != EntityType::Unknown {
        score += 0.3;
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        score += 0.1;
    }
    if name.chars().any(|c| c.is_ascii_digit()) {
        score += 0.1;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonprofit_precedes_corporate_suffix() {
        assert_eq!(classify("Example Foundation Inc"), EntityType::NonProfit);
    }

    #[test]
    fn nonprofit_precedes_financial() {
        // "trust" wins over "bank" by tier order.
        assert_eq!(classify("Global Trust Bank"), EntityType::NonProfit);
    }

    #[test]
    fn shell_precedes_corporate_suffix() {
        assert_eq!(classify("Quantum Holdings Ltd"), EntityType::ShellCompany);
    }

    #[test]
    fn corporate_suffixes() {
        assert_eq!(classify("Acme Corp"), EntityType::Corporation);
        assert_eq!(classify("Acme Inc."), EntityType::Corporation);
        assert_eq!(classify("Vertex GmbH"), EntityType::Corporation);
        assert_eq!(classify("Banca Nova S.p.A."), EntityType::Corporation);
    }

    #[test]
    fn government_keywords_are_substring_matched() {
        assert_eq!(classify("Ministry of Finance"), EntityType::GovernmentAgency);
        assert_eq!(
            classify("Interagency Task Force"),
            EntityType::GovernmentAgency
        );
    }

    #[test]
    fn financial_keywords() {
        assert_eq!(
            classify("First National Bank"),
            EntityType::FinancialIntermediary
        );
        assert_eq!(
            classify("Pension Fund of Norway"),
            EntityType::FinancialIntermediary
        );
    }

    #[test]
    fn unknown_fallback() {
        assert_eq!(classify("Mystery Ventures"), EntityType::Unknown);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("acme corp"), EntityType::Corporation);
        assert_eq!(classify("ACME CORP"), EntityType::Corporation);
    }

    #[test]
    fn confidence_base_for_unknown_lowercase() {
        assert!((confidence("mystery ventures", EntityType::Unknown) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn confidence_adds_type_and_uppercase() {
        let c = confidence("Acme Corp", EntityType::Corporation);
        assert!((c - 0.9).abs() < 1e-9);
    }

    #[test]
    fn confidence_capped_at_one() {
        let c = confidence("Area 51 Inc", EntityType::Corporation);
        assert!((c - 1.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_in_unit_interval_for_all_types() {
        for ty in [
            EntityType::Corporation,
            EntityType::NonProfit,
            EntityType::ShellCompany,
            EntityType::GovernmentAgency,
            EntityType::FinancialIntermediary,
            EntityType::Unknown,
        ] {
            let c = confidence("Test 9 Name", ty);
            assert!((0.0..=1.0).contains(&c));
        }
    }
}
