pub mod classify;

use std::collections::HashSet;

use regex::Regex;

use crate::core::Entity;

/// Evidence tag for the preposition-anchored phrase pass.
pub const PHRASE_EVIDENCE: &str = "Phrase Extraction";
/// Evidence tag for the corporate-suffix pattern pass.
pub const PATTERN_EVIDENCE: &str = "Pattern Matching";

/// Extracts organization names from free-text transaction descriptions.
///
/// Two passes: capitalized name runs following transactional prepositions
/// ("Payment from X to Y"), then a corporate-suffix sweep over the whole
/// text for names the first pass missed. A name is emitted once per text.
pub struct EntityExtractor {
    phrase_re: Regex,
    suffix_re: Regex,
}

impl EntityExtractor {
    pub fn new() -> Self {
        let phrase_re = Regex::new(
            r"\b(?:from|to|by|with)\s+((?:[A-Z][A-Za-z0-9.&'-]*)(?:\s+(?:[A-Z][A-Za-z0-9.&'-]*|&))*)",
        )
        .expect("valid phrase regex");
        let suffix_re = Regex::new(
            r"\b([A-Z][A-Za-z]*(?:\s+(?:[A-Z][A-Za-z]*|&))*\s+(?i:Inc|Corp|Corporation|Ltd|Limited|LLC|GmbH|PLC)\.?)",
        )
        .expect("valid suffix regex");
        Self {
            phrase_re,
            suffix_re,
        }
    }

    /// Extract, classify and confidence-score every organization name in
    /// the text. Pure function of the input.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for caps in self.phrase_re.captures_iter(text) {
            let name = caps[1].trim();
            self.push_entity(name, PHRASE_EVIDENCE, &mut entities, &mut seen);
        }

        for caps in self.suffix_re.captures_iter(text) {
            let name = caps[1].trim();
            self.push_entity(name, PATTERN_EVIDENCE, &mut entities, &mut seen);
        }

        entities
    }

    fn push_entity(
        &self,
        name: &str,
        evidence: &str,
        entities: &mut Vec<Entity>,
        seen: &mut HashSet<String>,
    ) {
        if name.is_empty() || !seen.insert(name.to_string()) {
            return;
        }
        let entity_type = classify::classify(name);
        let confidence = classify::confidence(name, entity_type);
        entities.push(Entity::new(
            name,
            entity_type,
            confidence,
            vec![evidence.to_string()],
        ));
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityType;

    #[test]
    fn extracts_sender_and_recipient() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Payment from Acme Holdings to Global Trust Bank");

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "Acme Holdings");
        assert_eq!(entities[0].entity_type, EntityType::ShellCompany);
        assert_eq!(entities[0].evidence_sources, vec![PHRASE_EVIDENCE]);
        assert_eq!(entities[1].name, "Global Trust Bank");
        assert_eq!(entities[1].entity_type, EntityType::NonProfit);
    }

    #[test]
    fn suffix_pass_catches_names_without_prepositions() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Meridian Consulting LLC invoice 4471");

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Meridian Consulting LLC");
        assert_eq!(entities[0].evidence_sources, vec![PATTERN_EVIDENCE]);
    }

    #[test]
    fn duplicate_names_emitted_once() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Transfer from Acme Corp to Acme Corp");

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Acme Corp");
    }

    #[test]
    fn phrase_capture_stops_at_lowercase_words() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Service fee from Northwind Partners for consulting");

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Northwind Partners");
    }

    #[test]
    fn no_entities_in_plain_text() {
        let extractor = EntityExtractor::new();
        assert!(extractor.extract("wire reference 20240518-0007").is_empty());
    }

    #[test]
    fn confidence_comes_from_classifier() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Invoice from Acme Corp");
        assert!((entities[0].confidence_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = EntityExtractor::new();
        let text = "Payment from Acme Holdings to Global Trust Bank";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }
}
