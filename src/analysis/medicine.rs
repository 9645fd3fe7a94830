use std::collections::BTreeSet;

use super::patterns::PATTERN_LIBRARY;

/// Heuristically spot medicine-like tokens in free text.
///
/// Every pattern in the library is applied independently and each match is
/// kept verbatim (no case or whitespace normalization), so "Aspirin" and
/// "aspirin" would be two distinct entries. The result is a set: repeated
/// matches collapse. No precision or recall is promised.
pub fn extract_medicines(text: &str) -> BTreeSet<String> {
    let mut medicines = BTreeSet::new();
    if text.is_empty() {
        return medicines;
    }

    for pattern in PATTERN_LIBRARY.iter() {
        for found in pattern.regex.find_iter(text) {
            tracing::trace!(family = ?pattern.family, matched = found.as_str(), "Medicine pattern hit");
            medicines.insert(found.as_str().to_string());
        }
    }

    medicines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_empty_set() {
        assert!(extract_medicines("").is_empty());
    }

    #[test]
    fn test_prescription_sentence() {
        let found = extract_medicines("Take Metformin 500mg daily and Lisinopril 10mg at night");

        assert!(found.contains("Lisinopril"));
        assert!(
            found
                .iter()
                .any(|m| m.contains("500mg") && m.split_whitespace().any(|w| w
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_uppercase()))),
            "expected a dosage match around 500mg, got {:?}",
            found
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "Aspirin 81mg, Atorvastatin 40 mg and Omeprazole before breakfast.";
        assert_eq!(extract_medicines(text), extract_medicines(text));
    }

    #[test]
    fn test_repeated_mentions_collapse() {
        let found = extract_medicines("Aspirin in the morning. Aspirin at night. Aspirin.");
        assert_eq!(found.iter().filter(|m| m.as_str() == "Aspirin").count(), 1);
    }

    #[test]
    fn test_overlapping_patterns_keep_each_match() {
        let found = extract_medicines("Ibuprofen 200mg");
        assert!(found.contains("Ibuprofen"));
        assert!(found.contains("Ibuprofen 200mg"));
    }

    #[test]
    fn test_spelling_variants_stay_separate() {
        let found = extract_medicines("Aspirin 81mg and aspirin");
        assert!(found.contains("Aspirin"));
        assert!(found.contains("Aspirin 81mg"));
        assert!(!found.iter().any(|m| m.starts_with("aspirin")));

        let found = extract_medicines("Aspirin 81mg, later Aspirin 81 mg");
        assert!(found.contains("Aspirin 81mg"));
        assert!(found.contains("Aspirin 81 mg"));
    }

    #[test]
    fn test_plain_prose_has_no_otc_hits() {
        let found = extract_medicines("feeling better today, walked the dog");
        assert!(found.is_empty());
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        let found = extract_medicines("\u{0}\u{FFFD} 12 mg \n\t Δ");
        assert!(found.is_empty());
    }
}
