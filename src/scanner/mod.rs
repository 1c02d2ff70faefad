//! Local sensitive-data scanner
//!
//! Scans extracted document text for PII before anything leaves the machine.
//! The scan is pure and synchronous: same text in, same result out, no I/O
//! and no failure mode. Detection is best-effort heuristic filtering, not
//! certified redaction, and the masked values are for display only — after
//! consent the unredacted document is still what gets transmitted.

mod detectors;

pub use detectors::SensitiveCategory;

use detectors::BATTERY;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentence used when a scan finds nothing
pub const NO_SENSITIVE_DATA_SUMMARY: &str = "No se detectaron datos sensibles";

/// One detected piece of sensitive data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitiveMatch {
    /// Category of the first detector that claimed this value
    #[serde(rename = "type")]
    pub category: SensitiveCategory,
    /// Exact substring matched in the source text; lives only as long as
    /// this scan result
    pub value: String,
    /// Display-safe partial masking of `value`
    pub redacted: String,
}

/// Outcome of scanning one document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub has_sensitive_data: bool,
    /// Matches in detection order, unique by matched value
    pub matches: Vec<SensitiveMatch>,
    /// Human-readable per-category count sentence
    pub summary: String,
}

impl ScanResult {
    /// Result for a document with nothing detected
    pub fn empty() -> Self {
        Self {
            has_sensitive_data: false,
            matches: Vec::new(),
            summary: NO_SENSITIVE_DATA_SUMMARY.to_string(),
        }
    }
}

/// Run the full detector battery over `text`.
///
/// Every detector scans the entire text; the same literal value is reported
/// at most once, attributed to the first detector that found it. Malformed
/// or empty input simply produces zero matches.
pub fn scan_sensitive_data(text: &str) -> ScanResult {
    let mut matches: Vec<SensitiveMatch> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for detector in BATTERY.iter() {
        for found in detector.pattern.find_iter(text) {
            let value = found.as_str();
            if seen.insert(value) {
                matches.push(SensitiveMatch {
                    category: detector.category,
                    value: value.to_string(),
                    redacted: (detector.redact)(value),
                });
            }
        }
    }

    if !matches.is_empty() {
        tracing::debug!(
            "[Scanner] {} sensitive value(s) detected across {} categories",
            matches.len(),
            SensitiveCategory::ALL
                .iter()
                .filter(|c| matches.iter().any(|m| m.category == **c))
                .count()
        );
    }

    let summary = summarize(&matches);
    ScanResult {
        has_sensitive_data: !matches.is_empty(),
        matches,
        summary,
    }
}

/// Combine two per-document scans into the consent payload for the dual
/// (comparison) flow. Returns `None` when neither document has sensitive
/// data, so the caller can skip the consent step entirely.
pub fn merge_labeled(first: &ScanResult, second: &ScanResult) -> Option<ScanResult> {
    if !first.has_sensitive_data && !second.has_sensitive_data {
        return None;
    }

    let matches = first
        .matches
        .iter()
        .chain(second.matches.iter())
        .cloned()
        .collect();

    let summary = [
        first
            .has_sensitive_data
            .then(|| format!("Contrato 1: {}", first.summary)),
        second
            .has_sensitive_data
            .then(|| format!("Contrato 2: {}", second.summary)),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(". ");

    Some(ScanResult {
        has_sensitive_data: true,
        matches,
        summary,
    })
}

fn summarize(matches: &[SensitiveMatch]) -> String {
    if matches.is_empty() {
        return NO_SENSITIVE_DATA_SUMMARY.to_string();
    }

    let parts: Vec<String> = SensitiveCategory::ALL
        .iter()
        .filter_map(|category| {
            let count = matches.iter().filter(|m| m.category == *category).count();
            (count > 0).then(|| format!("{count} {}", category.label()))
        })
        .collect();

    format!("Se detectaron: {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_has_no_matches() {
        let result = scan_sensitive_data(
            "El presente contrato regula la prestación de servicios entre las partes.",
        );
        assert!(!result.has_sensitive_data);
        assert!(result.matches.is_empty());
        assert_eq!(result.summary, NO_SENSITIVE_DATA_SUMMARY);
    }

    #[test]
    fn test_empty_text_degrades_to_no_matches() {
        assert_eq!(scan_sensitive_data(""), ScanResult::empty());
    }

    #[test]
    fn test_dni_detected_once_with_partial_mask() {
        let result = scan_sensitive_data("El titular con DNI 12345678Z firma el acuerdo.");
        assert!(result.has_sensitive_data);
        assert_eq!(result.matches.len(), 1);
        let m = &result.matches[0];
        assert_eq!(m.category, SensitiveCategory::Dni);
        assert_eq!(m.value, "12345678Z");
        assert_eq!(m.redacted, "123****Z");
    }

    #[test]
    fn test_scan_is_deterministic() {
        let text = "Contacto: juan.perez@example.com, tel. 612 345 678, DNI 12345678Z";
        assert_eq!(scan_sensitive_data(text), scan_sensitive_data(text));
    }

    #[test]
    fn test_repeated_value_reported_once() {
        let result =
            scan_sensitive_data("Escriba a maria@example.com o a maria@example.com de nuevo.");
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn test_ambiguous_value_claimed_by_first_detector() {
        // The compact and block-spaced IBAN patterns both recognize this
        // string; only the compact one (earlier in the battery) reports it,
        // and its masking rule applies.
        let result = scan_sensitive_data("IBAN: ES9121000418450200051332");
        let iban_matches: Vec<_> = result
            .matches
            .iter()
            .filter(|m| m.category == SensitiveCategory::BankAccount)
            .collect();
        assert_eq!(iban_matches.len(), 1);
        assert_eq!(iban_matches[0].redacted, "ES9121****1332");
    }

    #[test]
    fn test_card_grouping_styles_redact_identically() {
        let spaced = scan_sensitive_data("Tarjeta: 4111 1111 1111 1111");
        let compact = scan_sensitive_data("Tarjeta: 4111111111111111");
        assert_eq!(spaced.matches[0].redacted, "**** **** **** 1111");
        assert_eq!(compact.matches[0].redacted, "**** **** **** 1111");
    }

    #[test]
    fn test_summary_lists_only_present_categories() {
        let result = scan_sensitive_data(
            "DNI 12345678Z, email ana@example.com, otro email luis@example.org",
        );
        assert_eq!(result.summary, "Se detectaron: 1 DNI/NIE, 2 emails");
    }

    #[test]
    fn test_scenario_mixed_contact_line() {
        let result =
            scan_sensitive_data("Contact D. Juan Pérez at juan.perez@example.com or 612345678");
        assert!(result.has_sensitive_data);

        let email = result
            .matches
            .iter()
            .find(|m| m.category == SensitiveCategory::Email)
            .expect("email should be detected");
        assert_eq!(email.redacted, "ju***@example.com");

        let phone = result
            .matches
            .iter()
            .find(|m| m.category == SensitiveCategory::Phone)
            .expect("phone should be detected");
        assert_eq!(phone.value, "612345678");
        assert_eq!(phone.redacted, "612***678");

        let name = result
            .matches
            .iter()
            .find(|m| m.category == SensitiveCategory::Name)
            .expect("name should be detected");
        assert_eq!(name.value, "D. Juan Pérez");
        assert_eq!(name.redacted, "D. J***");
    }

    #[test]
    fn test_address_forms() {
        let result = scan_sensitive_data("Domicilio en Calle Mayor 5, 28013 Madrid");
        let addresses: Vec<_> = result
            .matches
            .iter()
            .filter(|m| m.category == SensitiveCategory::Address)
            .collect();
        assert!(!addresses.is_empty());
        assert!(addresses.iter().any(|m| m.redacted.starts_with("Calle Mayor")));
    }

    #[test]
    fn test_merge_labeled_combines_summaries() {
        let first = scan_sensitive_data("DNI 12345678Z");
        let second = scan_sensitive_data("email ana@example.com");
        let merged = merge_labeled(&first, &second).expect("should merge");
        assert!(merged.has_sensitive_data);
        assert_eq!(merged.matches.len(), 2);
        assert_eq!(
            merged.summary,
            "Contrato 1: Se detectaron: 1 DNI/NIE. Contrato 2: Se detectaron: 1 emails"
        );
    }

    #[test]
    fn test_merge_labeled_skips_clean_side() {
        let clean = ScanResult::empty();
        let dirty = scan_sensitive_data("tel. 612345678");
        let merged = merge_labeled(&clean, &dirty).expect("one dirty side merges");
        assert_eq!(merged.summary, "Contrato 2: Se detectaron: 1 teléfonos");

        assert!(merge_labeled(&clean, &ScanResult::empty()).is_none());
    }

    #[test]
    fn test_match_serializes_with_original_field_names() {
        let result = scan_sensitive_data("DNI 12345678Z");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["hasSensitiveData"], true);
        assert_eq!(json["matches"][0]["type"], "dni");
        assert!(json["matches"][0].get("value").is_some());
        assert!(json["matches"][0].get("redacted").is_some());
    }
}
