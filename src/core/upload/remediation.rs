//! Failed-task remediation table
//!
//! The registry reports failures as Dutch-language diagnostic text in the
//! task log. A small set of signatures is known to be mechanically
//! fixable; everything else is left untouched for manual handling and is
//! never retried automatically.

use regex::Regex;

/// The reported event predates the last registered event; replay the same
/// document as an insert.
pub const SIG_EVENT_BEFORE_LATEST: &str = "mag niet voor de laatst geregistreerde gebeurtenis";

/// The event date lies before the well's construction date; the message
/// quotes the construction date.
pub const SIG_DATE_BEFORE_CONSTRUCTION: &str = "moet liggen na of op de inrichtingsdatum";

/// The document was already delivered through the bronhouderportaal; the
/// failure is a false negative.
pub const SIG_ALREADY_DELIVERED: &str = "al eerder via het bronhouderportaal aangeleverd";

/// A mechanical fix derived from a failed task's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remediation {
    /// Patch the correction reason to self-correction, then patch the
    /// request type to `insert`.
    ReplayAsInsert,
    /// Patch the document's event date to the quoted construction date.
    CorrectEventDate(String),
    /// Force the task to `COMPLETED`/100%/empty log; nothing was actually
    /// wrong.
    MarkDelivered,
}

/// Matches a task log against the remediation table. Signatures are exact,
/// case-sensitive substrings; the first matching row wins. Returns `None`
/// for anything unrecognized — those tasks stay put for manual handling.
pub fn diagnose(log: &str) -> Option<Remediation> {
    if log.contains(SIG_EVENT_BEFORE_LATEST) {
        return Some(Remediation::ReplayAsInsert);
    }

    if log.contains(SIG_DATE_BEFORE_CONSTRUCTION) {
        // The second ISO date in the message is the construction date.
        let date_re = Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap();
        let dates: Vec<&str> = date_re.find_iter(log).map(|m| m.as_str()).collect();
        if let Some(construction_date) = dates.get(1) {
            return Some(Remediation::CorrectEventDate((*construction_date).to_string()));
        }
        return None;
    }

    if log.contains(SIG_ALREADY_DELIVERED) {
        return Some(Remediation::MarkDelivered);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_before_latest() {
        let log = "De datum van de gebeurtenis mag niet voor de laatst geregistreerde gebeurtenis liggen.";
        assert_eq!(diagnose(log), Some(Remediation::ReplayAsInsert));
    }

    #[test]
    fn test_date_before_construction_extracts_second_date() {
        let log = "De opgegeven datum 2021-03-01 moet liggen na of op de inrichtingsdatum 2022-05-17.";
        assert_eq!(
            diagnose(log),
            Some(Remediation::CorrectEventDate("2022-05-17".to_string()))
        );
    }

    #[test]
    fn test_date_before_construction_without_two_dates_is_manual() {
        let log = "De datum moet liggen na of op de inrichtingsdatum.";
        assert_eq!(diagnose(log), None);
    }

    #[test]
    fn test_already_delivered() {
        let log = "Dit brondocument is al eerder via het bronhouderportaal aangeleverd aan de BRO.";
        assert_eq!(diagnose(log), Some(Remediation::MarkDelivered));
    }

    #[test]
    fn test_unknown_signature_left_for_manual_handling() {
        assert_eq!(diagnose("XML is not valid"), None);
        assert_eq!(diagnose(""), None);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let log = "DIT BRONDOCUMENT IS AL EERDER VIA HET BRONHOUDERPORTAAL AANGELEVERD";
        assert_eq!(diagnose(log), None);
    }
}
