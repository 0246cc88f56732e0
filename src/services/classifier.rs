//! Label classifier.
//!
//! Management labels follow a fixed textual convention:
//! `"PGD - <process>***<activity>"`. The first label carrying both the
//! marker and the delimiter supplies the (process, activity) pair for
//! every participation row of the issue.

use crate::domain::models::Classification;

/// Prefix marking a process/activity label.
pub const PROCESS_MARKER: &str = "PGD -";

/// Delimiter between the process and activity halves.
pub const PROCESS_DELIMITER: &str = "***";

/// Derive the (process, activity) pair from an ordered label list.
///
/// Only the first matching label is consulted; a label carrying the
/// marker but no delimiter does not match and scanning continues. A
/// malformed match degrades to an absent pair, never an error.
pub fn classify(labels: &[String]) -> Classification {
    labels
        .iter()
        .find(|label| label.starts_with(PROCESS_MARKER) && label.contains(PROCESS_DELIMITER))
        .map_or_else(Classification::default, |label| parse_marker_label(label))
}

fn parse_marker_label(label: &str) -> Classification {
    let Some((_, payload)) = label.split_once('-') else {
        return Classification::default();
    };
    let Some((process, activity)) = payload.split_once(PROCESS_DELIMITER) else {
        return Classification::default();
    };

    Classification {
        process: Some(process.trim().to_string()),
        activity: Some(activity.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_process_and_activity() {
        let result = classify(&labels(&["PGD - Onboarding***Training Setup"]));
        assert_eq!(result.process.as_deref(), Some("Onboarding"));
        assert_eq!(result.activity.as_deref(), Some("Training Setup"));
    }

    #[test]
    fn no_marker_label_yields_absent_pair() {
        let result = classify(&labels(&["bug", "backend", "priority::high"]));
        assert_eq!(result, Classification::default());
    }

    #[test]
    fn empty_list_yields_absent_pair() {
        assert_eq!(classify(&[]), Classification::default());
    }

    #[test]
    fn only_first_matching_label_is_consulted() {
        let result = classify(&labels(&[
            "PGD - First***One",
            "PGD - Second***Two",
        ]));
        assert_eq!(result.process.as_deref(), Some("First"));
        assert_eq!(result.activity.as_deref(), Some("One"));
    }

    #[test]
    fn marker_without_delimiter_does_not_match() {
        let result = classify(&labels(&[
            "PGD - Missing delimiter",
            "PGD - Real***Match",
        ]));
        assert_eq!(result.process.as_deref(), Some("Real"));
        assert_eq!(result.activity.as_deref(), Some("Match"));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let result = classify(&labels(&["PGD -   Planning   ***   Review  "]));
        assert_eq!(result.process.as_deref(), Some("Planning"));
        assert_eq!(result.activity.as_deref(), Some("Review"));
    }

    #[test]
    fn empty_halves_are_preserved_as_empty_strings() {
        // "PGD -***x" parses to an empty process; kept, matching the
        // warehouse's permissive text columns.
        let result = classify(&labels(&["PGD -***Review"]));
        assert_eq!(result.process.as_deref(), Some(""));
        assert_eq!(result.activity.as_deref(), Some("Review"));
    }

    #[test]
    fn classification_is_pure() {
        let input = labels(&["PGD - A***B", "other"]);
        assert_eq!(classify(&input), classify(&input));
    }
}
