//! Disposition text to [`Label`] mapping and mission detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Label, Mission};
use crate::error::{PrepError, Result};
use crate::table::{Cell, RawTable};

static CONFIRMED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bCONFIRM|\bKP\b|\bCP\b").expect("confirmed pattern is valid"));
static FALSE_POSITIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"FALSE|\bFP\b|\bFA\b").expect("false-positive pattern is valid"));
static CANDIDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CANDID|\bPC\b|\bAPC\b").expect("candidate pattern is valid"));

/// Map one disposition value.
///
/// The three patterns are tested in the order confirmed, false positive,
/// candidate and a later match overwrites an earlier one, so "CONFIRMED
/// CANDIDATE" is a candidate.
pub fn map_disposition(value: &str) -> Label {
    let text = value.trim().to_uppercase();
    let mut label = Label::Unknown;
    if CONFIRMED_RE.is_match(&text) {
        label = Label::Confirmed;
    }
    if FALSE_POSITIVE_RE.is_match(&text) {
        label = Label::FalsePositive;
    }
    if CANDIDATE_RE.is_match(&text) {
        label = Label::Candidate;
    }
    label
}

pub fn map_cell(cell: &Cell) -> Label {
    match cell.to_text() {
        Some(text) => map_disposition(&text),
        None => Label::Unknown,
    }
}

/// Map a whole disposition column. The vocabulary is shared by every
/// mission; `_mission` documents where the column came from.
pub fn map_labels(cells: &[Cell], _mission: Mission) -> Vec<Label> {
    cells.iter().map(map_cell).collect()
}

/// Find the mission and the actual disposition column name, in mission
/// priority order.
pub fn detect_mission(table: &RawTable) -> Result<(Mission, String)> {
    for mission in Mission::ALL {
        for candidate in mission.disposition_columns() {
            if let Some(column) = table.column_ci(candidate) {
                return Ok((mission, column.name.clone()));
            }
        }
    }

    let checked = Mission::ALL
        .iter()
        .map(|m| format!("{} {:?}", m, m.disposition_columns()))
        .collect::<Vec<_>>()
        .join(", ");
    Err(PrepError::Schema { checked })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_literal_coverage() {
        assert_eq!(map_disposition("CONFIRMED PLANET"), Label::Confirmed);
        assert_eq!(map_disposition("FALSE POSITIVE"), Label::FalsePositive);
        assert_eq!(map_disposition("CANDIDATE"), Label::Candidate);
        assert_eq!(map_disposition("KP"), Label::Confirmed);
        assert_eq!(map_disposition("FP"), Label::FalsePositive);
        assert_eq!(map_disposition("PC"), Label::Candidate);
        assert_eq!(map_disposition("unrecognized-xyz"), Label::Unknown);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(map_disposition("  confirmed "), Label::Confirmed);
        assert_eq!(map_disposition("fa"), Label::FalsePositive);
        assert_eq!(map_disposition("apc"), Label::Candidate);
        assert_eq!(map_disposition("cp"), Label::Confirmed);
    }

    #[test]
    fn test_tokens_need_word_boundaries() {
        assert_eq!(map_disposition("KPX"), Label::Unknown);
        assert_eq!(map_disposition("UNCONFIRMED"), Label::Unknown);
    }

    #[test]
    fn test_later_pattern_overwrites() {
        assert_eq!(map_disposition("CONFIRMED CANDIDATE"), Label::Candidate);
        assert_eq!(map_disposition("KP / FP"), Label::FalsePositive);
    }

    #[test]
    fn test_missing_is_unknown() {
        let labels = map_labels(&[Cell::Missing, Cell::from("CP")], Mission::Toi);
        assert_eq!(labels, vec![Label::Unknown, Label::Confirmed]);
    }

    #[test]
    fn test_detect_mission_priority() {
        let table = RawTable::new(vec![
            Column::new("tfopwg_disp", vec![]),
            Column::new("Disposition", vec![]),
        ])
        .unwrap();
        let (mission, column) = detect_mission(&table).unwrap();
        assert_eq!(mission, Mission::K2);
        assert_eq!(column, "Disposition");
    }

    #[test]
    fn test_detect_mission_failure_lists_vocabularies() {
        let table = RawTable::new(vec![Column::new("status", vec![])]).unwrap();
        match detect_mission(&table) {
            Err(PrepError::Schema { checked }) => {
                assert!(checked.contains("koi_disposition"));
                assert!(checked.contains("k2_disposition"));
                assert!(checked.contains("tfopwg_disp"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
