mod common;

use exoprep::pipeline::processing::{coerce_str, map_disposition, resolve_field};
use exoprep::pipeline::{transform, Reconciler};
use exoprep::{align, fit_and_split, AlignConfig, CanonicalField, Cell, Column, Label, PrepError, RawTable};

#[test]
fn test_transform_is_idempotent() {
    let raw = common::koi_table(&common::dispositions(12, 12, 6));
    let state = Reconciler::new().fit(&raw).unwrap();

    let first = transform(&raw, &state);
    let second = transform(&raw, &state);
    assert_eq!(first.features, second.features);
    assert_eq!(first.labels, second.labels);
    assert_eq!(first.ids, second.ids);
}

#[test]
fn test_column_order_does_not_change_features() {
    let raw = common::koi_table(&common::dispositions(12, 12, 6));
    let mut reversed: Vec<Column> = raw.columns().to_vec();
    reversed.reverse();
    let reversed = RawTable::new(reversed).unwrap();

    let a = transform(&raw, &Reconciler::new().fit(&raw).unwrap());
    let b = transform(&reversed, &Reconciler::new().fit(&reversed).unwrap());
    assert_eq!(a.features, b.features);
    assert_eq!(a.labels, b.labels);
}

#[test]
fn test_kepler_and_tess_aliases_resolve_equal() {
    let raw = common::koi_table(&common::dispositions(5, 5, 0));
    let toi = common::toi_table(10);

    for field in CanonicalField::ALL {
        assert_eq!(resolve_field(&raw, field), resolve_field(&toi, field), "{}", field);
    }
    assert_eq!(
        align(&raw, &AlignConfig::default()).unwrap().features,
        align(&toi, &AlignConfig::default()).unwrap().features
    );
}

#[test]
fn test_disposition_literals() {
    let cases = [
        ("CONFIRMED PLANET", Label::Confirmed),
        ("FALSE POSITIVE", Label::FalsePositive),
        ("CANDIDATE", Label::Candidate),
        ("KP", Label::Confirmed),
        ("FP", Label::FalsePositive),
        ("PC", Label::Candidate),
        ("unrecognized-xyz", Label::Unknown),
    ];
    for (text, label) in cases {
        assert_eq!(map_disposition(text), label, "{}", text);
    }
}

#[test]
fn test_unknown_rows_are_in_neither_partition() {
    let mut dispositions = common::dispositions(10, 10, 4);
    dispositions.push("unrecognized-xyz".to_string());
    let raw = common::koi_table(&dispositions);
    let result = fit_and_split(&raw, 0.2, 42).unwrap();

    let unknown_row = dispositions.len() - 1;
    assert!(!result.train_rows.contains(&unknown_row));
    assert!(!result.valid_rows.contains(&unknown_row));
    assert!(!result.candidates.rows.contains(&unknown_row));
    assert_eq!(result.unknown_rows, 1);
}

#[test]
fn test_numeric_coercion() {
    assert_eq!(coerce_str("1,234.5e2"), Some(123450.0));
    assert_eq!(coerce_str("n/a"), None);
    assert_eq!(coerce_str("  3.14 units"), Some(3.14));
}

#[test]
fn test_row_completeness_boundary() {
    // Rows 0-9 confirmed, 10-19 false positive. Blank out features so that
    // row 3 keeps exactly 2 known values and row 4 exactly 3.
    let raw = common::koi_table(&common::dispositions(10, 10, 0));
    let columns: Vec<Column> = raw
        .columns()
        .iter()
        .map(|c| {
            let position = common::KOI_FEATURE_COLUMNS.iter().position(|n| *n == c.name);
            let mut cells = c.cells.clone();
            if let Some(f) = position {
                if f >= 2 {
                    cells[3] = Cell::Missing;
                }
                if f >= 3 {
                    cells[4] = Cell::Missing;
                }
            }
            Column::new(c.name.clone(), cells)
        })
        .collect();
    let raw = RawTable::new(columns).unwrap();
    let state = Reconciler::new().fit(&raw).unwrap();
    let out = transform(&raw, &state);
    assert_eq!(out.raw_counts[3], 2);
    assert_eq!(out.raw_counts[4], 3);

    let result = fit_and_split(&raw, 0.2, 42).unwrap();
    let kept: Vec<usize> = result
        .train_rows
        .iter()
        .chain(result.valid_rows.iter())
        .copied()
        .collect();
    assert_eq!(result.incomplete_rows, 1);
    assert!(!kept.contains(&3));
    assert!(kept.contains(&4));
}

#[test]
fn test_zero_variance_column_is_dropped() {
    let raw = common::koi_table(&common::dispositions(10, 10, 0));
    let mut columns = raw.columns().to_vec();
    columns.push(Column::new("koi_constant_flux", vec![Cell::Number(1.0); 20]));
    let raw = RawTable::new(columns).unwrap();

    let state = Reconciler::new().fit(&raw).unwrap();
    assert!(!state.kept_columns.iter().any(|c| c == "koi_constant_flux"));
    assert!(state.kept_columns.iter().any(|c| c == "koi_period"));
}

#[test]
fn test_stratification_preserves_class_ratio() {
    let raw = common::koi_table(&common::dispositions(30, 20, 0));
    let result = fit_and_split(&raw, 0.2, 3).unwrap();

    let count = |labels: &[Label], l: Label| labels.iter().filter(|x| **x == l).count();
    assert_eq!(count(&result.valid_labels, Label::Confirmed), 6);
    assert_eq!(count(&result.valid_labels, Label::FalsePositive), 4);
    assert_eq!(count(&result.train_labels, Label::Confirmed), 24);
    assert_eq!(count(&result.train_labels, Label::FalsePositive), 16);
}

#[test]
fn test_missing_disposition_column_is_schema_error() {
    let raw = common::toi_table(10);
    match fit_and_split(&raw, 0.2, 42) {
        Err(PrepError::Schema { checked }) => assert!(checked.contains("tfopwg_disp")),
        other => panic!("expected schema error, got {:?}", other.map(|r| r.train_rows)),
    }
}

#[test]
fn test_single_member_class_cannot_be_stratified() {
    let raw = common::koi_table(&common::dispositions(10, 1, 0));
    assert!(matches!(
        fit_and_split(&raw, 0.2, 42),
        Err(PrepError::Stratification(_))
    ));
}
