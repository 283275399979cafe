mod common;

use exoprep::{fit_and_split, Label, Mission, N_FEATURES};

#[test]
fn test_koi_table_end_to_end() {
    let raw = common::koi_table(&common::dispositions(40, 40, 20));
    let result = fit_and_split(&raw, 0.2, 42).unwrap();

    assert_eq!(result.state.mission, Mission::Koi);
    assert_eq!(result.state.id_column.as_deref(), Some("kepoi_name"));

    assert_eq!(result.train_features.len() + result.valid_features.len(), 80);
    assert_eq!(result.train_features.len(), 64);
    assert_eq!(result.valid_features.len(), 16);
    assert_eq!(result.train_labels.len(), 64);

    // Stratified: both partitions keep the 50/50 balance.
    let confirmed = |labels: &[Label]| labels.iter().filter(|l| **l == Label::Confirmed).count();
    assert_eq!(confirmed(&result.train_labels), 32);
    assert_eq!(confirmed(&result.valid_labels), 8);

    assert_eq!(result.candidates.len(), 20);
    assert_eq!(result.candidates.features.len(), 20);
    let ids = result.candidates.ids.as_ref().unwrap();
    for (k, row) in result.candidates.features.rows().iter().enumerate() {
        assert_eq!(row.len(), N_FEATURES);
        assert!(row.iter().all(|v| v.is_finite()));
        assert_eq!(ids[k], Some(format!("K{:05}.01", 81 + k)));
    }

    assert_eq!(result.incomplete_rows, 0);
    assert_eq!(result.unknown_rows, 0);
}

#[test]
fn test_every_canonical_field_is_bound_for_koi() {
    let raw = common::koi_table(&common::dispositions(10, 10, 0));
    let result = fit_and_split(&raw, 0.2, 42).unwrap();

    let sources: Vec<_> = result
        .state
        .bindings
        .iter()
        .map(|b| b.source.clone().unwrap())
        .collect();
    assert_eq!(sources, common::KOI_FEATURE_COLUMNS.to_vec());
}

#[test]
fn test_features_match_source_values() {
    let raw = common::koi_table(&common::dispositions(10, 10, 5));
    let result = fit_and_split(&raw, 0.2, 42).unwrap();

    for (k, &row) in result.valid_rows.iter().enumerate() {
        let features = result.valid_features.row(k).unwrap();
        for f in 0..N_FEATURES {
            assert_eq!(features[f], common::value(row, f));
        }
    }
}
