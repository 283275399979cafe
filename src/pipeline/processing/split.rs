//! Label partitioning and the seeded stratified holdout split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::domain::Label;
use crate::error::{PrepError, Result};
use crate::observability::metrics;

/// Row indices grouped by what they are used for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Confirmed and false-positive rows.
    pub binary: Vec<usize>,
    pub candidates: Vec<usize>,
    /// Rows discarded for an unrecognized disposition.
    pub unknown: usize,
}

/// Partition `rows` (indices into `labels`) by label, keeping input order.
pub fn partition_labels(labels: &[Label], rows: &[usize]) -> Partition {
    let mut partition = Partition::default();
    for &row in rows {
        let label = labels[row];
        metrics::partition::label_seen(label);
        match label {
            Label::Confirmed | Label::FalsePositive => partition.binary.push(row),
            Label::Candidate => partition.candidates.push(row),
            Label::Unknown => partition.unknown += 1,
        }
    }
    if partition.unknown > 0 {
        debug!("Discarded {} rows with unknown disposition", partition.unknown);
    }
    partition
}

/// Split positions of `labels` into (train, test) so every class keeps its
/// share in both parts.
///
/// Each class contributes `ceil(n_class * test_size)` rows to the test part,
/// drawn after a seeded shuffle of that class, so any class with two or more
/// members reaches both parts unless the holdout would take all of it. Both returned lists are
/// sorted, so a split is reproducible for a given seed and input.
pub fn stratified_split(
    labels: &[Label],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PrepError::Config(format!(
            "test_size must be strictly between 0 and 1, got {}",
            test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [Label::FalsePositive, Label::Confirmed, Label::Candidate, Label::Unknown] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == class)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }

        let n = members.len();
        // Tolerance keeps products like 10 * 0.2 from rounding up past 2.
        let n_test = (n as f64 * test_size - 1e-9).ceil().max(0.0) as usize;
        if n < 2 || n_test == 0 || n_test >= n {
            return Err(PrepError::Stratification(format!(
                "class '{}' has {} member(s); a {:.0}% holdout would leave one side without it",
                class.as_str(),
                n,
                test_size * 100.0
            )));
        }

        members.shuffle(&mut rng);
        debug!("Class {}: {} train, {} test", class.as_str(), n - n_test, n_test);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}
