//! Domain shapes shared across the pipeline: the canonical feature set, the
//! feature matrix built over it, missions and labels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants;

pub const N_FEATURES: usize = 8;

/// One of the eight standardized measurements used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    PeriodD,
    DurationH,
    DepthPpm,
    Snr,
    PlanetRadiusRe,
    StellarTeffK,
    StellarLogg,
    StellarRadiusRs,
}

impl CanonicalField {
    /// Fixed column order of every feature matrix.
    pub const ALL: [CanonicalField; N_FEATURES] = [
        CanonicalField::PeriodD,
        CanonicalField::DurationH,
        CanonicalField::DepthPpm,
        CanonicalField::Snr,
        CanonicalField::PlanetRadiusRe,
        CanonicalField::StellarTeffK,
        CanonicalField::StellarLogg,
        CanonicalField::StellarRadiusRs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::PeriodD => "period_d",
            CanonicalField::DurationH => "duration_h",
            CanonicalField::DepthPpm => "depth_ppm",
            CanonicalField::Snr => "snr",
            CanonicalField::PlanetRadiusRe => "planet_radius_re",
            CanonicalField::StellarTeffK => "stellar_teff_k",
            CanonicalField::StellarLogg => "stellar_logg",
            CanonicalField::StellarRadiusRs => "stellar_radius_rs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// Position of this field in [`CanonicalField::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Known source-column names for this field, in resolution priority.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::PeriodD => constants::ALIAS_PERIOD,
            CanonicalField::DurationH => constants::ALIAS_DURATION,
            CanonicalField::DepthPpm => constants::ALIAS_DEPTH,
            CanonicalField::Snr => constants::ALIAS_SNR,
            CanonicalField::PlanetRadiusRe => constants::ALIAS_PLANET_RADIUS,
            CanonicalField::StellarTeffK => constants::ALIAS_STELLAR_TEFF,
            CanonicalField::StellarLogg => constants::ALIAS_STELLAR_LOGG,
            CanonicalField::StellarRadiusRs => constants::ALIAS_STELLAR_RADIUS,
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows over the canonical feature set. Fully numeric, no missing values,
/// row order follows the input that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: Vec<[f64; N_FEATURES]>,
}

impl FeatureMatrix {
    pub fn from_rows(rows: Vec<[f64; N_FEATURES]>) -> Self {
        Self { rows }
    }

    pub fn columns() -> [CanonicalField; N_FEATURES] {
        CanonicalField::ALL
    }

    pub fn column_names() -> Vec<&'static str> {
        CanonicalField::ALL.iter().map(|f| f.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[[f64; N_FEATURES]] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[f64; N_FEATURES]> {
        self.rows.get(idx)
    }

    pub fn column(&self, field: CanonicalField) -> Vec<f64> {
        self.rows.iter().map(|r| r[field.index()]).collect()
    }

    /// New matrix holding the given rows, in the order given.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
        }
    }
}

/// Originating survey of a raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mission {
    #[serde(rename = "KOI")]
    Koi,
    K2,
    #[serde(rename = "TOI")]
    Toi,
}

impl Mission {
    /// Detection priority.
    pub const ALL: [Mission; 3] = [Mission::Koi, Mission::K2, Mission::Toi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mission::Koi => "KOI",
            Mission::K2 => "K2",
            Mission::Toi => "TOI",
        }
    }

    pub fn disposition_columns(&self) -> &'static [&'static str] {
        match self {
            Mission::Koi => constants::DISP_KOI,
            Mission::K2 => constants::DISP_K2,
            Mission::Toi => constants::DISP_TOI,
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical disposition class of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    FalsePositive,
    Confirmed,
    Candidate,
    Unknown,
}

impl Label {
    /// Numeric code used in written outputs: 0, 1, 2, or none for Unknown.
    pub fn code(&self) -> Option<u8> {
        match self {
            Label::FalsePositive => Some(0),
            Label::Confirmed => Some(1),
            Label::Candidate => Some(2),
            Label::Unknown => None,
        }
    }

    /// Whether the row belongs to the confirmed / false-positive training set.
    pub fn is_binary(&self) -> bool {
        matches!(self, Label::FalsePositive | Label::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::FalsePositive => "false_positive",
            Label::Confirmed => "confirmed",
            Label::Candidate => "candidate",
            Label::Unknown => "unknown",
        }
    }
}
