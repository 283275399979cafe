//! Column-name vocabularies for the Kepler KOI, K2 and TESS TOI exports.
//! Names are compared after trimming; disposition and identifier lookups are
//! case-insensitive.

// Disposition columns per mission, checked in this order.
pub const DISP_KOI: &[&str] = &["koi_disposition", "koi_pdisposition", "koi_disposition_upd"];
pub const DISP_K2: &[&str] = &[
    "k2_disposition",
    "disposition using data from k2",
    "disposition",
    "koi_disposition",
];
pub const DISP_TOI: &[&str] = &["tfopwg_disp"];

/// Substrings marking identifier-like columns (dropped before fitting).
pub const ID_LIKE: &[&str] = &[
    "kepid", "epic", "tic", "rowid", "id", "idx", "index", "archiveid", "ra", "dec", "ra_str",
    "dec_str", "ra_hours", "dec_degs",
    // TESS
    "toi", "toipfx", "ctoi_alias", "pl_pnum", "tid", "toi_created", "rowupdate",
];

/// Substrings marking free-text comment columns (dropped before fitting).
pub const COMMENT_LIKE: &[&str] = &[
    "comment", "comments", "note", "notes", "remarks", "koi_comment", "koi_notes",
];

/// (backup, canonical) pairs; the backup is dropped when both are present.
pub const DUPLICATE_COLUMNS: &[(&str, &str)] = &[("koi_time0bk", "koi_time0")];

/// Human-readable identifiers propagated to candidate output, first match wins.
pub const HUMAN_ID_CANDIDATES: &[&str] =
    &["koi_name", "epic", "tic_id", "epic_id", "kepoi_name", "toi", "tid"];

/// Prefix of the KOI false-positive flag columns, which must be 0, 1 or missing.
pub const FLAG_PREFIX: &str = "koi_fpflag_";

/// Counter columns imputed with a rounded median instead of the mean.
pub const INTEGER_LIKE: &[&str] = &["koi_tce_plnt_num"];

/// Source-column aliases per canonical feature. The canonical name comes
/// first, then mission-specific names, then generic fallbacks.
pub const ALIAS_PERIOD: &[&str] = &[
    "period_d", "koi_period", "pl_orbper", "k2_period", "period", "orbital_period",
];
pub const ALIAS_DURATION: &[&str] = &[
    "duration_h", "koi_duration", "pl_trandurh", "k2_duration", "transit_duration", "duration",
];
pub const ALIAS_DEPTH: &[&str] = &[
    "depth_ppm", "koi_depth", "pl_trandep", "transit_depth", "depth", "delta",
];
pub const ALIAS_SNR: &[&str] = &["snr", "koi_model_snr", "model_snr", "signal_to_noise"];
pub const ALIAS_PLANET_RADIUS: &[&str] = &["planet_radius_re", "koi_prad", "pl_rade", "planet_radius"];
pub const ALIAS_STELLAR_TEFF: &[&str] = &["stellar_teff_k", "koi_steff", "st_teff", "teff"];
pub const ALIAS_STELLAR_LOGG: &[&str] = &["stellar_logg", "koi_slogg", "st_logg", "logg"];
pub const ALIAS_STELLAR_RADIUS: &[&str] = &["stellar_radius_rs", "koi_srad", "st_rad", "stellar_radius"];

/// Column name given to propagated identifiers in candidate output.
pub const OBJECT_ID_COLUMN: &str = "object_id";
