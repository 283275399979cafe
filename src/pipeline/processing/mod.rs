// Pipeline processing: coercion, resolution, reconciliation, filtering and splitting

pub mod align;
pub mod coerce;
pub mod disposition;
pub mod quality_gate;
pub mod reconcile;
pub mod resolve;
pub mod split;

pub use coerce::{coerce_cell, coerce_str, to_numeric, NumericColumn};
pub use disposition::{detect_mission, map_disposition, map_labels};
pub use resolve::{find_column, resolve, resolve_field};
