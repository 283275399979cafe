pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod table;

pub use config::PrepConfig;
pub use domain::{CanonicalField, FeatureMatrix, Label, Mission, N_FEATURES};
pub use error::{PrepError, Result};
pub use pipeline::{align, fit_and_split, AlignConfig, FittedState, Preprocessor, SplitResult};
pub use table::{Cell, Column, RawTable};
