// Preparation pipeline: processing stages and the fit-and-split driver

pub mod preprocessor;
pub mod processing;

pub use preprocessor::{fit_and_split, CandidateSet, Preprocessor, SplitResult};
pub use processing::align::{align, AlignConfig, AlignedBatch};
pub use processing::reconcile::{transform, FittedState, Reconciler, TransformOutput};
