// Observability: metrics recorded by the pipeline stages

pub mod metrics;

pub use metrics::{init, MetricName};
