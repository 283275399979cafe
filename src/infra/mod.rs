pub mod csv_output_adapter;

pub use csv_output_adapter::{write_aligned_csv, write_feature_csv, CsvOutputAdapter};
