use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    /// No disposition column for any known mission. The message lists every
    /// vocabulary that was checked.
    #[error("No disposition column found. Expected one of: {checked}")]
    Schema { checked: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Cannot stratify split: {0}")]
    Stratification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;
