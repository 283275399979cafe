pub mod inference;
pub mod ports;
pub mod prepare_use_case;
