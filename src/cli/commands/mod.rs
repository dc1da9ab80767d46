pub mod adjust;
pub mod config;
