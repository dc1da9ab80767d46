pub mod adjust;
