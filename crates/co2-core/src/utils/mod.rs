//! Utility functions for data repair and numerical optimisation

pub mod optimization;
pub mod preprocessing;

pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use preprocessing::{backward_fill, fill_missing, forward_fill};
