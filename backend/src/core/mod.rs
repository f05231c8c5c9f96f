//! Numeric foundations shared by the solver and the apportioner

pub mod rate;

pub use rate::{Rate, RATE_SCALE};
