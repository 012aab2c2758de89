pub mod bank;
pub mod biquad;
pub mod design;

pub use bank::FilterBank;
pub use biquad::FilterStage;
pub use design::{compute_coefficients, BiquadCoefficients, FilterShape};
