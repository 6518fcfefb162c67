pub mod biquad;

pub use self::biquad::{Biquad, Coefficients, FilterType, MAX_CHANNELS};
