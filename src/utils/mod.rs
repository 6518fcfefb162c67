//! Utility modules for audio processing

pub mod logging;
pub mod smoother;

pub use logging::init_logger;
pub use smoother::{SmoothedParam, Smoothing, DEFAULT_SMOOTH_TIME_MS};

/// Linearly map `value` from [in_min, in_max] onto [out_min, out_max].
/// No clamping; `out_min > out_max` reverses the direction of the mapping.
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (out_max - out_min) * ((value - in_min) / (in_max - in_min))
}
