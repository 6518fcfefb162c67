//! Biquad filter with LFO cutoff modulation for real-time audio effects
//!
//! [`ModFilter`] is the processor a host drives: it owns a multi-channel
//! [`Biquad`], an [`Lfo`] that sweeps the cutoff, and a scheduler that
//! limits how often new coefficients are computed. The same core is exposed
//! natively (CPAL), to C hosts through [`ffi`], and offline through
//! `bounce`.

pub mod engine;
pub mod ffi;
pub mod filters;
pub mod gen;
pub mod params;
pub mod utils;

#[cfg(feature = "bounce")]
pub mod bounce;

pub use engine::{Lfo, ModFilter, ModulationScheduler, ProcessSpec, UpdatePeriod};
pub use filters::{Biquad, Coefficients, FilterType};
pub use gen::Waveform;
pub use params::{FilterParams, ParamId};
