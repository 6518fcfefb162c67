//! C FFI bindings for the modulated filter
//!
//! Exposes [`ModFilter`] to C/Swift hosts through an opaque handle. The host
//! owns parameter storage and pushes values through `modfilter_set_param`;
//! the render functions run on the audio thread.

use std::slice;

use crate::engine::{ModFilter, ProcessSpec};
use crate::params::ParamId;

// =============================================================================
// Parameter indices (must match the host's parameter enum)
// =============================================================================

/// Cutoff frequency (20-20000 Hz)
pub const PARAM_CUTOFF: u32 = 0;
/// Resonance / Q (0.3-3)
pub const PARAM_RESONANCE: u32 = 1;
/// Filter type: 0 low-pass, 1 high-pass, 2 band-pass, 3 all-pass
pub const PARAM_FILTER_TYPE: u32 = 2;
/// LFO on/off (>= 0.5 is on)
pub const PARAM_LFO_ENABLED: u32 = 3;
/// LFO waveform: 0 sine, 1 ramp up, 2 ramp down, 3 square
pub const PARAM_LFO_WAVEFORM: u32 = 4;
/// LFO depth (1-10000 Hz)
pub const PARAM_LFO_DEPTH: u32 = 5;
/// LFO rate (0.1-100 Hz)
pub const PARAM_LFO_RATE: u32 = 6;
/// Tempo sync on/off (>= 0.5 is on)
pub const PARAM_LFO_SYNC: u32 = 7;

// =============================================================================
// Lifecycle
// =============================================================================

/// Create a new filter with default parameters
///
/// A `sample_rate` that is not a positive number falls back to 44100 Hz.
/// Call `modfilter_prepare` with the real stream format before rendering.
///
/// # Returns
/// Pointer to a new ModFilter. Must be freed with `modfilter_free`.
#[no_mangle]
pub extern "C" fn modfilter_new(sample_rate: f64) -> *mut ModFilter {
    Box::into_raw(Box::new(ModFilter::new(sample_rate)))
}

/// Free a filter
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
/// After calling this function, the pointer is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn modfilter_free(filter: *mut ModFilter) {
    if !filter.is_null() {
        drop(Box::from_raw(filter));
    }
}

/// Configure for a stream. Call before rendering and whenever the sample
/// rate, block size or channel count changes.
///
/// # Returns
/// `true` on success; `false` for a null handle or an invalid configuration,
/// in which case the previous configuration stays in effect.
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn modfilter_prepare(
    filter: *mut ModFilter,
    sample_rate: f64,
    max_block_size: u32,
    num_channels: u32,
) -> bool {
    let Some(filter) = filter.as_mut() else {
        return false;
    };
    let spec = ProcessSpec::new(sample_rate, max_block_size as usize, num_channels as usize);
    match filter.prepare(spec) {
        Ok(()) => true,
        Err(err) => {
            log::error!("prepare rejected: {err:#}");
            false
        }
    }
}

/// Clear filter history, LFO phase and parameter ramps
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn modfilter_reset(filter: *mut ModFilter) {
    if let Some(filter) = filter.as_mut() {
        filter.reset();
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Number of parameters exposed through `modfilter_set_param`
#[no_mangle]
pub extern "C" fn modfilter_param_count() -> u32 {
    ParamId::COUNT
}

/// Set a parameter (see PARAM_* constants). Unknown indices are ignored.
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn modfilter_set_param(filter: *mut ModFilter, param: u32, value: f32) {
    let Some(filter) = filter.as_mut() else {
        return;
    };
    if let Some(id) = ParamId::from_index(param) {
        filter.set_param(id, value);
    }
}

/// Report the host tempo. Pass a value <= 0 when the host has no tempo.
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn modfilter_set_host_bpm(filter: *mut ModFilter, bpm: f64) {
    if let Some(filter) = filter.as_mut() {
        filter.set_host_bpm((bpm > 0.0).then_some(bpm));
    }
}

/// Whether synced modulation is currently running at the free rate because
/// the host has no tempo
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn modfilter_sync_fallback(filter: *const ModFilter) -> bool {
    filter.as_ref().map_or(false, |filter| filter.sync_fallback())
}

// =============================================================================
// Audio rendering
// =============================================================================

/// Filter a single sample. Channel 0 starts a new frame.
///
/// # Safety
/// `filter` must be a valid pointer returned by `modfilter_new`, or null.
/// A null handle passes the input through.
#[no_mangle]
pub unsafe extern "C" fn modfilter_process_sample(
    filter: *mut ModFilter,
    channel: u32,
    input: f32,
) -> f32 {
    match filter.as_mut() {
        Some(filter) => filter.process_sample(channel as usize, input),
        None => input,
    }
}

/// Filter an interleaved buffer in place, laid out with the prepared
/// channel count
///
/// # Arguments
/// * `filter` - Pointer to a ModFilter
/// * `buffer` - Interleaved samples
/// * `frames` - Number of frames in `buffer`
///
/// # Safety
/// - `filter` must be a valid pointer returned by `modfilter_new`
/// - `buffer` must point to at least `frames * num_channels` floats
#[no_mangle]
pub unsafe extern "C" fn modfilter_process_interleaved(
    filter: *mut ModFilter,
    buffer: *mut f32,
    frames: u32,
) {
    if filter.is_null() || buffer.is_null() {
        return;
    }

    let filter = &mut *filter;
    let len = frames as usize * filter.spec().num_channels;
    let buffer = slice::from_raw_parts_mut(buffer, len);
    filter.process_interleaved(buffer);
}
