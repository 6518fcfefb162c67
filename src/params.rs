//! Parameter layer between the host and the processor
//!
//! The host owns parameter storage. It hands resolved values to the
//! processor either one at a time through [`ParamId`] or as a whole
//! [`FilterParams`] snapshot. Ranges here are the only place values are
//! constrained before they reach the filter.

use crate::filters::FilterType;
use crate::gen::Waveform;

/// Inclusive range and default of a continuous parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Clamp into range; NaN falls back to the default
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

pub const CUTOFF_RANGE: ParamRange = ParamRange::new(20.0, 20000.0, 20000.0);
pub const RESONANCE_RANGE: ParamRange = ParamRange::new(0.3, 3.0, 0.3);
pub const LFO_DEPTH_RANGE: ParamRange = ParamRange::new(1.0, 10000.0, 500.0);
pub const LFO_RATE_RANGE: ParamRange = ParamRange::new(0.1, 100.0, 1.0);

/// Externally visible parameter indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Cutoff,
    Resonance,
    FilterType,
    LfoEnabled,
    LfoWaveform,
    LfoDepth,
    LfoRate,
    LfoSync,
}

impl ParamId {
    pub const COUNT: u32 = 8;

    pub const ALL: [ParamId; 8] = [
        ParamId::Cutoff,
        ParamId::Resonance,
        ParamId::FilterType,
        ParamId::LfoEnabled,
        ParamId::LfoWaveform,
        ParamId::LfoDepth,
        ParamId::LfoRate,
        ParamId::LfoSync,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u32 {
        match self {
            ParamId::Cutoff => 0,
            ParamId::Resonance => 1,
            ParamId::FilterType => 2,
            ParamId::LfoEnabled => 3,
            ParamId::LfoWaveform => 4,
            ParamId::LfoDepth => 5,
            ParamId::LfoRate => 6,
            ParamId::LfoSync => 7,
        }
    }

    /// Stable identifier, matching the host-side parameter ids
    pub fn key(self) -> &'static str {
        match self {
            ParamId::Cutoff => "cutoff",
            ParamId::Resonance => "quality",
            ParamId::FilterType => "fType",
            ParamId::LfoEnabled => "lfoOn",
            ParamId::LfoWaveform => "lfoWave",
            ParamId::LfoDepth => "lfoDepth",
            ParamId::LfoRate => "lfoRate",
            ParamId::LfoSync => "lfoSync",
        }
    }
}

/// Truncate a float-encoded choice to its index. Non-finite values are unmapped.
pub fn choice_index(value: f32) -> Option<i32> {
    value.is_finite().then(|| value as i32)
}

/// Float-encoded toggle: anything at or above 0.5 is on
pub fn toggle(value: f32) -> bool {
    value >= 0.5
}

/// Snapshot of every host-controlled value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub filter_type: FilterType,
    pub lfo_enabled: bool,
    pub lfo_waveform: Waveform,
    pub lfo_depth: f32,
    pub lfo_rate_hz: f32,
    pub lfo_sync: bool,
    /// Host tempo; `None` when the host does not report one
    pub host_bpm: Option<f64>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff_hz: CUTOFF_RANGE.default,
            resonance: RESONANCE_RANGE.default,
            filter_type: FilterType::LowPass,
            lfo_enabled: false,
            lfo_waveform: Waveform::Sine,
            lfo_depth: LFO_DEPTH_RANGE.default,
            lfo_rate_hz: LFO_RATE_RANGE.default,
            lfo_sync: false,
            host_bpm: None,
        }
    }
}

impl FilterParams {
    /// Copy with every continuous value forced into its range
    pub fn clamped(self) -> Self {
        Self {
            cutoff_hz: CUTOFF_RANGE.clamp(self.cutoff_hz),
            resonance: RESONANCE_RANGE.clamp(self.resonance),
            lfo_depth: LFO_DEPTH_RANGE.clamp(self.lfo_depth),
            lfo_rate_hz: LFO_RATE_RANGE.clamp(self.lfo_rate_hz),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_index_round_trip() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_index(id.index()), Some(id));
        }
        assert_eq!(ParamId::from_index(ParamId::COUNT), None);
    }

    #[test]
    fn test_range_clamp() {
        assert_eq!(CUTOFF_RANGE.clamp(5.0), 20.0);
        assert_eq!(CUTOFF_RANGE.clamp(30000.0), 20000.0);
        assert_eq!(RESONANCE_RANGE.clamp(f32::NAN), 0.3);
    }

    #[test]
    fn test_choice_index_truncates() {
        assert_eq!(choice_index(2.9), Some(2));
        assert_eq!(choice_index(0.0), Some(0));
        assert_eq!(choice_index(f32::INFINITY), None);
        assert_eq!(
            choice_index(3.0).and_then(FilterType::from_index),
            Some(FilterType::AllPass)
        );
        assert_eq!(choice_index(7.0).and_then(Waveform::from_index), None);
    }

    #[test]
    fn test_clamped_snapshot() {
        let params = FilterParams {
            cutoff_hz: 1.0,
            resonance: 10.0,
            lfo_depth: 0.0,
            lfo_rate_hz: 1000.0,
            ..FilterParams::default()
        }
        .clamped();

        assert_eq!(params.cutoff_hz, 20.0);
        assert_eq!(params.resonance, 3.0);
        assert_eq!(params.lfo_depth, 1.0);
        assert_eq!(params.lfo_rate_hz, 100.0);
    }
}
