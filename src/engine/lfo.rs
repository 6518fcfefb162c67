use crate::gen::{Oscillator, Waveform};
use crate::utils::map_range;

/// Upper bound applied to every LFO-derived cutoff
pub const MAX_MODULATED_CUTOFF_HZ: f32 = 20000.0;

/// Fixed lower anchor of the depth mapping: v = -1 maps to this offset
pub const DEPTH_ANCHOR: f32 = 1.0;

/// Tempo-synced LFO completes one cycle every this many beats
pub const SYNC_BEATS_PER_CYCLE: f64 = 4.0;

/// Map an oscillator value `v` in [-1, 1] onto a cutoff offset in
/// [DEPTH_ANCHOR, depth], add it to `current_cutoff` and cap the result at
/// [`MAX_MODULATED_CUTOFF_HZ`].
///
/// There is no lower bound. With `depth < DEPTH_ANCHOR` the mapping runs
/// downward, so a rising oscillator lowers the cutoff.
#[inline]
pub fn modulated_cutoff(v: f32, depth: f32, current_cutoff: f32) -> f32 {
    let offset = map_range(v, -1.0, 1.0, DEPTH_ANCHOR, depth);
    (offset + current_cutoff).min(MAX_MODULATED_CUTOFF_HZ)
}

/// LFO frequency for a host tempo, one cycle per [`SYNC_BEATS_PER_CYCLE`] beats.
/// `None` when the tempo is missing or not a positive finite number.
pub fn synced_frequency(host_bpm: Option<f64>) -> Option<f32> {
    let bpm = host_bpm.filter(|bpm| bpm.is_finite() && *bpm > 0.0)?;
    let seconds_per_beat = 60.0 / bpm;
    Some((1.0 / (SYNC_BEATS_PER_CYCLE * seconds_per_beat)) as f32)
}

/// Low Frequency Oscillator driving the filter cutoff
///
/// Wraps an [`Oscillator`] and adds the depth mapping. Each `sample_*` call
/// pulls exactly one oscillator sample.
pub struct Lfo {
    oscillator: Oscillator,
    rate_hz: f32,
    depth: f32,
}

impl Lfo {
    /// Create a new LFO
    /// - rate_hz: free-running frequency in Hz
    /// - depth: upper end of the cutoff offset range
    /// - sample_rate: rate at which the LFO is sampled
    pub fn new(rate_hz: f32, depth: f32, sample_rate: f64) -> Self {
        Self {
            oscillator: Oscillator::new(sample_rate, rate_hz),
            rate_hz,
            depth,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.oscillator.prepare(sample_rate);
    }

    /// Switch the generator. Phase carries over.
    pub fn select_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    pub fn waveform(&self) -> Waveform {
        self.oscillator.waveform()
    }

    /// Set the free-running frequency in Hz
    pub fn set_frequency(&mut self, rate_hz: f32) {
        self.rate_hz = rate_hz;
        self.oscillator.set_frequency(rate_hz);
    }

    /// The free-running frequency; the oscillator may currently run at a synced rate
    pub fn frequency(&self) -> f32 {
        self.rate_hz
    }

    /// Frequency the oscillator is actually running at
    pub fn oscillator_frequency(&self) -> f32 {
        self.oscillator.frequency()
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Reset the phase to 0
    pub fn reset(&mut self) {
        self.oscillator.reset();
    }

    pub fn phase(&self) -> f64 {
        self.oscillator.phase()
    }

    /// Free-running modulation: one oscillator step at the free rate
    #[inline]
    pub fn sample_free(&mut self, current_cutoff: f32) -> f32 {
        if self.oscillator.frequency() != self.rate_hz {
            self.oscillator.set_frequency(self.rate_hz);
        }
        let v = self.oscillator.next_sample();
        modulated_cutoff(v, self.depth, current_cutoff)
    }

    /// Tempo-synced modulation.
    ///
    /// Retunes the oscillator to the synced rate and pulls one sample. Returns
    /// `None` without touching the oscillator when no usable tempo is given.
    #[inline]
    pub fn sample_synced(&mut self, current_cutoff: f32, host_bpm: Option<f64>) -> Option<f32> {
        let frequency = synced_frequency(host_bpm)?;
        self.oscillator.set_frequency(frequency);
        let v = self.oscillator.next_sample();
        Some(modulated_cutoff(v, self.depth, current_cutoff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_endpoints() {
        assert_eq!(modulated_cutoff(1.0, 500.0, 1000.0), 1500.0);
        assert_eq!(modulated_cutoff(0.0, 500.0, 1000.0), 1250.5);
        assert_eq!(modulated_cutoff(-1.0, 500.0, 1000.0), 1001.0);
    }

    #[test]
    fn test_mapping_caps_at_upper_bound() {
        assert_eq!(modulated_cutoff(1.0, 10000.0, 15000.0), MAX_MODULATED_CUTOFF_HZ);
    }

    #[test]
    fn test_depth_below_anchor_inverts() {
        let low = modulated_cutoff(-1.0, 0.5, 1000.0);
        let high = modulated_cutoff(1.0, 0.5, 1000.0);
        assert!(high < low);
    }

    #[test]
    fn test_synced_frequency() {
        assert_eq!(synced_frequency(Some(120.0)), Some(0.5));
        assert_eq!(synced_frequency(Some(60.0)), Some(0.25));
        assert_eq!(synced_frequency(None), None);
        assert_eq!(synced_frequency(Some(0.0)), None);
        assert_eq!(synced_frequency(Some(f64::NAN)), None);
    }

    #[test]
    fn test_sample_free_sine_starts_at_midpoint() {
        let mut lfo = Lfo::new(1.0, 500.0, 1000.0);
        // sin(0) = 0 maps to the middle of [1, 500]
        assert_eq!(lfo.sample_free(1000.0), 1250.5);
    }

    #[test]
    fn test_sample_synced_retunes_and_restores() {
        let mut lfo = Lfo::new(3.0, 500.0, 48000.0);

        assert!(lfo.sample_synced(1000.0, Some(120.0)).is_some());
        assert_eq!(lfo.oscillator_frequency(), 0.5);

        lfo.sample_free(1000.0);
        assert_eq!(lfo.oscillator_frequency(), 3.0);
    }

    #[test]
    fn test_sample_synced_without_tempo() {
        let mut lfo = Lfo::new(3.0, 500.0, 48000.0);
        let phase = lfo.phase();

        assert_eq!(lfo.sample_synced(1000.0, None), None);
        assert_eq!(lfo.phase(), phase);
    }

    #[test]
    fn test_waveform_switch_keeps_phase() {
        let mut lfo = Lfo::new(10.0, 500.0, 1000.0);
        for _ in 0..7 {
            lfo.sample_free(0.0);
        }
        let phase = lfo.phase();
        lfo.select_waveform(Waveform::Square);
        assert_eq!(lfo.phase(), phase);
        assert_eq!(lfo.waveform(), Waveform::Square);
    }

    #[test]
    fn test_reset() {
        let mut lfo = Lfo::new(10.0, 500.0, 1000.0);
        for _ in 0..7 {
            lfo.sample_free(0.0);
        }
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
    }
}
