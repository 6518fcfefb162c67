use crate::gen::waveform::Waveform;

/// Phase-accumulating control-rate oscillator
///
/// Phase runs over [0, 1) and carries across calls, frequency changes and
/// waveform switches. Only [`Oscillator::reset`] moves it back to zero.
#[derive(Debug, Clone)]
pub struct Oscillator {
    sample_rate: f64,
    frequency_hz: f32,
    phase: f64,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(sample_rate: f64, frequency_hz: f32) -> Self {
        Self {
            sample_rate,
            frequency_hz,
            phase: 0.0,
            waveform: Waveform::Sine,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.frequency_hz = frequency_hz;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency_hz
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Evaluate the waveform at the current phase, then advance by one sample
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let value = self.waveform.evaluate(self.phase as f32);

        self.phase += self.frequency_hz as f64 / self.sample_rate;
        // rem_euclid also covers negative or multi-cycle increments
        if !(0.0..1.0).contains(&self.phase) {
            self.phase = self.phase.rem_euclid(1.0);
        }

        value
    }
}
