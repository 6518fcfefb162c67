use std::f64::consts::PI;

/// Maximum number of channels a single filter instance can hold state for
pub const MAX_CHANNELS: usize = 8;

/// Outputs below this magnitude are flushed to zero
const DENORMAL_THRESHOLD: f32 = 1e-15;

/// Response type of the biquad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    AllPass,
}

impl FilterType {
    pub const ALL: [FilterType; 4] = [
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::BandPass,
        FilterType::AllPass,
    ];

    /// Map an external choice index (LowPass=0 .. AllPass=3) to a filter type.
    /// Unknown indices map to `None` and are ignored by callers.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(FilterType::LowPass),
            1 => Some(FilterType::HighPass),
            2 => Some(FilterType::BandPass),
            3 => Some(FilterType::AllPass),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            FilterType::LowPass => 0,
            FilterType::HighPass => 1,
            FilterType::BandPass => 2,
            FilterType::AllPass => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterType::LowPass => "LP",
            FilterType::HighPass => "HP",
            FilterType::BandPass => "BP",
            FilterType::AllPass => "AP",
        }
    }
}

/// Raw (un-normalized) RBJ cookbook coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
}

impl Coefficients {
    /// Coefficients of a filter that passes its input unchanged
    pub const IDENTITY: Coefficients = Coefficients {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
    };

    /// Derive coefficients for `filter_type` at `cutoff_hz` / `q`.
    ///
    /// Preconditions: `0 < cutoff_hz < sample_rate / 2` and `q > 0`. Inside that
    /// domain `a0 = 1 + alpha` is strictly positive, so the recurrence never
    /// divides by zero. Outside it the result may be unstable or non-finite.
    pub fn design(filter_type: FilterType, cutoff_hz: f32, q: f32, sample_rate: f64) -> Self {
        let omega = (2.0 * PI * (cutoff_hz as f64 / sample_rate)) as f32;
        let alpha = omega.sin() / (2.0 * q);
        let cos_omega = omega.cos();

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        let (b0, b1, b2) = match filter_type {
            FilterType::LowPass => {
                let b1 = 1.0 - cos_omega;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterType::HighPass => {
                let b1 = -(1.0 + cos_omega);
                (-b1 / 2.0, b1, -b1 / 2.0)
            }
            FilterType::BandPass => (alpha, 0.0, -alpha),
            FilterType::AllPass => (1.0 - alpha, -2.0 * cos_omega, 1.0 + alpha),
        };

        Self {
            a0,
            a1,
            a2,
            b0,
            b1,
            b2,
        }
    }

    /// Divide every term by `a0`, returning `[b0, b1, b2, a1, a2]`
    fn normalized(&self) -> [f32; 5] {
        [
            self.b0 / self.a0,
            self.b1 / self.a0,
            self.b2 / self.a0,
            self.a1 / self.a0,
            self.a2 / self.a0,
        ]
    }
}

/// Delay line for one channel
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    x1: f32, // x[n-1]
    x2: f32, // x[n-2]
    y1: f32, // y[n-1]
    y2: f32, // y[n-2]
}

/// Biquad Filter - RBJ Audio EQ Cookbook implementation
///
/// Second-order IIR filter with selectable response type and independent
/// Direct Form I state for up to [`MAX_CHANNELS`] channels. Every cutoff, Q
/// or type setter recomputes the coefficients immediately; the per-sample
/// recurrence is allocation free.
pub struct Biquad {
    sample_rate: f64,
    cutoff_hz: f32,
    resonance: f32,
    filter_type: FilterType,

    coefficients: Coefficients,
    // b0, b1, b2, a1, a2 divided by a0
    normalized: [f32; 5],

    channels: [ChannelState; MAX_CHANNELS],
}

impl Biquad {
    /// Create a new biquad filter
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn new(sample_rate: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff_hz: 20000.0,
            resonance: 0.7,
            filter_type: FilterType::LowPass,
            coefficients: Coefficients::IDENTITY,
            normalized: Coefficients::IDENTITY.normalized(),
            channels: [ChannelState::default(); MAX_CHANNELS],
        };
        filter.update_coefficients();
        filter
    }

    /// Set cutoff frequency in Hz and recompute coefficients.
    /// The caller keeps `hz` inside (0, sample_rate / 2).
    pub fn set_cutoff(&mut self, hz: f32) {
        self.cutoff_hz = hz;
        self.update_coefficients();
    }

    /// Set resonance (Q factor, > 0) and recompute coefficients
    pub fn set_resonance(&mut self, q: f32) {
        self.resonance = q;
        self.update_coefficients();
    }

    /// Set cutoff and resonance together with a single coefficient update
    #[inline]
    pub fn set_params(&mut self, hz: f32, q: f32) {
        self.cutoff_hz = hz;
        self.resonance = q;
        self.update_coefficients();
    }

    /// Set response type and recompute coefficients.
    /// Delay history is kept; call [`Biquad::reset`] first when switching topology.
    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
        self.update_coefficients();
    }

    /// Store a new sample rate.
    ///
    /// Coefficients are NOT recomputed here: follow with a cutoff, Q or type
    /// refresh (or [`Biquad::refresh`]) before processing.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    /// Recompute coefficients from the stored parameters
    pub fn refresh(&mut self) {
        self.update_coefficients();
    }

    /// Clear every channel's delay line. Coefficients are left as they are.
    pub fn reset(&mut self) {
        self.channels = [ChannelState::default(); MAX_CHANNELS];
    }

    fn update_coefficients(&mut self) {
        self.coefficients =
            Coefficients::design(self.filter_type, self.cutoff_hz, self.resonance, self.sample_rate);
        self.normalized = self.coefficients.normalized();
    }

    /// Process a single sample on `channel`
    ///
    /// y[n] = (b0/a0)x[n] + (b1/a0)x[n-1] + (b2/a0)x[n-2] - (a1/a0)y[n-1] - (a2/a0)y[n-2]
    ///
    /// Must be called once per sample per channel in increasing sample order.
    /// A channel index past [`MAX_CHANNELS`] returns the input unfiltered.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        let Some(state) = self.channels.get_mut(channel) else {
            return input;
        };
        let [b0, b1, b2, a1, a2] = self.normalized;

        let mut output =
            b0 * input + b1 * state.x1 + b2 * state.x2 - a1 * state.y1 - a2 * state.y2;

        if output.abs() < DENORMAL_THRESHOLD {
            output = 0.0;
        }

        state.x2 = state.x1;
        state.x1 = input;
        state.y2 = state.y1;
        state.y1 = output;

        output
    }

    /// Magnitude of the current transfer function at `hz` (linear gain)
    pub fn magnitude_at(&self, hz: f32) -> f32 {
        let w = 2.0 * PI * (hz as f64 / self.sample_rate);
        let c = self.coefficients;
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = c.b0 as f64 + c.b1 as f64 * cos1 + c.b2 as f64 * cos2;
        let num_im = -(c.b1 as f64 * sin1 + c.b2 as f64 * sin2);
        let den_re = c.a0 as f64 + c.a1 as f64 * cos1 + c.a2 as f64 * cos2;
        let den_im = -(c.a1 as f64 * sin1 + c.a2 as f64 * sin2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt() as f32
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    const SR: f64 = 48000.0;
    const BUTTERWORTH_Q: f32 = 0.7071;

    fn quarter_rate(filter_type: FilterType) -> Biquad {
        let mut filter = Biquad::new(SR);
        filter.set_resonance(BUTTERWORTH_Q);
        filter.set_type(filter_type);
        filter.set_cutoff((SR / 4.0) as f32);
        filter
    }

    #[test]
    fn test_quarter_rate_coefficients_match_cookbook() {
        // At fs/4: omega = pi/2, cos = 0, sin = 1, alpha = 1 / (2Q)
        let alpha = 1.0 / (2.0 * BUTTERWORTH_Q);
        let expected = [
            (FilterType::LowPass, [1.0 + alpha, 0.0, 1.0 - alpha, 0.5, 1.0, 0.5]),
            (FilterType::HighPass, [1.0 + alpha, 0.0, 1.0 - alpha, 0.5, -1.0, 0.5]),
            (FilterType::BandPass, [1.0 + alpha, 0.0, 1.0 - alpha, alpha, 0.0, -alpha]),
            (FilterType::AllPass, [1.0 + alpha, 0.0, 1.0 - alpha, 1.0 - alpha, 0.0, 1.0 + alpha]),
        ];

        for (filter_type, [a0, a1, a2, b0, b1, b2]) in expected {
            let c = quarter_rate(filter_type).coefficients();
            for (got, want) in [(c.a0, a0), (c.a1, a1), (c.a2, a2), (c.b0, b0), (c.b1, b1), (c.b2, b2)] {
                assert!(
                    approx_eq!(f32, got, want, epsilon = 1e-5),
                    "{:?}: got {}, expected {}",
                    filter_type,
                    got,
                    want
                );
            }
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = quarter_rate(FilterType::LowPass);
        for _ in 0..100 {
            filter.process_sample(0, 1.0);
        }
        filter.reset();

        for _ in 0..4 {
            assert_eq!(filter.process_sample(0, 0.0), 0.0);
        }
    }

    #[test]
    fn test_reset_keeps_coefficients() {
        let mut filter = quarter_rate(FilterType::BandPass);
        let before = filter.coefficients();
        filter.reset();
        assert_eq!(filter.coefficients(), before);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut filter = quarter_rate(FilterType::LowPass);
        for _ in 0..50 {
            filter.process_sample(0, 1.0);
        }
        // Channel 1 has never seen input
        assert_eq!(filter.process_sample(1, 0.0), 0.0);
        assert!(filter.process_sample(0, 1.0).abs() > 0.5);
    }

    #[test]
    fn test_sample_rate_change_is_deferred() {
        let mut filter = quarter_rate(FilterType::LowPass);
        let before = filter.coefficients();

        filter.set_sample_rate(96000.0);
        assert_eq!(filter.coefficients(), before);

        filter.refresh();
        assert_ne!(filter.coefficients(), before);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = Biquad::new(SR);
        filter.set_resonance(BUTTERWORTH_Q);
        filter.set_cutoff(1000.0);

        let mut output = 0.0;
        for _ in 0..2000 {
            output = filter.process_sample(0, 1.0);
        }
        assert!((output - 1.0).abs() < 1e-3, "DC gain was {}", output);
    }

    #[test]
    fn test_allpass_has_unity_magnitude() {
        let mut filter = Biquad::new(SR);
        filter.set_type(FilterType::AllPass);
        filter.set_resonance(1.5);
        filter.set_cutoff(2000.0);

        for hz in [50.0, 500.0, 2000.0, 8000.0, 20000.0] {
            let gain = filter.magnitude_at(hz);
            assert!((gain - 1.0).abs() < 1e-3, "gain at {} Hz was {}", hz, gain);
        }
    }

    #[test]
    fn test_unknown_type_index() {
        assert_eq!(FilterType::from_index(3), Some(FilterType::AllPass));
        assert_eq!(FilterType::from_index(4), None);
        assert_eq!(FilterType::from_index(-1), None);
        for filter_type in FilterType::ALL {
            assert_eq!(FilterType::from_index(filter_type.index()), Some(filter_type));
        }
    }

    #[test]
    fn test_out_of_range_channel_passes_through() {
        let mut filter = quarter_rate(FilterType::HighPass);
        assert_eq!(filter.process_sample(MAX_CHANNELS, 0.25), 0.25);
    }
}
