//! Parameter smoothing for click-free control changes
//!
//! Cutoff and resonance jumps coming from the host are passed through a
//! one-pole smoother that advances one step per processed frame, so the
//! filter never sees a step change in its coefficients.

/// Default smoothing time in milliseconds
pub const DEFAULT_SMOOTH_TIME_MS: f32 = 15.0;

/// How the smoother approaches its target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Smoothing {
    /// One-pole in the linear domain
    Linear,
    /// One-pole in the log domain; equal ratios take equal time.
    /// Range must be strictly positive.
    Multiplicative,
}

/// A smoothed parameter with range constraints
#[derive(Clone, Debug)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (0-1, higher = faster)
    coeff: f32,
    smooth_time_ms: f32,
    kind: Smoothing,
    /// Whether we've reached the target
    settled: bool,
    pub min: f32,
    pub max: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with range
    ///
    /// # Arguments
    /// * `initial_value` - Starting value (will be clamped to range)
    /// * `min` - Minimum allowed value
    /// * `max` - Maximum allowed value
    /// * `sample_rate` - Rate at which `tick` is called, in Hz
    /// * `smooth_time_ms` - Time constant in milliseconds
    /// * `kind` - Linear or multiplicative approach
    pub fn new(
        initial_value: f32,
        min: f32,
        max: f32,
        sample_rate: f64,
        smooth_time_ms: f32,
        kind: Smoothing,
    ) -> Self {
        let clamped = initial_value.clamp(min, max);
        Self {
            current: clamped,
            target: clamped,
            coeff: Self::calculate_coeff(sample_rate, smooth_time_ms),
            smooth_time_ms,
            kind,
            settled: true,
            min,
            max,
        }
    }

    /// coeff = 1 - e^(-1/tau), tau being the time constant in samples
    fn calculate_coeff(sample_rate: f64, smooth_time_ms: f32) -> f32 {
        if smooth_time_ms <= 0.0 || sample_rate <= 0.0 {
            return 1.0;
        }
        let smooth_time_samples = (smooth_time_ms as f64 / 1000.0) * sample_rate;
        (1.0 - (-1.0 / smooth_time_samples).exp()) as f32
    }

    /// Set a new target value to smooth towards (clamped to range)
    pub fn set_target(&mut self, target: f32) {
        let clamped = target.clamp(self.min, self.max);
        if (self.target - clamped).abs() > 1e-8 {
            self.target = clamped;
            self.settled = false;
        }
    }

    /// Set value immediately without smoothing
    pub fn set_immediate(&mut self, value: f32) {
        let clamped = value.clamp(self.min, self.max);
        self.current = clamped;
        self.target = clamped;
        self.settled = true;
    }

    /// Jump to the current target, discarding any ramp in progress
    pub fn reset(&mut self) {
        self.current = self.target;
        self.settled = true;
    }

    /// Advance one step and return the smoothed value
    #[inline]
    pub fn tick(&mut self) -> f32 {
        if self.settled {
            return self.current;
        }

        let previous = self.current;
        self.current = match self.kind {
            Smoothing::Linear => self.current + self.coeff * (self.target - self.current),
            Smoothing::Multiplicative => {
                self.current * (self.target / self.current).powf(self.coeff)
            }
        };

        // Relative tolerance so Hz-scale values settle as readily as unit-scale ones.
        // A step that rounds away to nothing in f32 also counts as arrived.
        let tolerance = 1e-6 * self.target.abs().max(1.0);
        if (self.current - self.target).abs() < tolerance || self.current == previous {
            self.current = self.target;
            self.settled = true;
        }

        self.current
    }

    /// Get the current smoothed value without advancing
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Update sample rate (recalculates coefficient)
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.coeff = Self::calculate_coeff(sample_rate, self.smooth_time_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_reaches_target() {
        let mut smoother = SmoothedParam::new(0.0, 0.0, 1.0, 44100.0, 10.0, Smoothing::Linear);
        smoother.set_target(1.0);

        // 200ms is 20 time constants
        for _ in 0..(44100 / 5) {
            smoother.tick();
        }

        assert!((smoother.get() - 1.0).abs() < 0.001, "Expected ~1.0, got {}", smoother.get());
        assert!(smoother.is_settled());
    }

    #[test]
    fn test_multiplicative_reaches_target() {
        let mut smoother =
            SmoothedParam::new(100.0, 20.0, 20000.0, 48000.0, 5.0, Smoothing::Multiplicative);
        smoother.set_target(10000.0);

        let mut previous = smoother.get();
        for _ in 0..4800 {
            let value = smoother.tick();
            assert!(value >= previous, "ramp must be monotonic");
            previous = value;
        }
        assert_eq!(smoother.get(), 10000.0);
    }

    #[test]
    fn test_multiplicative_is_symmetric_in_ratio() {
        let mut up = SmoothedParam::new(100.0, 20.0, 20000.0, 48000.0, 5.0, Smoothing::Multiplicative);
        let mut down =
            SmoothedParam::new(1000.0, 20.0, 20000.0, 48000.0, 5.0, Smoothing::Multiplicative);
        up.set_target(1000.0);
        down.set_target(100.0);

        for _ in 0..50 {
            up.tick();
            down.tick();
        }
        // Progress measured as a ratio is the same in both directions
        let up_ratio = up.get() / 100.0;
        let down_ratio = 1000.0 / down.get();
        assert!((up_ratio - down_ratio).abs() < 1e-2);
    }

    #[test]
    fn test_immediate_set() {
        let mut smoother = SmoothedParam::new(0.0, 0.0, 1.0, 44100.0, 10.0, Smoothing::Linear);
        smoother.set_immediate(1.0);

        assert_eq!(smoother.get(), 1.0);
        assert!(smoother.is_settled());
    }

    #[test]
    fn test_reset_snaps_to_target() {
        let mut smoother = SmoothedParam::new(0.3, 0.3, 3.0, 44100.0, 10.0, Smoothing::Linear);
        smoother.set_target(2.0);
        smoother.tick();
        assert!(smoother.get() < 2.0);

        smoother.reset();
        assert_eq!(smoother.get(), 2.0);
        assert!(smoother.is_settled());
    }

    #[test]
    fn test_range_clamping() {
        let mut smoother = SmoothedParam::new(50.0, 20.0, 200.0, 44100.0, 10.0, Smoothing::Linear);

        smoother.set_target(300.0);
        assert_eq!(smoother.target(), 200.0);

        smoother.set_target(10.0);
        assert_eq!(smoother.target(), 20.0);
    }
}
