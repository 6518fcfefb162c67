use std::f32::consts::PI;

/// LFO waveform shapes, each a pure function of phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    RampUp,
    RampDown,
    Square,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::RampUp,
        Waveform::RampDown,
        Waveform::Square,
    ];

    /// Map an external choice index (Sine=0, RampUp=1, RampDown=2, Square=3).
    /// Out-of-range indices give `None`, which callers treat as "keep current".
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Waveform::Sine),
            1 => Some(Waveform::RampUp),
            2 => Some(Waveform::RampDown),
            3 => Some(Waveform::Square),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Waveform::Sine => 0,
            Waveform::RampUp => 1,
            Waveform::RampDown => 2,
            Waveform::Square => 3,
        }
    }

    /// Evaluate the waveform at `phase` in [0, 1). Output is bounded to [-1, 1].
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (2.0 * PI * phase).sin(),
            Waveform::RampUp => 2.0 * phase - 1.0,
            Waveform::RampDown => 1.0 - 2.0 * phase,
            // Sign of the sine reference; zero crossing at phase 0 counts as positive
            Waveform::Square => {
                if (2.0 * PI * phase).sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveforms_are_bounded() {
        for waveform in Waveform::ALL {
            for i in 0..1000 {
                let value = waveform.evaluate(i as f32 / 1000.0);
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "{:?} out of range at step {}: {}",
                    waveform,
                    i,
                    value
                );
            }
        }
    }

    #[test]
    fn test_ramps_are_mirrored() {
        for phase in [0.0, 0.25, 0.5, 0.9] {
            assert_eq!(
                Waveform::RampUp.evaluate(phase),
                -Waveform::RampDown.evaluate(phase)
            );
        }
        assert_eq!(Waveform::RampUp.evaluate(0.0), -1.0);
        assert_eq!(Waveform::RampUp.evaluate(0.5), 0.0);
    }

    #[test]
    fn test_square_follows_sine_sign() {
        assert_eq!(Waveform::Square.evaluate(0.1), 1.0);
        assert_eq!(Waveform::Square.evaluate(0.4), 1.0);
        assert_eq!(Waveform::Square.evaluate(0.6), -1.0);
        assert_eq!(Waveform::Square.evaluate(0.95), -1.0);
    }

    #[test]
    fn test_choice_mapping() {
        for waveform in Waveform::ALL {
            assert_eq!(Waveform::from_index(waveform.index()), Some(waveform));
        }
        assert_eq!(Waveform::from_index(4), None);
    }
}
