//! Pink noise generator using the Voss-McCartney algorithm
//!
//! Pink noise has a power spectral density that decreases by 3 dB per octave (1/f).
//! Used as the excitation signal for live playback of the filter sweep.

const ROWS: usize = 5;

/// Pink noise generator with ~1/f frequency spectrum
///
/// Row `k` is refreshed every 2^k samples, picked by the trailing zeros of a
/// running counter, so exactly one row changes per sample. White noise comes
/// from a seeded xorshift, so output is deterministic for a given seed.
pub struct PinkNoise {
    seed: u32,
    rng_state: u32,
    counter: u32,
    rows: [f32; ROWS],
    running_sum: f32,
}

impl PinkNoise {
    pub fn new() -> Self {
        Self::with_seed(0x9E37_79B9)
    }

    /// Create a generator with an explicit seed (zero is remapped, xorshift needs a non-zero state)
    pub fn with_seed(seed: u32) -> Self {
        let seed = if seed == 0 { 1 } else { seed };
        Self {
            seed,
            rng_state: seed,
            counter: 0,
            rows: [0.0; ROWS],
            running_sum: 0.0,
        }
    }

    /// Restart the sequence from the initial seed
    pub fn reset(&mut self) {
        self.rng_state = self.seed;
        self.counter = 0;
        self.rows = [0.0; ROWS];
        self.running_sum = 0.0;
    }

    fn white(&mut self) -> f32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    /// Generate the next sample (range approximately -1.0 to 1.0)
    #[inline]
    pub fn tick(&mut self) -> f32 {
        self.counter = self.counter.wrapping_add(1);
        let row = (self.counter.trailing_zeros() as usize).min(ROWS - 1);

        let fresh = self.white();
        self.running_sum += fresh - self.rows[row];
        self.rows[row] = fresh;

        // One extra white term keeps the top octave from sounding stepped
        (self.running_sum + self.white()) / (ROWS as f32 + 1.0)
    }
}

impl Default for PinkNoise {
    fn default() -> Self {
        Self::new()
    }
}
