pub mod oscillator;
pub mod pink_noise;
pub mod waveform;

pub use self::oscillator::*;
pub use self::pink_noise::*;
pub use self::waveform::*;
