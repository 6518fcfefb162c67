//! Integration tests for the biquad response and state handling

use float_cmp::approx_eq;
use modfilter::filters::{Biquad, Coefficients, FilterType};
use modfilter::gen::PinkNoise;

const SAMPLE_RATE: f64 = 48000.0;

fn impulse_response(filter_type: FilterType, cutoff: f32, q: f32, len: usize) -> Vec<f32> {
    let mut filter = Biquad::new(SAMPLE_RATE);
    filter.set_type(filter_type);
    filter.set_params(cutoff, q);
    (0..len)
        .map(|n| filter.process_sample(0, if n == 0 { 1.0 } else { 0.0 }))
        .collect()
}

#[test]
fn test_impulse_response_decays() {
    for filter_type in FilterType::ALL {
        for cutoff in [200.0, 1000.0, 10000.0, 20000.0] {
            for q in [0.3, 0.7071, 3.0] {
                let response = impulse_response(filter_type, cutoff, q, 1000);
                assert!(
                    response.iter().all(|s| s.is_finite()),
                    "{:?} {} Hz Q {} produced non-finite output",
                    filter_type,
                    cutoff,
                    q
                );

                let peak = response.iter().fold(0.0f32, |m, s| m.max(s.abs()));
                let tail = response[900..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
                assert!(
                    tail <= 0.1 * peak,
                    "{:?} {} Hz Q {}: tail {} vs peak {}",
                    filter_type,
                    cutoff,
                    q,
                    tail,
                    peak
                );
            }
        }
    }
}

#[test]
fn test_reset_then_silence_is_silent() {
    let mut filter = Biquad::new(SAMPLE_RATE);
    filter.set_params(800.0, 2.0);

    let mut noise = PinkNoise::new();
    for _ in 0..512 {
        filter.process_sample(0, noise.tick());
        filter.process_sample(1, noise.tick());
    }

    filter.reset();
    for _ in 0..16 {
        assert_eq!(filter.process_sample(0, 0.0), 0.0);
        assert_eq!(filter.process_sample(1, 0.0), 0.0);
    }
}

#[test]
fn test_coefficients_depend_only_on_settings() {
    let mut a = Biquad::new(SAMPLE_RATE);
    a.set_type(FilterType::BandPass);
    a.set_params(1234.0, 1.1);

    let mut b = Biquad::new(SAMPLE_RATE);
    b.set_params(9000.0, 0.4);
    b.set_type(FilterType::HighPass);
    let mut noise = PinkNoise::new();
    for _ in 0..256 {
        b.process_sample(0, noise.tick());
    }
    b.set_type(FilterType::BandPass);
    b.set_cutoff(1234.0);
    b.set_resonance(1.1);

    assert_eq!(a.coefficients(), b.coefficients());
    assert_eq!(
        a.coefficients(),
        Coefficients::design(FilterType::BandPass, 1234.0, 1.1, SAMPLE_RATE)
    );
}

#[test]
fn test_magnitude_matches_filter_shape() {
    let mut filter = Biquad::new(SAMPLE_RATE);
    filter.set_params(1000.0, std::f32::consts::FRAC_1_SQRT_2);

    // Butterworth lowpass is 3 dB down at the cutoff
    assert!(approx_eq!(
        f32,
        filter.magnitude_at(1000.0),
        std::f32::consts::FRAC_1_SQRT_2,
        epsilon = 1e-3
    ));
    assert!(filter.magnitude_at(100.0) > 0.99);
    assert!(filter.magnitude_at(10000.0) < 0.02);

    filter.set_type(FilterType::HighPass);
    assert!(filter.magnitude_at(100.0) < 0.02);
    assert!(filter.magnitude_at(10000.0) > 0.99);

    filter.set_type(FilterType::BandPass);
    assert!(approx_eq!(f32, filter.magnitude_at(1000.0), 1.0, epsilon = 1e-3));
}

#[test]
fn test_sample_rate_change_needs_refresh() {
    let mut filter = Biquad::new(44100.0);
    filter.set_params(1000.0, 0.7071);

    filter.set_sample_rate(SAMPLE_RATE);
    assert_eq!(
        filter.coefficients(),
        Coefficients::design(FilterType::LowPass, 1000.0, 0.7071, 44100.0)
    );

    filter.refresh();
    assert_eq!(
        filter.coefficients(),
        Coefficients::design(FilterType::LowPass, 1000.0, 0.7071, SAMPLE_RATE)
    );
}
