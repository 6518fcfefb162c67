//! Offline rendering of WAV files through the filter

use std::path::Path;

use anyhow::{bail, Context};
use log::info;

use crate::engine::{ModFilter, ProcessSpec};
use crate::params::FilterParams;

/// Frames handed to the processor per block when rendering
pub const RENDER_BLOCK_SIZE: usize = 512;

/// Summary of a finished render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub frames: usize,
    pub channels: usize,
    pub sample_rate: u32,
    /// Largest absolute output sample
    pub peak: f32,
}

/// Read every sample of a WAV file as interleaved f32 in [-1, 1]
pub fn read_wav(path: &Path) -> anyhow::Result<(hound::WavSpec, Vec<f32>)> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((spec, samples))
}

/// Filter interleaved samples with a freshly prepared processor
pub fn render_buffer(
    samples: &mut [f32],
    sample_rate: f64,
    channels: usize,
    params: &FilterParams,
) -> anyhow::Result<f32> {
    let spec = ProcessSpec::new(sample_rate, RENDER_BLOCK_SIZE, channels);
    let mut processor = ModFilter::with_params(spec, *params);
    processor.prepare(spec)?;

    let mut peak = 0.0f32;
    for block in samples.chunks_mut(RENDER_BLOCK_SIZE * channels) {
        processor.process_interleaved(block);
        peak = block.iter().fold(peak, |peak, s| peak.max(s.abs()));
    }
    Ok(peak)
}

/// Render `input` through the filter into a 32-bit float WAV at `output`
pub fn render_wav(input: &Path, output: &Path, params: &FilterParams) -> anyhow::Result<RenderStats> {
    let (in_spec, mut samples) = read_wav(input)?;
    let channels = in_spec.channels as usize;
    if channels == 0 {
        bail!("{} has no channels", input.display());
    }

    let peak = render_buffer(&mut samples, in_spec.sample_rate as f64, channels, params)?;

    let out_spec = hound::WavSpec {
        channels: in_spec.channels,
        sample_rate: in_spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(output, out_spec)
        .with_context(|| format!("failed to create {}", output.display()))?;
    for sample in &samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    let stats = RenderStats {
        frames: samples.len() / channels,
        channels,
        sample_rate: in_spec.sample_rate,
        peak,
    };
    info!(
        "rendered {} frames ({} ch, {} Hz) to {}, peak {:.3}",
        stats.frames,
        stats.channels,
        stats.sample_rate,
        output.display(),
        stats.peak
    );
    Ok(stats)
}
