use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, FromSample, Sample, SizedSample, Stream, StreamConfig,
};
use log::{error, info};
use std::sync::{Arc, Mutex};

use super::{ModFilter, ProcessSpec};
use crate::gen::PinkNoise;

/// Level of the pink noise fed through the filter when auditioning
const EXCITATION_GAIN: f32 = 0.25;

/// Realtime output that runs pink noise through a shared [`ModFilter`]
pub struct EngineOutput {
    stream: Option<Stream>,
    device: Option<Device>,
    config: Option<StreamConfig>,
    sample_rate: f64,
    is_active: bool,
}

impl EngineOutput {
    pub fn new() -> Self {
        Self {
            stream: None,
            device: None,
            config: None,
            sample_rate: 44100.0,
            is_active: false,
        }
    }

    /// Open the default output device
    pub fn initialize(&mut self) -> Result<(), anyhow::Error> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("Default output device is not available"))?;
        info!("Output device: {}", device.name()?);

        let config = device.default_output_config()?;
        info!("Default output config: {:?}", config);

        self.sample_rate = config.sample_rate().0 as f64;
        self.device = Some(device);
        self.config = Some(config.into());
        Ok(())
    }

    /// Prepare the processor for the device format and build the stream
    pub fn create_stream(&mut self, processor: Arc<Mutex<ModFilter>>) -> Result<(), anyhow::Error> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Device not initialized"))?;
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Config not initialized"))?;

        let max_block_size = match config.buffer_size {
            cpal::BufferSize::Fixed(frames) => frames as usize,
            cpal::BufferSize::Default => 512,
        };
        let spec = ProcessSpec::new(self.sample_rate, max_block_size, config.channels as usize);
        processor
            .lock()
            .map_err(|_| anyhow::anyhow!("processor lock poisoned"))?
            .prepare(spec)?;

        let supported_config = device.default_output_config()?;
        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::I16 => Self::make_stream::<i16>(device, config, processor)?,
            cpal::SampleFormat::I32 => Self::make_stream::<i32>(device, config, processor)?,
            cpal::SampleFormat::U16 => Self::make_stream::<u16>(device, config, processor)?,
            cpal::SampleFormat::F32 => Self::make_stream::<f32>(device, config, processor)?,
            cpal::SampleFormat::F64 => Self::make_stream::<f64>(device, config, processor)?,
            sample_format => {
                return Err(anyhow::anyhow!("Unsupported sample format '{}'", sample_format))
            }
        };

        self.stream = Some(stream);
        Ok(())
    }

    fn make_stream<T>(
        device: &Device,
        config: &StreamConfig,
        processor: Arc<Mutex<ModFilter>>,
    ) -> Result<Stream, anyhow::Error>
    where
        T: SizedSample + FromSample<f32>,
    {
        let num_channels = config.channels as usize;
        let mut noise = PinkNoise::new();
        let mut frame = vec![0.0f32; num_channels];

        let err_fn = |err| error!("Error building output sound stream: {}", err);

        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::fill_buffer(output, &processor, &mut noise, &mut frame);
            },
            err_fn,
            None,
        )?;

        Ok(stream)
    }

    /// Render one device buffer. Outputs silence if the processor is
    /// momentarily held by the control thread.
    fn fill_buffer<SampleType>(
        output: &mut [SampleType],
        processor: &Arc<Mutex<ModFilter>>,
        noise: &mut PinkNoise,
        frame: &mut [f32],
    ) where
        SampleType: Sample + FromSample<f32>,
    {
        let mut guard = match processor.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                for sample in output.iter_mut() {
                    *sample = SampleType::EQUILIBRIUM;
                }
                return;
            }
        };

        for out_frame in output.chunks_mut(frame.len()) {
            let excitation = noise.tick() * EXCITATION_GAIN;
            frame.iter_mut().for_each(|sample| *sample = excitation);
            guard.process_frame(frame);

            for (sample, value) in out_frame.iter_mut().zip(frame.iter()) {
                *sample = SampleType::from_sample(*value);
            }
        }
    }

    /// Start the audio stream
    pub fn start(&mut self) -> Result<(), anyhow::Error> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Stream not created. Call create_stream first."))?;
        stream.play()?;
        self.is_active = true;
        info!("Audio stream started at sample rate: {}", self.sample_rate);
        Ok(())
    }

    /// Stop the audio stream
    pub fn stop(&mut self) -> Result<(), anyhow::Error> {
        if let Some(stream) = &self.stream {
            stream.pause()?;
            self.is_active = false;
            info!("Audio stream stopped");
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Default for EngineOutput {
    fn default() -> Self {
        Self::new()
    }
}
