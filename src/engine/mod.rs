use anyhow::bail;
use log::{debug, info, warn};

use crate::filters::{Biquad, FilterType, MAX_CHANNELS};
use crate::gen::Waveform;
use crate::params::{
    choice_index, toggle, FilterParams, ParamId, CUTOFF_RANGE, LFO_DEPTH_RANGE, LFO_RATE_RANGE,
    RESONANCE_RANGE,
};
use crate::utils::{SmoothedParam, Smoothing, DEFAULT_SMOOTH_TIME_MS};

pub mod lfo;
pub mod scheduler;

#[cfg(feature = "native")]
pub mod engine_output;

#[cfg(feature = "native")]
pub use engine_output::EngineOutput;

pub use lfo::{modulated_cutoff, synced_frequency, Lfo, MAX_MODULATED_CUTOFF_HZ};
pub use scheduler::{ModulationScheduler, UpdatePeriod, DEFAULT_UPDATE_PERIOD};

/// Ramp time for LFO-derived cutoff targets
pub const MOD_SMOOTH_TIME_MS: f32 = 2.0;

/// Applied cutoff never goes above this fraction of the sample rate
const NYQUIST_GUARD: f64 = 0.49;

/// Stream configuration pushed by the host before processing starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub max_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f64, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            bail!("sample rate must be a positive number, got {}", self.sample_rate);
        }
        if self.max_block_size == 0 {
            bail!("maximum block size must be at least 1");
        }
        if self.num_channels == 0 || self.num_channels > MAX_CHANNELS {
            bail!(
                "channel count must be between 1 and {}, got {}",
                MAX_CHANNELS,
                self.num_channels
            );
        }
        Ok(())
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::new(44100.0, 512, 2)
    }
}

/// LFO-modulated biquad filter - the processor the host talks to
///
/// Parameter setters only record targets. The audio path advances the
/// smoothers once per frame and, on scheduler ticks, pushes a new cutoff and Q
/// into the biquad, so coefficient updates happen at most once per update
/// period. Nothing in the per-sample path allocates, blocks or logs.
pub struct ModFilter {
    spec: ProcessSpec,
    update_period: UpdatePeriod,

    filter: Biquad,
    lfo: Lfo,
    scheduler: ModulationScheduler,

    cutoff: SmoothedParam,
    resonance: SmoothedParam,
    mod_cutoff: SmoothedParam,

    lfo_enabled: bool,
    lfo_sync: bool,
    host_bpm: Option<f64>,
    sync_fallback: bool,

    coefficient_updates: u64,
}

impl ModFilter {
    /// Create a stereo processor with default parameters
    pub fn new(sample_rate: f64) -> Self {
        Self::with_params(ProcessSpec::new(sample_rate, 512, 2), FilterParams::default())
    }

    /// Create a processor from a spec and a parameter snapshot.
    ///
    /// An invalid `spec` is replaced by [`ProcessSpec::default`] so the
    /// processor always produces finite output; hosts still call
    /// [`ModFilter::prepare`] with the real stream format.
    pub fn with_params(spec: ProcessSpec, params: FilterParams) -> Self {
        let spec = match spec.validate() {
            Ok(()) => spec,
            Err(err) => {
                warn!("{err:#}, using defaults until prepare");
                ProcessSpec::default()
            }
        };
        let params = params.clamped();
        let sample_rate = spec.sample_rate;
        let update_period = UpdatePeriod::default();
        let period = update_period.resolve(spec.max_block_size);

        let mut lfo = Lfo::new(
            params.lfo_rate_hz,
            params.lfo_depth,
            Self::control_rate(sample_rate, period),
        );
        lfo.select_waveform(params.lfo_waveform);

        let mut processor = Self {
            spec,
            update_period,
            filter: Biquad::new(sample_rate),
            lfo,
            scheduler: ModulationScheduler::new(period),
            cutoff: Self::cutoff_smoother(params.cutoff_hz, sample_rate, DEFAULT_SMOOTH_TIME_MS),
            resonance: SmoothedParam::new(
                params.resonance,
                RESONANCE_RANGE.min,
                RESONANCE_RANGE.max,
                sample_rate,
                DEFAULT_SMOOTH_TIME_MS,
                Smoothing::Linear,
            ),
            mod_cutoff: Self::cutoff_smoother(params.cutoff_hz, sample_rate, MOD_SMOOTH_TIME_MS),
            lfo_enabled: params.lfo_enabled,
            lfo_sync: params.lfo_sync,
            host_bpm: params.host_bpm,
            sync_fallback: false,
            coefficient_updates: 0,
        };
        processor.filter.set_type(params.filter_type);
        processor.apply_coefficients(params.cutoff_hz, params.resonance);
        processor
    }

    fn cutoff_smoother(initial: f32, sample_rate: f64, smooth_time_ms: f32) -> SmoothedParam {
        SmoothedParam::new(
            initial,
            CUTOFF_RANGE.min,
            CUTOFF_RANGE.max,
            sample_rate,
            smooth_time_ms,
            Smoothing::Multiplicative,
        )
    }

    /// The LFO is pulled once per scheduler tick, so its phase advances at
    /// the sample rate divided by the update period
    fn control_rate(sample_rate: f64, update_period: usize) -> f64 {
        sample_rate / update_period.max(1) as f64
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Configure for a new stream. Coefficients are refreshed for the new
    /// sample rate and all running state is cleared.
    ///
    /// An invalid spec is rejected and the processor is left unchanged.
    pub fn prepare(&mut self, spec: ProcessSpec) -> anyhow::Result<()> {
        spec.validate()?;

        self.spec = spec;
        self.filter.set_sample_rate(spec.sample_rate);
        self.filter.refresh();
        self.cutoff.set_sample_rate(spec.sample_rate);
        self.resonance.set_sample_rate(spec.sample_rate);
        self.mod_cutoff.set_sample_rate(spec.sample_rate);
        self.set_update_period(self.update_period);
        self.reset();

        info!(
            "prepared: {} Hz, block {}, {} channel(s), modulation every {} samples",
            spec.sample_rate,
            spec.max_block_size,
            spec.num_channels,
            self.scheduler.update_period()
        );
        Ok(())
    }

    /// Choose how often modulation reaches the filter. The LFO keeps its
    /// rate in Hz whatever the period.
    pub fn set_update_period(&mut self, update_period: UpdatePeriod) {
        self.update_period = update_period;
        let period = update_period.resolve(self.spec.max_block_size);
        self.scheduler.set_update_period(period);
        self.lfo.prepare(Self::control_rate(self.spec.sample_rate, period));
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn set_cutoff(&mut self, hz: f32) {
        self.cutoff.set_target(CUTOFF_RANGE.clamp(hz));
    }

    pub fn set_resonance(&mut self, q: f32) {
        self.resonance.set_target(RESONANCE_RANGE.clamp(q));
    }

    /// Switch response type. History is cleared and running ramps snap to
    /// their targets before the new type applies.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        if filter_type == self.filter.filter_type() {
            return;
        }
        self.filter.reset();
        self.cutoff.reset();
        self.resonance.reset();
        self.mod_cutoff.set_immediate(self.cutoff.get());
        self.scheduler.reset();
        self.filter.set_type(filter_type);
        debug!("filter type -> {}", filter_type.name());
    }

    /// Turn modulation on or off. Clears filter history and restarts the
    /// modulation ramp from the unmodulated cutoff.
    pub fn set_lfo_enabled(&mut self, enabled: bool) {
        if enabled == self.lfo_enabled {
            return;
        }
        self.lfo_enabled = enabled;
        self.filter.reset();
        self.mod_cutoff.set_immediate(self.cutoff.get());
        self.scheduler.reset();
        self.sync_fallback = false;
        debug!("lfo {}", if enabled { "on" } else { "off" });
    }

    pub fn set_lfo_waveform(&mut self, waveform: Waveform) {
        self.lfo.select_waveform(waveform);
    }

    pub fn set_lfo_depth(&mut self, depth: f32) {
        self.lfo.set_depth(LFO_DEPTH_RANGE.clamp(depth));
    }

    pub fn set_lfo_rate(&mut self, rate_hz: f32) {
        self.lfo.set_frequency(LFO_RATE_RANGE.clamp(rate_hz));
    }

    /// Follow host tempo instead of the free-running rate
    pub fn set_lfo_sync(&mut self, sync: bool) {
        if sync == self.lfo_sync {
            return;
        }
        self.lfo_sync = sync;
        self.sync_fallback = false;
        self.warn_if_tempo_missing();
    }

    /// Latest host tempo; `None` when the host has none to report
    pub fn set_host_bpm(&mut self, host_bpm: Option<f64>) {
        let had_tempo = synced_frequency(self.host_bpm).is_some();
        self.host_bpm = host_bpm;
        if had_tempo {
            self.warn_if_tempo_missing();
        }
    }

    fn warn_if_tempo_missing(&self) {
        if self.lfo_sync && synced_frequency(self.host_bpm).is_none() {
            warn!("host tempo unavailable, synced LFO falls back to free-running rate");
        }
    }

    /// Apply a float-encoded parameter value, as delivered by a host.
    ///
    /// Continuous values are clamped to their range; choices are truncated
    /// to an index and unknown indices are ignored.
    pub fn set_param(&mut self, id: ParamId, value: f32) {
        match id {
            ParamId::Cutoff => self.set_cutoff(value),
            ParamId::Resonance => self.set_resonance(value),
            ParamId::FilterType => {
                if let Some(filter_type) = choice_index(value).and_then(FilterType::from_index) {
                    self.set_filter_type(filter_type);
                }
            }
            ParamId::LfoEnabled => self.set_lfo_enabled(toggle(value)),
            ParamId::LfoWaveform => {
                if let Some(waveform) = choice_index(value).and_then(Waveform::from_index) {
                    self.set_lfo_waveform(waveform);
                }
            }
            ParamId::LfoDepth => self.set_lfo_depth(value),
            ParamId::LfoRate => self.set_lfo_rate(value),
            ParamId::LfoSync => self.set_lfo_sync(toggle(value)),
        }
    }

    /// Apply a full snapshot; unchanged values are no-ops
    pub fn apply_params(&mut self, params: &FilterParams) {
        self.set_cutoff(params.cutoff_hz);
        self.set_resonance(params.resonance);
        self.set_filter_type(params.filter_type);
        self.set_lfo_enabled(params.lfo_enabled);
        self.set_lfo_waveform(params.lfo_waveform);
        self.set_lfo_depth(params.lfo_depth);
        self.set_lfo_rate(params.lfo_rate_hz);
        self.set_lfo_sync(params.lfo_sync);
        self.set_host_bpm(params.host_bpm);
    }

    /// Current parameter targets as a snapshot
    pub fn params(&self) -> FilterParams {
        FilterParams {
            cutoff_hz: self.cutoff.target(),
            resonance: self.resonance.target(),
            filter_type: self.filter.filter_type(),
            lfo_enabled: self.lfo_enabled,
            lfo_waveform: self.lfo.waveform(),
            lfo_depth: self.lfo.depth(),
            lfo_rate_hz: self.lfo.frequency(),
            lfo_sync: self.lfo_sync,
            host_bpm: self.host_bpm,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Transport stop/restart: clear filter history, LFO phase and ramps, and
    /// apply the current targets right away.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.lfo.reset();
        self.cutoff.reset();
        self.resonance.reset();
        self.mod_cutoff.set_immediate(self.cutoff.get());
        self.scheduler.reset();
        self.sync_fallback = false;
        self.apply_coefficients(self.cutoff.get(), self.resonance.get());
    }

    // =========================================================================
    // Audio
    // =========================================================================

    /// Filter one sample. Channel 0 starts a new frame and advances the
    /// modulation state; call channels in order, once each per frame.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        if channel == 0 {
            self.advance_control();
        }
        self.filter.process_sample(channel, input)
    }

    /// Filter one frame in place (one sample per channel)
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32]) {
        self.advance_control();
        for (channel, sample) in frame.iter_mut().enumerate() {
            *sample = self.filter.process_sample(channel, *sample);
        }
    }

    /// Filter an interleaved buffer laid out with the prepared channel count
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        let num_channels = self.spec.num_channels.max(1);
        for frame in buffer.chunks_mut(num_channels) {
            self.process_frame(frame);
        }
    }

    /// Filter planar channel buffers; frames beyond the shortest buffer are left untouched
    pub fn process_planar(&mut self, channels: &mut [&mut [f32]]) {
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        for index in 0..frames {
            self.advance_control();
            for (channel, buffer) in channels.iter_mut().enumerate() {
                buffer[index] = self.filter.process_sample(channel, buffer[index]);
            }
        }
    }

    /// Once per frame: advance ramps, and on scheduler ticks push new
    /// coefficients into the filter
    #[inline]
    fn advance_control(&mut self) {
        let base_cutoff = self.cutoff.tick();
        let resonance = self.resonance.tick();
        if self.lfo_enabled {
            self.mod_cutoff.tick();
        }

        if !self.scheduler.tick() {
            return;
        }

        let cutoff = if self.lfo_enabled {
            let target = self.next_modulated_cutoff(base_cutoff);
            self.mod_cutoff.set_target(target);
            self.mod_cutoff.get()
        } else {
            base_cutoff
        };
        self.apply_coefficients(cutoff, resonance);
    }

    fn next_modulated_cutoff(&mut self, base_cutoff: f32) -> f32 {
        if self.lfo_sync {
            match self.lfo.sample_synced(base_cutoff, self.host_bpm) {
                Some(cutoff) => {
                    self.sync_fallback = false;
                    return cutoff;
                }
                None => self.sync_fallback = true,
            }
        }
        self.lfo.sample_free(base_cutoff)
    }

    /// Keep the cutoff inside the biquad's valid domain, then update
    /// coefficients if anything changed
    fn apply_coefficients(&mut self, cutoff: f32, resonance: f32) {
        let max_cutoff = (self.spec.sample_rate * NYQUIST_GUARD) as f32;
        let cutoff = cutoff.min(max_cutoff).max(CUTOFF_RANGE.min.min(max_cutoff));

        if cutoff == self.filter.cutoff()
            && resonance == self.filter.resonance()
            && self.coefficient_updates > 0
        {
            return;
        }
        self.filter.set_params(cutoff, resonance);
        self.coefficient_updates += 1;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn filter(&self) -> &Biquad {
        &self.filter
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    pub fn spec(&self) -> ProcessSpec {
        self.spec
    }

    /// Cutoff currently applied to the biquad
    pub fn current_cutoff(&self) -> f32 {
        self.filter.cutoff()
    }

    /// Resonance currently applied to the biquad
    pub fn current_resonance(&self) -> f32 {
        self.filter.resonance()
    }

    pub fn update_period_samples(&self) -> usize {
        self.scheduler.update_period()
    }

    /// Number of coefficient recomputations driven by the audio path and reset
    pub fn coefficient_updates(&self) -> u64 {
        self.coefficient_updates
    }

    pub fn lfo_enabled(&self) -> bool {
        self.lfo_enabled
    }

    pub fn lfo_sync(&self) -> bool {
        self.lfo_sync
    }

    /// Set while synced modulation is requested but the host has no usable
    /// tempo; modulation then runs at the free rate
    pub fn sync_fallback(&self) -> bool {
        self.sync_fallback
    }
}
