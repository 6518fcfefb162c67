/// Hold period used when nothing else is configured
pub const DEFAULT_UPDATE_PERIOD: usize = 10;

/// How often a new modulation value is pushed into the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePeriod {
    /// Fixed number of samples between updates
    Fixed(usize),
    /// Half of the maximum processing block
    HalfBlock,
}

impl UpdatePeriod {
    /// Resolve to a sample count for the given block size (at least 1)
    pub fn resolve(self, max_block_size: usize) -> usize {
        match self {
            UpdatePeriod::Fixed(samples) => samples.max(1),
            UpdatePeriod::HalfBlock => (max_block_size / 2).max(1),
        }
    }
}

impl Default for UpdatePeriod {
    fn default() -> Self {
        UpdatePeriod::Fixed(DEFAULT_UPDATE_PERIOD)
    }
}

/// Countdown gate for coefficient updates
///
/// `tick` is called once per processed frame and reports `true` on the frames
/// where the caller should compute and apply a new cutoff. Between those
/// frames the filter holds its previous value.
#[derive(Debug, Clone)]
pub struct ModulationScheduler {
    samples_until_next_update: usize,
    update_period: usize,
}

impl ModulationScheduler {
    /// Create a scheduler that fires on its first tick
    pub fn new(update_period: usize) -> Self {
        Self {
            samples_until_next_update: 0,
            update_period: update_period.max(1),
        }
    }

    /// Change the period. Takes effect at the next reload.
    pub fn set_update_period(&mut self, update_period: usize) {
        self.update_period = update_period.max(1);
    }

    pub fn update_period(&self) -> usize {
        self.update_period
    }

    pub fn samples_until_next_update(&self) -> usize {
        self.samples_until_next_update
    }

    /// Make the next tick fire
    pub fn reset(&mut self) {
        self.samples_until_next_update = 0;
    }

    /// Advance one frame; returns whether an update is due on this frame
    #[inline]
    pub fn tick(&mut self) -> bool {
        let due = self.samples_until_next_update == 0;
        if due {
            self.samples_until_next_update = self.update_period;
        }
        self.samples_until_next_update -= 1;
        due
    }
}

impl Default for ModulationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let mut scheduler = ModulationScheduler::new(10);
        let fired: Vec<usize> = (0..35).filter(|_| scheduler.tick()).collect();
        assert_eq!(fired.len(), 4);
    }

    #[test]
    fn test_fire_positions() {
        let mut scheduler = ModulationScheduler::new(4);
        let pattern: Vec<bool> = (0..9).map(|_| scheduler.tick()).collect();
        assert_eq!(
            pattern,
            vec![true, false, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn test_period_of_one_fires_every_tick() {
        let mut scheduler = ModulationScheduler::new(0);
        assert_eq!(scheduler.update_period(), 1);
        assert!((0..5).all(|_| scheduler.tick()));
    }

    #[test]
    fn test_reset_fires_next_tick() {
        let mut scheduler = ModulationScheduler::new(10);
        scheduler.tick();
        scheduler.tick();
        assert!(!scheduler.tick());

        scheduler.reset();
        assert!(scheduler.tick());
    }

    #[test]
    fn test_update_period_resolution() {
        assert_eq!(UpdatePeriod::Fixed(10).resolve(512), 10);
        assert_eq!(UpdatePeriod::HalfBlock.resolve(512), 256);
        assert_eq!(UpdatePeriod::HalfBlock.resolve(1), 1);
        assert_eq!(UpdatePeriod::default(), UpdatePeriod::Fixed(DEFAULT_UPDATE_PERIOD));
    }
}
