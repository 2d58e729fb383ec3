#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::VoiceParams;

/// Settings for creating a voice with [`voice`](crate::synth::voice()).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub sample_rate: f32,
    /// Control messages the handle can queue before the voice drains them.
    pub queue_capacity: usize,
    /// Seconds between LFO reads (0.05 s = 20 Hz).
    pub control_period_s: f32,
    /// Ramp length of the modulation smoother, in seconds.
    pub smoothing_time_s: f32,
    pub params: VoiceParams,
}

impl VoiceConfig {
    pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_control_period(mut self, seconds: f32) -> Self {
        self.control_period_s = seconds;
        self
    }

    pub fn with_smoothing_time(mut self, seconds: f32) -> Self {
        self.smoothing_time_s = seconds;
        self
    }

    pub fn with_params(mut self, params: VoiceParams) -> Self {
        self.params = params;
        self
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            queue_capacity: 256,
            control_period_s: 0.05,
            smoothing_time_s: 0.01,
            params: VoiceParams::default(),
        }
    }
}
