use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{lfo::Lfo, smoother::ParamSmoother},
    error::ControlError,
    graph::node::{Modulatable, RenderCtx},
    params::{Param, FILTER_CUTOFF, FREQUENCY, OUTPUT_AMPLITUDE},
};

/*
LFO Router
==========

Connects the single LFO to at most one destination at a time.

    Lfo ──(read at 20 Hz)──→ scaling law ──target──→ ParamSmoother ──(every sample)──→ destination

Two rates
---------

The LFO's value is sampled at CONTROL rate (every 50 ms by default) and
turned into a new target for the route's smoother. The smoother then
ramps toward that target over ~10 ms, and its current value is written to
the destination on EVERY audio sample.

Writing the raw 20 Hz value straight to the destination would produce a
staircase, audible as a 20 Hz buzz on pitch and a zipper on the filter.
The smoother rounds each stair into a short ramp.

  raw target   ┌──┐  ┌──┐            smoothed   ╭──╮  ╭──╮
               │  └──┘  │                      ╱   ╰──╯   ╲
           ────┘        └──                ───╯            ╰──

Scaling laws (v = LFO value in [0, 1])
--------------------------------------

  Pitch          base_freq × (0.5 + v)   → 0.5× .. 1.5× of the base
  Amplitude      v                       → 0 .. 1 output gain
  FilterCutoff   500 + v × 4000          → 500 .. 4500 Hz

The pitch base is the oscillator's frequency at the moment the route is
attached (440 Hz unless changed), so v = 0 gives 220 Hz and v = 1 gives
660 Hz by default.

Retargeting
-----------

    target ∈ { None, Pitch, Amplitude, FilterCutoff }

  set_target(new), new ≠ old:
    1. old ≠ None → drop the old ControlTask (its scheduler and smoother
       go with it) and reset the old destination to its default:
         Pitch → 440 Hz, Amplitude → 0.5, FilterCutoff → 1000 Hz
    2. new = None → stop the LFO. Nothing else runs.
    3. new ≠ None → start the LFO (free-running, phase kept), build a
       smoother seeded at the destination's current value and a fresh
       ControlTask that ticks immediately and then every control period.

  set_target(old) is a no-op: the running task is not restarted.

The active route is an `Option<ControlTask>`, so "at most one scheduler
per destination" is a property of the type. Retargeting happens between
two samples of the render loop; the render loop sees either the old task
or the new one, never both and never neither-with-a-stale-value.

Control ticks are counted in rendered samples rather than wall-clock time:
the task is cancelled in the same call that detaches it and its rate is
locked to the audio clock.
*/

/// Where the LFO is routed. `None` means unrouted.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoTarget {
    #[default]
    None,
    Pitch,
    Amplitude,
    FilterCutoff,
}

impl LfoTarget {
    pub const ALL: [LfoTarget; 4] = [
        LfoTarget::None,
        LfoTarget::Pitch,
        LfoTarget::Amplitude,
        LfoTarget::FilterCutoff,
    ];

    pub fn destination(self) -> Option<Destination> {
        match self {
            LfoTarget::None => None,
            LfoTarget::Pitch => Some(Destination::Pitch),
            LfoTarget::Amplitude => Some(Destination::Amplitude),
            LfoTarget::FilterCutoff => Some(Destination::FilterCutoff),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LfoTarget::None => "None",
            LfoTarget::Pitch => "Pitch",
            LfoTarget::Amplitude => "Amplitude",
            LfoTarget::FilterCutoff => "Filter Cutoff",
        }
    }
}

impl fmt::Display for LfoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LfoTarget {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squashed: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        LfoTarget::ALL
            .into_iter()
            .find(|t| t.label().replace(' ', "").eq_ignore_ascii_case(&squashed))
            .ok_or_else(|| ControlError::UnknownVariant {
                param: Param::LfoTarget,
                input: s.to_string(),
            })
    }
}

/// A parameter the LFO can drive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Pitch,
    Amplitude,
    FilterCutoff,
}

impl Destination {
    /// Value the destination is reset to when its route is detached.
    pub fn default_value(self) -> f32 {
        match self {
            Destination::Pitch => FREQUENCY.default,
            Destination::Amplitude => OUTPUT_AMPLITUDE.default,
            Destination::FilterCutoff => FILTER_CUTOFF.default,
        }
    }

    /// Smoother target for LFO value `v` in [0, 1].
    #[inline]
    pub fn scale(self, v: f32, base: f32) -> f32 {
        match self {
            Destination::Pitch => base * (0.5 + v),
            Destination::Amplitude => v,
            Destination::FilterCutoff => 500.0 + v * 4000.0,
        }
    }

    /// The control that writes this destination directly.
    pub fn param(self) -> Param {
        match self {
            Destination::Pitch => Param::Frequency,
            Destination::Amplitude => Param::OutputAmplitude,
            Destination::FilterCutoff => Param::FilterCutoff,
        }
    }

    pub fn target(self) -> LfoTarget {
        match self {
            Destination::Pitch => LfoTarget::Pitch,
            Destination::Amplitude => LfoTarget::Amplitude,
            Destination::FilterCutoff => LfoTarget::FilterCutoff,
        }
    }
}

/// The scheduled control-rate task of an active route.
///
/// Owns the route's destination binding and smoother; dropping it cancels
/// the route.
#[derive(Debug, Clone)]
pub struct ControlTask {
    destination: Destination,
    base: f32,
    smoother: ParamSmoother,
    period_samples: u32,
    countdown: u32,
    ticks: u64,
}

impl ControlTask {
    fn new(destination: Destination, seed: f32, period_samples: u32, ramp_time: f32) -> Self {
        Self {
            destination,
            base: seed,
            smoother: ParamSmoother::new(seed, ramp_time),
            period_samples: period_samples.max(1),
            countdown: 0,
            ticks: 0,
        }
    }

    /// Advance one sample: on a tick, push a new target; always advance the
    /// smoother. Returns the value to apply to the destination.
    #[inline]
    fn next_sample(&mut self, lfo_value: f32, ctx: &RenderCtx) -> f32 {
        if self.countdown == 0 {
            let target = self.destination.scale(lfo_value, self.base);
            self.smoother.set_target(target, ctx);
            self.countdown = self.period_samples;
            self.ticks += 1;
        }
        self.countdown -= 1;
        self.smoother.next_sample()
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn smoother(&self) -> &ParamSmoother {
        &self.smoother
    }

    pub fn period_samples(&self) -> u32 {
        self.period_samples
    }

    /// Number of control ticks fired since the route was attached.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

pub struct LfoRouter {
    lfo: Lfo,
    task: Option<ControlTask>,
    control_period: f32,
    smoothing_time: f32,
}

impl LfoRouter {
    /// `control_period` and `smoothing_time` are in seconds.
    pub fn new(lfo_frequency: f32, control_period: f32, smoothing_time: f32) -> Self {
        Self {
            lfo: Lfo::new(lfo_frequency),
            task: None,
            control_period,
            smoothing_time,
        }
    }

    pub fn target(&self) -> LfoTarget {
        self.task
            .as_ref()
            .map_or(LfoTarget::None, |task| task.destination.target())
    }

    /// True if `destination` is currently driven by the LFO.
    pub fn owns(&self, destination: Destination) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| task.destination == destination)
    }

    pub fn set_lfo_frequency(&mut self, frequency: f32) -> f32 {
        self.lfo.set_frequency(frequency)
    }

    /// Move the route to `target`, undoing the previous one. Returns false
    /// if `target` was already active.
    pub fn set_target<M>(&mut self, target: LfoTarget, path: &mut M, ctx: &RenderCtx) -> bool
    where
        M: Modulatable<Param = Destination>,
    {
        if target == self.target() {
            return false;
        }

        if let Some(old) = self.task.take() {
            path.reset_param(old.destination);
        }

        match target.destination() {
            None => self.lfo.stop(),
            Some(destination) => {
                self.lfo.start();
                let seed = path.get_param(destination);
                self.task = Some(ControlTask::new(
                    destination,
                    seed,
                    ctx.samples_for(self.control_period),
                    self.smoothing_time,
                ));
            }
        }

        true
    }

    /// Advance the LFO and the active route by one sample, writing the
    /// smoothed value to the destination.
    #[inline]
    pub fn next_sample<M>(&mut self, path: &mut M, ctx: &RenderCtx)
    where
        M: Modulatable<Param = Destination>,
    {
        let lfo_value = self.lfo.next_sample(ctx);
        if let Some(task) = self.task.as_mut() {
            let value = task.next_sample(lfo_value, ctx);
            path.apply_modulation(task.destination, value);
        }
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    pub fn task(&self) -> Option<&ControlTask> {
        self.task.as_ref()
    }

    /// Smoothed value currently applied by the active route.
    pub fn modulated_value(&self) -> Option<f32> {
        self.task.as_ref().map(|task| task.smoother.current())
    }
}
