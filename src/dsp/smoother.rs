//! Ramped parameter values for glitch-free updates.

use crate::graph::node::RenderCtx;

/*
Parameter Smoothing
===================

A parameter that jumps from one value to another between two samples
produces a step in the signal, heard as a click (amplitude), a zipper
(cutoff) or a glitch in pitch. Updating a parameter 20 times per second
turns that step into a 20 Hz buzz.

The smoother sits between whoever sets a value and whoever reads it:

    writer ──set_target──→ [ current ──ramp──→ target ] ──current──→ reader

Each `set_target` starts a straight-line ramp from wherever `current` is
now to the new target, lasting `ramp_time` seconds. Calling `set_target`
again mid-ramp simply starts a new ramp from the in-between value, so
there is never a discontinuity, only a change of slope.

  value
    │          target₂ ─ ─ ─ ─ ─ ─ ─ ┌────
    │                              ╱
    │  target₁ ┌─────────╮       ╱
    │        ╱            ╲   ╱
    │      ╱                ╲╱
    │────╱
    └──────────────────────────────────→ t
        ramp     hold     ramp → ramp (retarget mid-ramp)

The ramp snaps exactly onto the target at its last sample, so repeated
retargeting never accumulates floating point drift.
*/

#[derive(Debug, Clone)]
pub struct ParamSmoother {
    current: f32,
    target: f32,
    ramp_time: f32,
    step: f32,
    samples_remaining: u32,
}

impl ParamSmoother {
    /// New smoother resting at `initial`.
    pub fn new(initial: f32, ramp_time: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            ramp_time: ramp_time.max(0.0),
            step: 0.0,
            samples_remaining: 0,
        }
    }

    /// Start a ramp from the current value to `target`.
    pub fn set_target(&mut self, target: f32, ctx: &RenderCtx) {
        self.target = target;
        self.samples_remaining = ctx.samples_for(self.ramp_time);
        self.step = (self.target - self.current) / self.samples_remaining as f32;
    }

    /// Jump to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    /// Advance one sample and return the new current value.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;

            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }

        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn ramp_time(&self) -> f32 {
        self.ramp_time
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }
}
