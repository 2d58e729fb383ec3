use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::graph::node::RenderCtx;
use crate::params::Param;

/*
Oscillator
==========

The sound source of the voice. An oscillator keeps a phase that advances by
`frequency / sample_rate` each sample and maps that phase to a waveform.

  phase       Position in the current cycle, 0.0 (start) to 1.0 (wrap).
  increment   Phase advance per sample: dt = frequency / sample_rate.

Waveforms
---------

  Sine      sin(2π·phase). Fundamental only.
  Saw       2·phase − 1. Every harmonic, falling as 1/n. Bright.
  Square    +1 for the first half cycle, −1 for the second. Odd harmonics.
  Triangle  Built from the generic breakpoint wave below with rise = 0.5.

The saw and square jump instantly once per cycle. A jump in a sampled
signal aliases (harmonics above Nyquist fold back down as inharmonic
noise), so both are corrected with PolyBLEP: a two-sample polynomial
residual that rounds off the step right where it happens.

        naive saw          PolyBLEP saw
          ╱│  ╱│             ╱╮  ╱╮
         ╱ │ ╱ │            ╱ │ ╱ │
        ╱  │╱  │           ╱  ╰╯  ╰

Breakpoint wave (triangle)
--------------------------

There is no dedicated triangle generator. A `PeriodicWave` rises linearly
from −1 to +1 over the first `rise` fraction of the cycle and falls back
over the rest:

    rise = 0.5   triangle   ╱╲╱╲
    rise = 1.0   ramp up    ╱│╱│
    rise = 0.0   ramp down  │╲│╲

Its corners are continuous, so it needs no band-limiting.

Waveform switches
-----------------

Switching waveform discards the running generator and builds a fresh one
(phase 0) at the oscillator's base frequency. Any pitch modulation that
was applied to the old generator is not carried over; whoever owns the
modulation re-applies it on the next sample.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Square => "Square",
            Waveform::Saw => "Saw",
            Waveform::Triangle => "Triangle",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Waveform {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Waveform::ALL
            .into_iter()
            .find(|w| w.label().eq_ignore_ascii_case(name))
            .or_else(|| name.eq_ignore_ascii_case("sawtooth").then_some(Waveform::Saw))
            .ok_or_else(|| ControlError::UnknownVariant {
                param: Param::Waveform,
                input: s.to_string(),
            })
    }
}

/// PolyBLEP residual for a unit step at phase 0.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

/// Phase accumulator in [0, 1).
#[derive(Debug, Clone, Copy, Default)]
struct Phasor {
    phase: f32,
}

impl Phasor {
    /// Returns the current phase, then advances by `dt`.
    #[inline]
    fn advance(&mut self, dt: f32) -> f32 {
        let phase = self.phase;
        self.phase = (self.phase + dt).fract();
        phase
    }
}

/// Generic breakpoint waveform: linear rise over `rise` of the cycle, linear
/// fall over the remainder.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicWave {
    phasor: Phasor,
    rise: f32,
}

impl PeriodicWave {
    pub fn new(rise: f32) -> Self {
        Self {
            phasor: Phasor::default(),
            rise: rise.clamp(0.0, 1.0),
        }
    }

    pub fn triangle() -> Self {
        Self::new(0.5)
    }

    /// Waveform value at `phase` (no state change).
    #[inline]
    pub fn shape(&self, phase: f32) -> f32 {
        if phase < self.rise {
            -1.0 + 2.0 * phase / self.rise
        } else {
            1.0 - 2.0 * (phase - self.rise) / (1.0 - self.rise)
        }
    }

    #[inline]
    fn next_sample(&mut self, dt: f32) -> f32 {
        let phase = self.phasor.advance(dt);
        self.shape(phase)
    }
}

/// The live generator. One variant per waveform, each owning its own phase.
#[derive(Debug, Clone, Copy)]
enum Generator {
    Sine(Phasor),
    Square(Phasor),
    Saw(Phasor),
    Periodic(PeriodicWave),
}

impl Generator {
    fn new(waveform: Waveform) -> Self {
        match waveform {
            Waveform::Sine => Generator::Sine(Phasor::default()),
            Waveform::Square => Generator::Square(Phasor::default()),
            Waveform::Saw => Generator::Saw(Phasor::default()),
            Waveform::Triangle => Generator::Periodic(PeriodicWave::triangle()),
        }
    }

    #[inline]
    fn next_sample(&mut self, dt: f32) -> f32 {
        // PolyBLEP needs the correction window to fit inside half a cycle.
        let blep_dt = dt.clamp(f32::EPSILON, 0.5);

        match self {
            Generator::Sine(phasor) => (TAU * phasor.advance(dt)).sin(),
            Generator::Saw(phasor) => {
                let t = phasor.advance(dt);
                (2.0 * t - 1.0) - poly_blep(t, blep_dt)
            }
            Generator::Square(phasor) => {
                let t = phasor.advance(dt);
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, blep_dt) - poly_blep((t + 0.5).fract(), blep_dt)
            }
            Generator::Periodic(wave) => wave.next_sample(dt),
        }
    }
}

/// A single audio-rate oscillator with a replaceable waveform generator.
///
/// `base_frequency` is the explicit setting; `frequency` is what the
/// generator is currently running at, which differs only while pitch
/// modulation is applied.
pub struct Oscillator {
    generator: Generator,
    waveform: Waveform,
    base_frequency: f32,
    frequency: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        let frequency = if frequency.is_finite() && frequency > 0.0 {
            frequency
        } else {
            crate::params::FREQUENCY.default
        };

        Self {
            generator: Generator::new(waveform),
            waveform,
            base_frequency: frequency,
            frequency,
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(Waveform::Sine, frequency)
    }

    /// Replace the generator. The new one starts at phase 0 and at the base
    /// (unmodulated) frequency.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.generator = Generator::new(waveform);
        self.waveform = waveform;
        self.frequency = self.base_frequency;
    }

    /// Set the explicit frequency. Non-positive or non-finite values are
    /// ignored and `false` is returned.
    pub fn set_frequency(&mut self, frequency: f32) -> bool {
        if !(frequency.is_finite() && frequency > 0.0) {
            return false;
        }
        self.base_frequency = frequency;
        self.frequency = frequency;
        true
    }

    /// Run the generator at `frequency` without changing the base setting.
    pub fn set_modulated_frequency(&mut self, frequency: f32) {
        if frequency.is_finite() && frequency > 0.0 {
            self.frequency = frequency;
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    #[inline]
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        self.generator.next_sample(self.frequency / ctx.sample_rate)
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }
}
