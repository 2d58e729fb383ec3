use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::graph::node::RenderCtx;
use crate::params::{Param, FILTER_CUTOFF, FILTER_RESONANCE};

/*
Biquad Filter
=============

A second-order (two-pole, two-zero) IIR filter. One difference equation
covers every response; only the five coefficients change:

    y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] − a1·y[n-1] − a2·y[n-2]

Coefficients follow the RBJ "Audio EQ Cookbook":

    w0    = 2π · cutoff / sample_rate
    alpha = sin(w0) / (2·Q)

                 lowpass               highpass
    b0       (1 − cos w0) / 2      (1 + cos w0) / 2
    b1        1 − cos w0          −(1 + cos w0)
    b2       (1 − cos w0) / 2      (1 + cos w0) / 2
    a0        1 + alpha             1 + alpha
    a1       −2 cos w0             −2 cos w0
    a2        1 − alpha             1 − alpha

(all divided through by a0)

| type      | passes       | rejects      | slope      |
| --------- | ------------ | ------------ | ---------- |
| low-pass  | below cutoff | above cutoff | 12 dB/oct  |
| high-pass | above cutoff | below cutoff | 12 dB/oct  |

Q (resonance) sets the peak at the cutoff. Q = 0.707 is maximally flat;
higher Q rings and boosts, lower Q rolls off early.

Parameter handling
------------------

Cutoff is clamped to [20, 20000] Hz and Q to [0.1, 10] on every write, so
nothing out of range reaches the coefficients. The coefficient maths
additionally keeps w0 below Nyquist (the stored cutoff is not changed) so
a 20 kHz cutoff stays stable at low sample rates.

Coefficients are recomputed lazily on the next sample after a change.
When the LFO sweeps the cutoff this happens every sample while the
smoother is ramping, and not at all once it has settled.

Switching lowpass/highpass swaps the coefficient branch only; the delay
line is kept, so the switch is instantaneous.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
}

impl FilterType {
    pub const ALL: [FilterType; 2] = [FilterType::Lowpass, FilterType::Highpass];

    pub fn label(self) -> &'static str {
        match self {
            FilterType::Lowpass => "Lowpass",
            FilterType::Highpass => "Highpass",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterType {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ControlError::UnknownVariant {
                param: Param::FilterType,
                input: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl Coefficients {
    const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn compute(filter_type: FilterType, cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let w0 = TAU * (cutoff_hz / sample_rate).min(0.49);
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        let (b0, b1) = match filter_type {
            FilterType::Lowpass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0),
            FilterType::Highpass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0)),
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b0 / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }
}

pub struct Biquad {
    filter_type: FilterType,
    cutoff_hz: f32,
    q: f32,

    coeffs: Coefficients,
    // Sample rate the coefficients were computed for; 0 forces a recompute
    coeffs_rate: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            filter_type,
            cutoff_hz: FILTER_CUTOFF.clamp(cutoff_hz),
            q: FILTER_RESONANCE.clamp(q),
            coeffs: Coefficients::PASSTHROUGH,
            coeffs_rate: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::Lowpass, cutoff_hz, FILTER_RESONANCE.default)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::Highpass, cutoff_hz, FILTER_RESONANCE.default)
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        if self.filter_type != filter_type {
            self.filter_type = filter_type;
            self.coeffs_rate = 0.0;
        }
    }

    /// Returns the stored (clamped) cutoff.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) -> f32 {
        let cutoff_hz = FILTER_CUTOFF.clamp(cutoff_hz);
        if cutoff_hz != self.cutoff_hz {
            self.cutoff_hz = cutoff_hz;
            self.coeffs_rate = 0.0;
        }
        self.cutoff_hz
    }

    /// Returns the stored (clamped) Q.
    pub fn set_resonance(&mut self, q: f32) -> f32 {
        let q = FILTER_RESONANCE.clamp(q);
        if q != self.q {
            self.q = q;
            self.coeffs_rate = 0.0;
        }
        self.q
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.q
    }

    /// Filter a single sample.
    #[inline]
    pub fn process(&mut self, input: f32, ctx: &RenderCtx) -> f32 {
        if self.coeffs_rate != ctx.sample_rate {
            self.coeffs =
                Coefficients::compute(self.filter_type, self.cutoff_hz, self.q, ctx.sample_rate);
            self.coeffs_rate = ctx.sample_rate;
        }

        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, ctx);
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Oscillator;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len() / 4;
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_sine_peak(filter: &mut Biquad, freq: f32) -> f32 {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut osc = Oscillator::sine(freq);
        let mut buffer = vec![0.0f32; 4096];
        osc.render(&mut buffer, &ctx);
        filter.render(&mut buffer, &ctx);
        peak_after_transient(&buffer)
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = Biquad::lowpass(500.0);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer, &RenderCtx::new(SAMPLE_RATE));
        assert!((buffer[2047] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = Biquad::highpass(500.0);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer, &RenderCtx::new(SAMPLE_RATE));
        assert!(buffer[2047].abs() < 0.01);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = Biquad::lowpass(500.0);
        let peak = filtered_sine_peak(&mut filter, 5_000.0);
        assert!(peak < 0.05, "expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_highpass_filters_low_freq() {
        let mut filter = Biquad::highpass(5_000.0);
        let peak = filtered_sine_peak(&mut filter, 500.0);
        assert!(peak < 0.05, "expected low freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_resonance_boosts_cutoff() {
        let mut flat = Biquad::new(FilterType::Lowpass, 1_000.0, 0.707);
        let mut peaky = Biquad::new(FilterType::Lowpass, 1_000.0, 5.0);

        let flat_peak = filtered_sine_peak(&mut flat, 1_000.0);
        let peaky_peak = filtered_sine_peak(&mut peaky, 1_000.0);

        assert!(
            peaky_peak > flat_peak * 3.0,
            "resonance should boost cutoff: flat={flat_peak}, peaky={peaky_peak}"
        );
    }

    #[test]
    fn test_set_cutoff_clamps() {
        let mut filter = Biquad::lowpass(1000.0);

        assert_eq!(filter.set_cutoff(2000.0), 2000.0);
        assert_eq!(filter.set_cutoff(5.0), 20.0);
        assert_eq!(filter.set_cutoff(50_000.0), 20_000.0);
        assert_eq!(filter.cutoff(), 20_000.0);
    }

    #[test]
    fn test_set_resonance_clamps() {
        let mut filter = Biquad::lowpass(1000.0);

        assert_eq!(filter.set_resonance(2.0), 2.0);
        assert_eq!(filter.set_resonance(0.0), 0.1);
        assert_eq!(filter.set_resonance(99.0), 10.0);
        assert_eq!(filter.resonance(), 10.0);
    }

    #[test]
    fn test_type_switch_is_immediate() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut filter = Biquad::lowpass(500.0);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer, &ctx);

        filter.set_type(FilterType::Highpass);
        assert_eq!(filter.filter_type(), FilterType::Highpass);

        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer, &ctx);
        assert!(buffer[2047].abs() < 0.01);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_top_cutoff_stable_at_low_rate() {
        let ctx = RenderCtx::new(22_050.0);
        let mut filter = Biquad::new(FilterType::Lowpass, 20_000.0, 10.0);
        let mut osc = Oscillator::sine(440.0);
        let mut buffer = vec![0.0f32; 4096];
        osc.render(&mut buffer, &ctx);
        filter.render(&mut buffer, &ctx);
        assert!(buffer.iter().all(|s| s.is_finite() && s.abs() < 100.0));
    }

    #[test]
    fn parses_filter_labels() {
        assert_eq!("highpass".parse::<FilterType>(), Ok(FilterType::Highpass));
        assert!("bandpass".parse::<FilterType>().is_err());
    }
}
