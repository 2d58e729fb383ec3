//! Low Frequency Oscillator (LFO) for parameter modulation.

use crate::{
    dsp::oscillator::Oscillator,
    graph::node::RenderCtx,
    params::LFO_FREQUENCY,
};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running below the audio band. Same waveform maths
as the audio oscillator; it just moves a parameter instead of a speaker.

Vocabulary
----------

  audio-rate      ~20 Hz to ~20,000 Hz. Heard as pitch.

  control-rate    ~0.1 Hz to ~20 Hz. Heard as movement: wobble, sweep,
                  tremolo, vibrato.

  bipolar         Output swings −1.0 to +1.0.

  unipolar        Output swings 0.0 to 1.0.
                  Convert: unipolar = (bipolar + 1.0) / 2.0

  free-running    Phase runs continuously and ignores note events, so each
                  note catches the sweep at a different point.


This LFO
--------

  - Sine shape, unipolar output in [0, 1]. Every destination's scaling law
    is written in terms of that 0..1 value.
  - Rate clamped to [0.1, 20] Hz.
  - Free-running: note on/off never resets the phase.
  - Start/stop: a stopped LFO freezes its phase and holds its last value.
    Starting it again resumes from where it stopped.

The phase advances every audio sample (so the rate is exact), but its
value is only *read* at control rate by the router. See `graph::router`.
*/

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Free-running unipolar sine LFO.
pub struct Lfo {
    osc: Oscillator,
    frequency: f32,
    running: bool,
    value: f32,
}

impl Lfo {
    pub fn new(frequency: f32) -> Self {
        let frequency = LFO_FREQUENCY.clamp(frequency);
        Self {
            osc: Oscillator::sine(frequency),
            frequency,
            running: false,
            // sin(0): the value at phase 0
            value: bipolar_to_unipolar(0.0),
        }
    }

    /// Returns the stored (clamped) rate.
    pub fn set_frequency(&mut self, frequency: f32) -> f32 {
        self.frequency = LFO_FREQUENCY.clamp(frequency);
        self.osc.set_frequency(self.frequency);
        self.frequency
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Instantaneous output in [0, 1].
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one sample (no-op while stopped) and return the value.
    #[inline]
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        if self.running {
            self.value = bipolar_to_unipolar(self.osc.next_sample(ctx));
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bipolar_to_unipolar() {
        assert!((bipolar_to_unipolar(-1.0) - 0.0).abs() < 1e-6);
        assert!((bipolar_to_unipolar(0.0) - 0.5).abs() < 1e-6);
        assert!((bipolar_to_unipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_output_is_unipolar() {
        let ctx = RenderCtx::new(48_000.0);
        let mut lfo = Lfo::new(5.0);
        lfo.start();

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..48_000 {
            let v = lfo.next_sample(&ctx);
            min = min.min(v);
            max = max.max(v);
        }
        assert!(min >= 0.0 && min < 0.01, "min {min}");
        assert!(max <= 1.0 && max > 0.99, "max {max}");
    }

    #[test]
    fn test_stopped_lfo_holds_value() {
        let ctx = RenderCtx::new(1_000.0);
        let mut lfo = Lfo::new(1.0);
        assert!((lfo.value() - 0.5).abs() < 1e-6);

        lfo.start();
        for _ in 0..100 {
            lfo.next_sample(&ctx);
        }
        lfo.stop();
        let held = lfo.value();
        for _ in 0..100 {
            assert_eq!(lfo.next_sample(&ctx), held);
        }
    }

    #[test]
    fn test_rate_clamped() {
        let mut lfo = Lfo::new(100.0);
        assert_eq!(lfo.frequency(), 20.0);
        assert_eq!(lfo.set_frequency(0.0), 0.1);
        assert_eq!(lfo.set_frequency(3.0), 3.0);
    }

    #[test]
    fn test_one_cycle_per_period() {
        let ctx = RenderCtx::new(1_000.0);
        let mut lfo = Lfo::new(2.0);
        lfo.start();

        // 2 Hz at 1 kHz: peak a quarter cycle in (sample 125)
        let values: Vec<f32> = (0..500).map(|_| lfo.next_sample(&ctx)).collect();
        let peak = values
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
        assert!((peak.0 as i32 - 125).abs() <= 1, "peak at {}", peak.0);
    }
}
