use crate::{
    dsp::{
        filter::{Biquad, FilterType},
        oscillator::{Oscillator, Waveform},
    },
    graph::{
        node::{Modulatable, RenderCtx},
        router::Destination,
    },
    params::{FILTER_CUTOFF, FREQUENCY, OUTPUT_AMPLITUDE},
};

/*
Signal Path
===========

    Oscillator ──→ Biquad ──→ × amplitude ──→ (to the envelope)

The path owns exactly one oscillator and one filter, and the oscillator is
always the filter's input: `next_sample` pulls from one straight into the
other. Replacing the waveform swaps the generator inside the oscillator,
so the filter's input is rebound in the same step and the filter's state
carries across the switch.

Each of the three modulation destinations has an explicit value (set by
the control API) and a live value (what is rendered):

  Pitch         oscillator base frequency  / running frequency
  FilterCutoff  filter cutoff              / filter cutoff
  Amplitude     output amplitude           / live amplitude

Modulation only writes the live value. Resetting a destination writes
both back to the default.
*/

pub struct SignalPath {
    oscillator: Oscillator,
    filter: Biquad,
    amplitude: f32,
    live_amplitude: f32,
}

impl SignalPath {
    pub fn new(
        waveform: Waveform,
        frequency: f32,
        filter_type: FilterType,
        cutoff_hz: f32,
        resonance: f32,
        amplitude: f32,
    ) -> Self {
        let amplitude = OUTPUT_AMPLITUDE.clamp(amplitude);

        Self {
            oscillator: Oscillator::new(waveform, frequency),
            filter: Biquad::new(filter_type, cutoff_hz, resonance),
            amplitude,
            live_amplitude: amplitude,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    pub fn set_frequency(&mut self, frequency: f32) -> bool {
        self.oscillator.set_frequency(frequency)
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter.set_type(filter_type);
    }

    pub fn set_filter_cutoff(&mut self, cutoff_hz: f32) -> f32 {
        self.filter.set_cutoff(cutoff_hz)
    }

    pub fn set_filter_resonance(&mut self, q: f32) -> f32 {
        self.filter.set_resonance(q)
    }

    pub fn set_amplitude(&mut self, amplitude: f32) -> f32 {
        self.amplitude = OUTPUT_AMPLITUDE.clamp(amplitude);
        self.live_amplitude = self.amplitude;
        self.amplitude
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn filter(&self) -> &Biquad {
        &self.filter
    }

    /// Explicit output amplitude.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Amplitude currently applied to the output.
    pub fn live_amplitude(&self) -> f32 {
        self.live_amplitude
    }

    #[inline]
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        let raw = self.oscillator.next_sample(ctx);
        self.filter.process(raw, ctx) * self.live_amplitude
    }
}

impl Modulatable for SignalPath {
    type Param = Destination;

    fn get_param(&self, param: Destination) -> f32 {
        match param {
            Destination::Pitch => self.oscillator.frequency(),
            Destination::Amplitude => self.live_amplitude,
            Destination::FilterCutoff => self.filter.cutoff(),
        }
    }

    fn apply_modulation(&mut self, param: Destination, value: f32) {
        match param {
            Destination::Pitch => self.oscillator.set_modulated_frequency(value),
            Destination::Amplitude => self.live_amplitude = OUTPUT_AMPLITUDE.clamp(value),
            Destination::FilterCutoff => {
                self.filter.set_cutoff(value);
            }
        }
    }

    fn reset_param(&mut self, param: Destination) {
        match param {
            Destination::Pitch => {
                self.oscillator.set_frequency(FREQUENCY.default);
            }
            Destination::Amplitude => {
                self.set_amplitude(OUTPUT_AMPLITUDE.default);
            }
            Destination::FilterCutoff => {
                self.filter.set_cutoff(FILTER_CUTOFF.default);
            }
        }
    }
}
