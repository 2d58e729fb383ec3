//! Numeric controls reachable with the arrow keys.

use monosynth::{Param, Result, VoiceHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Frequency,
    Attack,
    Decay,
    Sustain,
    Release,
    LfoFrequency,
    FilterCutoff,
    FilterResonance,
    OutputAmplitude,
}

/// How one key press moves a value.
enum Step {
    Add(f32),
    Scale(f32),
}

impl Control {
    pub const ALL: [Control; 9] = [
        Control::Frequency,
        Control::Attack,
        Control::Decay,
        Control::Sustain,
        Control::Release,
        Control::LfoFrequency,
        Control::FilterCutoff,
        Control::FilterResonance,
        Control::OutputAmplitude,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::Frequency => "Frequency",
            Control::Attack => "Attack",
            Control::Decay => "Decay",
            Control::Sustain => "Sustain",
            Control::Release => "Release",
            Control::LfoFrequency => "LFO Frequency",
            Control::FilterCutoff => "Filter Cutoff",
            Control::FilterResonance => "Filter Resonance",
            Control::OutputAmplitude => "Amplitude",
        }
    }

    pub fn param(self) -> Param {
        match self {
            Control::Frequency => Param::Frequency,
            Control::Attack => Param::Attack,
            Control::Decay => Param::Decay,
            Control::Sustain => Param::Sustain,
            Control::Release => Param::Release,
            Control::LfoFrequency => Param::LfoFrequency,
            Control::FilterCutoff => Param::FilterCutoff,
            Control::FilterResonance => Param::FilterResonance,
            Control::OutputAmplitude => Param::OutputAmplitude,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Control::Frequency | Control::LfoFrequency | Control::FilterCutoff => "Hz",
            Control::Attack | Control::Decay | Control::Release => "s",
            Control::Sustain | Control::FilterResonance | Control::OutputAmplitude => "",
        }
    }

    fn step(self) -> Step {
        match self {
            // One semitone
            Control::Frequency => Step::Scale(2f32.powf(1.0 / 12.0)),
            Control::Attack | Control::Decay => Step::Add(0.05),
            Control::Release => Step::Add(0.1),
            Control::Sustain | Control::OutputAmplitude => Step::Add(0.05),
            Control::LfoFrequency => Step::Scale(1.1),
            // A third of an octave
            Control::FilterCutoff => Step::Scale(2f32.powf(1.0 / 3.0)),
            Control::FilterResonance => Step::Add(0.1),
        }
    }

    pub fn value(self, handle: &VoiceHandle) -> f32 {
        let adsr = handle.adsr();
        match self {
            Control::Frequency => handle.frequency(),
            Control::Attack => adsr.attack,
            Control::Decay => adsr.decay,
            Control::Sustain => adsr.sustain,
            Control::Release => adsr.release,
            Control::LfoFrequency => handle.lfo_frequency(),
            Control::FilterCutoff => handle.filter_cutoff(),
            Control::FilterResonance => handle.filter_resonance(),
            Control::OutputAmplitude => handle.output_amplitude(),
        }
    }

    /// Move the value one step up or down through the handle.
    pub fn nudge(self, handle: &mut VoiceHandle, up: bool) -> Result<f32> {
        let current = self.value(handle);
        let next = match (self.step(), up) {
            (Step::Add(delta), true) => current + delta,
            (Step::Add(delta), false) => current - delta,
            (Step::Scale(ratio), true) => current * ratio,
            (Step::Scale(ratio), false) => current / ratio,
        };

        match self {
            Control::Frequency => handle.set_frequency(next),
            Control::Attack => handle.set_attack(next),
            Control::Decay => handle.set_decay(next),
            Control::Sustain => handle.set_sustain(next),
            Control::Release => handle.set_release(next),
            Control::LfoFrequency => handle.set_lfo_frequency(next),
            Control::FilterCutoff => handle.set_filter_cutoff(next),
            Control::FilterResonance => handle.set_filter_resonance(next),
            Control::OutputAmplitude => handle.set_output_amplitude(next),
        }
    }
}
