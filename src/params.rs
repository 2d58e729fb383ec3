//! Parameter names, ranges and input parsing shared by the control API.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{envelope::AdsrParams, filter::FilterType, oscillator::Waveform},
    error::ControlError,
    graph::router::{Destination, LfoTarget},
};

/// Inclusive range with a default, used to clamp every control value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Clamp into range. NaN and infinities fall back to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Base oscillator frequency. Only positivity is enforced, so the range is
/// used for its default (and the value pitch routes reset to).
pub const FREQUENCY: ParamRange = ParamRange::new(f32::MIN_POSITIVE, f32::MAX, 440.0);
pub const ATTACK: ParamRange = ParamRange::new(0.01, 5.0, 0.1);
pub const DECAY: ParamRange = ParamRange::new(0.01, 5.0, 0.2);
pub const SUSTAIN: ParamRange = ParamRange::new(0.0, 1.0, 0.7);
pub const RELEASE: ParamRange = ParamRange::new(0.01, 5.0, 0.5);
pub const LFO_FREQUENCY: ParamRange = ParamRange::new(0.1, 20.0, 1.0);
pub const FILTER_CUTOFF: ParamRange = ParamRange::new(20.0, 20_000.0, 1000.0);
pub const FILTER_RESONANCE: ParamRange = ParamRange::new(0.1, 10.0, 1.0);
pub const OUTPUT_AMPLITUDE: ParamRange = ParamRange::new(0.0, 1.0, 0.5);

/// Every control exposed by [`VoiceHandle`](crate::synth::handle::VoiceHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Waveform,
    Frequency,
    Attack,
    Decay,
    Sustain,
    Release,
    LfoFrequency,
    LfoTarget,
    FilterType,
    FilterCutoff,
    FilterResonance,
    OutputAmplitude,
    Note,
}

impl Param {
    pub fn label(self) -> &'static str {
        match self {
            Param::Waveform => "oscillator type",
            Param::Frequency => "frequency",
            Param::Attack => "attack",
            Param::Decay => "decay",
            Param::Sustain => "sustain",
            Param::Release => "release",
            Param::LfoFrequency => "LFO frequency",
            Param::LfoTarget => "LFO target",
            Param::FilterType => "filter type",
            Param::FilterCutoff => "filter cutoff",
            Param::FilterResonance => "filter resonance",
            Param::OutputAmplitude => "output amplitude",
            Param::Note => "note gate",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every explicit control value of a voice.
///
/// Used to build a voice and mirrored by its handle, so the control side can
/// answer "what is the cutoff?" without asking the render side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub waveform: Waveform,
    pub frequency: f32,
    pub adsr: AdsrParams,
    pub lfo_frequency: f32,
    pub lfo_target: LfoTarget,
    pub filter_type: FilterType,
    pub filter_cutoff: f32,
    pub filter_resonance: f32,
    pub output_amplitude: f32,
}

impl VoiceParams {
    /// Clamp every numeric field into range. Non-finite values and a
    /// non-positive frequency fall back to their defaults.
    pub fn clamped(self) -> Self {
        let frequency = if self.frequency.is_finite() && self.frequency > 0.0 {
            self.frequency
        } else {
            FREQUENCY.default
        };

        Self {
            frequency,
            adsr: self.adsr.clamped(),
            lfo_frequency: LFO_FREQUENCY.clamp(self.lfo_frequency),
            filter_cutoff: FILTER_CUTOFF.clamp(self.filter_cutoff),
            filter_resonance: FILTER_RESONANCE.clamp(self.filter_resonance),
            output_amplitude: OUTPUT_AMPLITUDE.clamp(self.output_amplitude),
            ..self
        }
    }

    /// Put a destination back to its default, as detaching a route does.
    pub fn reset_destination(&mut self, destination: Destination) {
        let value = destination.default_value();
        match destination {
            Destination::Pitch => self.frequency = value,
            Destination::Amplitude => self.output_amplitude = value,
            Destination::FilterCutoff => self.filter_cutoff = value,
        }
    }
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::default(),
            frequency: FREQUENCY.default,
            adsr: AdsrParams::default(),
            lfo_frequency: LFO_FREQUENCY.default,
            lfo_target: LfoTarget::None,
            filter_type: FilterType::default(),
            filter_cutoff: FILTER_CUTOFF.default,
            filter_resonance: FILTER_RESONANCE.default,
            output_amplitude: OUTPUT_AMPLITUDE.default,
        }
    }
}

/// Raw input accepted by numeric setters: typed floats from sliders or text
/// from entry fields. Both must resolve to a finite `f32`.
pub trait IntoParam {
    fn into_param(self, param: Param) -> Result<f32, ControlError>;
}

fn finite(value: f32, param: Param, input: impl fmt::Display) -> Result<f32, ControlError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ControlError::Parse {
            param,
            input: input.to_string(),
        })
    }
}

impl IntoParam for f32 {
    fn into_param(self, param: Param) -> Result<f32, ControlError> {
        finite(self, param, self)
    }
}

impl IntoParam for f64 {
    fn into_param(self, param: Param) -> Result<f32, ControlError> {
        finite(self as f32, param, self)
    }
}

impl IntoParam for &str {
    fn into_param(self, param: Param) -> Result<f32, ControlError> {
        let value = self.trim().parse::<f32>().map_err(|_| ControlError::Parse {
            param,
            input: self.to_string(),
        })?;
        finite(value, param, self)
    }
}

impl IntoParam for String {
    fn into_param(self, param: Param) -> Result<f32, ControlError> {
        self.as_str().into_param(param)
    }
}

impl IntoParam for &String {
    fn into_param(self, param: Param) -> Result<f32, ControlError> {
        self.as_str().into_param(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_range() {
        assert_eq!(FILTER_CUTOFF.clamp(5.0), 20.0);
        assert_eq!(FILTER_CUTOFF.clamp(30_000.0), 20_000.0);
        assert_eq!(FILTER_RESONANCE.clamp(0.5), 0.5);
        assert!(SUSTAIN.contains(SUSTAIN.default));
    }

    #[test]
    fn non_finite_clamps_to_default() {
        assert_eq!(FILTER_CUTOFF.clamp(f32::NAN), 1000.0);
        assert_eq!(OUTPUT_AMPLITUDE.clamp(f32::INFINITY), 0.5);
        assert_eq!(RELEASE.clamp(f32::NEG_INFINITY), 0.5);
    }

    #[test]
    fn parses_text_and_floats() {
        assert_eq!(" 220.5 ".into_param(Param::Frequency), Ok(220.5));
        assert_eq!(3.0f64.into_param(Param::Attack), Ok(3.0));
        assert_eq!(String::from("1e3").into_param(Param::FilterCutoff), Ok(1000.0));
    }

    #[test]
    fn rejects_non_numeric_and_non_finite() {
        assert!(matches!(
            "abc".into_param(Param::Frequency),
            Err(ControlError::Parse { param: Param::Frequency, .. })
        ));
        assert!("".into_param(Param::Decay).is_err());
        assert!(f32::NAN.into_param(Param::Sustain).is_err());
        assert!(f32::INFINITY.into_param(Param::Release).is_err());
        assert!("inf".into_param(Param::FilterCutoff).is_err());
    }

    #[test]
    fn voice_defaults() {
        let params = VoiceParams::default();
        assert_eq!(params.waveform, Waveform::Sine);
        assert_eq!(params.frequency, 440.0);
        assert_eq!(params.adsr, AdsrParams::new(0.1, 0.2, 0.7, 0.5));
        assert_eq!(params.lfo_target, LfoTarget::None);
        assert_eq!(params.filter_type, FilterType::Lowpass);
        assert_eq!(params.filter_cutoff, 1000.0);
        assert_eq!(params.output_amplitude, 0.5);
    }

    #[test]
    fn clamped_voice_params() {
        let params = VoiceParams {
            frequency: -3.0,
            filter_cutoff: 50_000.0,
            filter_resonance: 0.0,
            lfo_frequency: 40.0,
            ..VoiceParams::default()
        }
        .clamped();

        assert_eq!(params.frequency, 440.0);
        assert_eq!(params.filter_cutoff, 20_000.0);
        assert_eq!(params.filter_resonance, 0.1);
        assert_eq!(params.lfo_frequency, 20.0);
    }

    #[test]
    fn nan_voice_params_fall_back_to_defaults() {
        let params = VoiceParams {
            frequency: f32::NAN,
            adsr: AdsrParams {
                attack: f32::NAN,
                decay: f32::INFINITY,
                sustain: f32::NAN,
                release: 0.3,
            },
            lfo_frequency: f32::NAN,
            filter_cutoff: f32::NAN,
            filter_resonance: f32::NEG_INFINITY,
            output_amplitude: f32::NAN,
            ..VoiceParams::default()
        }
        .clamped();

        assert_eq!(params.frequency, 440.0);
        assert_eq!(params.adsr, AdsrParams::new(0.1, 0.2, 0.7, 0.3));
        assert_eq!(params.lfo_frequency, 1.0);
        assert_eq!(params.filter_cutoff, 1000.0);
        assert_eq!(params.filter_resonance, 1.0);
        assert_eq!(params.output_amplitude, 0.5);
    }
}
