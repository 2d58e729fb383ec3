use rtrb::Producer;
use tracing::{debug, warn};

use crate::{
    dsp::{envelope::AdsrParams, filter::FilterType, oscillator::Waveform},
    error::{ControlError, Result},
    graph::router::{Destination, LfoTarget},
    params::{
        IntoParam, Param, ParamRange, VoiceParams, ATTACK, DECAY, FILTER_CUTOFF,
        FILTER_RESONANCE, LFO_FREQUENCY, OUTPUT_AMPLITUDE, RELEASE, SUSTAIN,
    },
    synth::message::VoiceMessage,
};

/// The control-context half of a voice.
///
/// Every setter validates and clamps its input, checks that the LFO does
/// not own the destination, and queues the result for the render context.
/// The handle keeps its own copy of every accepted value, so getters answer
/// immediately and reflect exactly what the voice will render once it
/// drains the queue.
///
/// A rejected call returns an error, logs a warning and changes nothing.
pub struct VoiceHandle {
    tx: Producer<VoiceMessage>,
    params: VoiceParams,
}

impl VoiceHandle {
    pub(crate) fn new(tx: Producer<VoiceMessage>, params: VoiceParams) -> Self {
        Self { tx, params }
    }

    fn parse(input: impl IntoParam, param: Param, range: ParamRange) -> Result<f32> {
        let value = input.into_param(param).inspect_err(|err| warn!(%err, "rejected"))?;
        let clamped = range.clamp(value);
        if clamped != value {
            debug!(%param, requested = value, clamped, "value clamped");
        }
        Ok(clamped)
    }

    fn ensure_unowned(&self, destination: Destination) -> Result<()> {
        if self.params.lfo_target.destination() == Some(destination) {
            let err = ControlError::InvalidTransition {
                param: destination.param(),
                target: self.params.lfo_target,
            };
            warn!(%err, "rejected");
            return Err(err);
        }
        Ok(())
    }

    fn send(&mut self, param: Param, msg: VoiceMessage) -> Result<()> {
        self.tx.push(msg).map_err(|_| {
            let err = ControlError::QueueFull { param };
            warn!(%err, "rejected");
            err
        })
    }

    pub fn note_on(&mut self) -> Result<()> {
        self.send(Param::Note, VoiceMessage::NoteOn)
    }

    pub fn note_off(&mut self) -> Result<()> {
        self.send(Param::Note, VoiceMessage::NoteOff)
    }

    /// Swap the oscillator's generator. The base frequency carries over.
    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<()> {
        self.send(Param::Waveform, VoiceMessage::SetWaveform(waveform))?;
        self.params.waveform = waveform;
        Ok(())
    }

    /// Set the base oscillator frequency. Any positive finite value is
    /// accepted as is.
    pub fn set_frequency(&mut self, hz: impl IntoParam) -> Result<f32> {
        let param = Param::Frequency;
        let hz = hz.into_param(param).inspect_err(|err| warn!(%err, "rejected"))?;
        if hz <= 0.0 {
            let err = ControlError::Parse {
                param,
                input: hz.to_string(),
            };
            warn!(%err, "rejected");
            return Err(err);
        }
        self.ensure_unowned(Destination::Pitch)?;

        self.send(param, VoiceMessage::SetFrequency(hz))?;
        self.params.frequency = hz;
        Ok(hz)
    }

    /// Replace all four envelope parameters. If any one fails to parse, none
    /// are changed.
    pub fn set_adsr(
        &mut self,
        attack: impl IntoParam,
        decay: impl IntoParam,
        sustain: impl IntoParam,
        release: impl IntoParam,
    ) -> Result<AdsrParams> {
        let adsr = AdsrParams {
            attack: Self::parse(attack, Param::Attack, ATTACK)?,
            decay: Self::parse(decay, Param::Decay, DECAY)?,
            sustain: Self::parse(sustain, Param::Sustain, SUSTAIN)?,
            release: Self::parse(release, Param::Release, RELEASE)?,
        };
        self.send_adsr(Param::Attack, adsr)?;
        Ok(adsr)
    }

    fn send_adsr(&mut self, param: Param, adsr: AdsrParams) -> Result<()> {
        self.send(param, VoiceMessage::SetAdsr(adsr))?;
        self.params.adsr = adsr;
        Ok(())
    }

    pub fn set_attack(&mut self, seconds: impl IntoParam) -> Result<f32> {
        let attack = Self::parse(seconds, Param::Attack, ATTACK)?;
        self.send_adsr(Param::Attack, AdsrParams { attack, ..self.params.adsr })?;
        Ok(attack)
    }

    pub fn set_decay(&mut self, seconds: impl IntoParam) -> Result<f32> {
        let decay = Self::parse(seconds, Param::Decay, DECAY)?;
        self.send_adsr(Param::Decay, AdsrParams { decay, ..self.params.adsr })?;
        Ok(decay)
    }

    pub fn set_sustain(&mut self, level: impl IntoParam) -> Result<f32> {
        let sustain = Self::parse(level, Param::Sustain, SUSTAIN)?;
        self.send_adsr(Param::Sustain, AdsrParams { sustain, ..self.params.adsr })?;
        Ok(sustain)
    }

    pub fn set_release(&mut self, seconds: impl IntoParam) -> Result<f32> {
        let release = Self::parse(seconds, Param::Release, RELEASE)?;
        self.send_adsr(Param::Release, AdsrParams { release, ..self.params.adsr })?;
        Ok(release)
    }

    pub fn set_lfo_frequency(&mut self, hz: impl IntoParam) -> Result<f32> {
        let hz = Self::parse(hz, Param::LfoFrequency, LFO_FREQUENCY)?;
        self.send(Param::LfoFrequency, VoiceMessage::SetLfoFrequency(hz))?;
        self.params.lfo_frequency = hz;
        Ok(hz)
    }

    /// Route the LFO to `target`. The previous destination, if any, is reset
    /// to its default. Setting the current target again does nothing.
    pub fn set_lfo_target(&mut self, target: LfoTarget) -> Result<()> {
        let old = self.params.lfo_target;
        if target == old {
            return Ok(());
        }

        self.send(Param::LfoTarget, VoiceMessage::SetLfoTarget(target))?;
        if let Some(destination) = old.destination() {
            self.params.reset_destination(destination);
        }
        self.params.lfo_target = target;
        debug!(from = %old, to = %target, "LFO retargeted");
        Ok(())
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) -> Result<()> {
        self.send(Param::FilterType, VoiceMessage::SetFilterType(filter_type))?;
        self.params.filter_type = filter_type;
        Ok(())
    }

    pub fn set_filter_cutoff(&mut self, hz: impl IntoParam) -> Result<f32> {
        let hz = Self::parse(hz, Param::FilterCutoff, FILTER_CUTOFF)?;
        self.ensure_unowned(Destination::FilterCutoff)?;
        self.send(Param::FilterCutoff, VoiceMessage::SetFilterCutoff(hz))?;
        self.params.filter_cutoff = hz;
        Ok(hz)
    }

    pub fn set_filter_resonance(&mut self, q: impl IntoParam) -> Result<f32> {
        let q = Self::parse(q, Param::FilterResonance, FILTER_RESONANCE)?;
        self.send(Param::FilterResonance, VoiceMessage::SetFilterResonance(q))?;
        self.params.filter_resonance = q;
        Ok(q)
    }

    pub fn set_output_amplitude(&mut self, amplitude: impl IntoParam) -> Result<f32> {
        let amplitude = Self::parse(amplitude, Param::OutputAmplitude, OUTPUT_AMPLITUDE)?;
        self.ensure_unowned(Destination::Amplitude)?;
        self.send(Param::OutputAmplitude, VoiceMessage::SetOutputAmplitude(amplitude))?;
        self.params.output_amplitude = amplitude;
        Ok(amplitude)
    }

    /// Every accepted control value.
    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn waveform(&self) -> Waveform {
        self.params.waveform
    }

    pub fn frequency(&self) -> f32 {
        self.params.frequency
    }

    pub fn adsr(&self) -> AdsrParams {
        self.params.adsr
    }

    pub fn lfo_frequency(&self) -> f32 {
        self.params.lfo_frequency
    }

    pub fn lfo_target(&self) -> LfoTarget {
        self.params.lfo_target
    }

    pub fn filter_type(&self) -> FilterType {
        self.params.filter_type
    }

    pub fn filter_cutoff(&self) -> f32 {
        self.params.filter_cutoff
    }

    pub fn filter_resonance(&self) -> f32 {
        self.params.filter_resonance
    }

    pub fn output_amplitude(&self) -> f32 {
        self.params.output_amplitude
    }

    /// Free slots in the control queue.
    pub fn queue_slots(&self) -> usize {
        self.tx.slots()
    }

    /// False once the render side has been dropped.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_abandoned()
    }
}
