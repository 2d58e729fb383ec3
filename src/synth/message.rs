use rtrb::Consumer;

use crate::{
    dsp::{envelope::AdsrParams, filter::FilterType, oscillator::Waveform},
    graph::router::LfoTarget,
};

/// A validated control update on its way to the render context.
///
/// Values are already parsed and clamped by the handle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiceMessage {
    NoteOn,
    NoteOff,
    SetWaveform(Waveform),
    SetFrequency(f32),
    SetAdsr(AdsrParams),
    SetLfoFrequency(f32),
    SetLfoTarget(LfoTarget),
    SetFilterType(FilterType),
    SetFilterCutoff(f32),
    SetFilterResonance(f32),
    SetOutputAmplitude(f32),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}
