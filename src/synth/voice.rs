use rtrb::Consumer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::envelope::EnvelopeState,
    graph::{
        node::{GraphNode, RenderCtx},
        router::LfoTarget,
        voice::VoiceGraph,
    },
    synth::message::{MessageReceiver, VoiceMessage},
};

/// Snapshot of what the voice is doing, for meters and displays.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceStatus {
    pub envelope_state: EnvelopeState,
    pub envelope_level: f32,
    pub lfo_value: f32,
    pub lfo_target: LfoTarget,
    /// Smoothed value the active route is applying, if any.
    pub modulated_value: Option<f32>,
    /// Live oscillator frequency (modulated while routed to pitch).
    pub frequency: f32,
    pub filter_cutoff: f32,
    pub output_amplitude: f32,
    /// Samples rendered since creation.
    pub frames: u64,
}

/// The render-context half of a voice.
///
/// Owned by the audio callback. Each `render` call first applies every
/// queued control message, then renders the whole block with the result.
pub struct Voice<R: MessageReceiver = Consumer<VoiceMessage>> {
    rx: R,
    graph: VoiceGraph,
    ctx: RenderCtx,
    frame_counter: u64,
}

impl<R: MessageReceiver> Voice<R> {
    pub fn new(rx: R, graph: VoiceGraph, ctx: RenderCtx) -> Self {
        Self {
            rx,
            graph,
            ctx,
            frame_counter: 0,
        }
    }

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            // Values were validated by the handle, and the ownership checks
            // below see events in the order the handle did, so they pass.
            match msg {
                VoiceMessage::NoteOn => self.graph.note_on(),
                VoiceMessage::NoteOff => self.graph.note_off(),
                VoiceMessage::SetWaveform(waveform) => self.graph.set_waveform(waveform),
                VoiceMessage::SetFrequency(hz) => {
                    let applied = self.graph.set_frequency(hz);
                    debug_assert!(applied.is_ok(), "handle and voice disagree: {applied:?}");
                }
                VoiceMessage::SetAdsr(adsr) => self.graph.set_adsr(adsr),
                VoiceMessage::SetLfoFrequency(hz) => {
                    self.graph.set_lfo_frequency(hz);
                }
                VoiceMessage::SetLfoTarget(target) => {
                    self.graph.set_lfo_target(target, &self.ctx);
                }
                VoiceMessage::SetFilterType(filter_type) => self.graph.set_filter_type(filter_type),
                VoiceMessage::SetFilterCutoff(hz) => {
                    let applied = self.graph.set_filter_cutoff(hz);
                    debug_assert!(applied.is_ok(), "handle and voice disagree: {applied:?}");
                }
                VoiceMessage::SetFilterResonance(q) => {
                    self.graph.set_filter_resonance(q);
                }
                VoiceMessage::SetOutputAmplitude(amplitude) => {
                    let applied = self.graph.set_output_amplitude(amplitude);
                    debug_assert!(applied.is_ok(), "handle and voice disagree: {applied:?}");
                }
            }
        }
    }

    /// Apply pending control messages, then fill `out`.
    ///
    /// Realtime-safe: no allocation, no locks, no logging.
    pub fn render(&mut self, out: &mut [f32]) {
        self.drain_messages();
        self.graph.render_block(out, &self.ctx);
        self.frame_counter += out.len() as u64;
    }

    /// Render `frames` samples into a new buffer. Allocates; for offline use.
    pub fn render_buffer(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    pub fn status(&self) -> VoiceStatus {
        let router = self.graph.router();
        let path = self.graph.path();
        let envelope = self.graph.envelope();

        VoiceStatus {
            envelope_state: envelope.state(),
            envelope_level: envelope.level(),
            lfo_value: router.lfo().value(),
            lfo_target: router.target(),
            modulated_value: router.modulated_value(),
            frequency: path.oscillator().frequency(),
            filter_cutoff: path.filter().cutoff(),
            output_amplitude: path.live_amplitude(),
            frames: self.frame_counter,
        }
    }

    pub fn is_active(&self) -> bool {
        self.graph.is_active()
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate
    }

    pub fn graph(&self) -> &VoiceGraph {
        &self.graph
    }
}
