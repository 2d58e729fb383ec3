use crate::{
    dsp::{
        envelope::{AdsrParams, Envelope},
        filter::FilterType,
        oscillator::Waveform,
    },
    error::{ControlError, Result},
    graph::{
        node::{GraphNode, RenderCtx},
        path::SignalPath,
        router::{Destination, LfoRouter, LfoTarget},
    },
    params::{Param, VoiceParams},
};

/*
Voice Graph
===========

    ┌──────────── SignalPath ────────────┐
    │ Oscillator → Biquad → × amplitude  │ → × Envelope → out
    └──────▲─────────▲──────────▲────────┘
           │ pitch   │ cutoff   │ amplitude
           └─────────┴──────────┴──── LfoRouter (at most one of the three)

One sample of output:

  1. the router advances the LFO and, if routed, writes the smoothed value
     into its destination on the path
  2. the path renders oscillator → filter → output amplitude
  3. the envelope advances and scales the result

Direct writes to a destination the router currently owns are refused with
`InvalidTransition`; the caller detaches the route first. All other
controls are accepted at any time.
*/

pub struct VoiceGraph {
    path: SignalPath,
    envelope: Envelope,
    router: LfoRouter,
}

impl VoiceGraph {
    /// Build a graph from `params`. `control_period` and `smoothing_time`
    /// are in seconds. A non-`None` LFO target is attached immediately.
    pub fn new(params: &VoiceParams, control_period: f32, smoothing_time: f32, ctx: &RenderCtx) -> Self {
        let params = params.clamped();

        let mut graph = Self {
            path: SignalPath::new(
                params.waveform,
                params.frequency,
                params.filter_type,
                params.filter_cutoff,
                params.filter_resonance,
                params.output_amplitude,
            ),
            envelope: Envelope::with_params(params.adsr),
            router: LfoRouter::new(params.lfo_frequency, control_period, smoothing_time),
        };

        graph.set_lfo_target(params.lfo_target, ctx);
        graph
    }

    fn ensure_unowned(&self, destination: Destination) -> Result<()> {
        if self.router.owns(destination) {
            return Err(ControlError::InvalidTransition {
                param: destination.param(),
                target: destination.target(),
            });
        }
        Ok(())
    }

    pub fn note_on(&mut self) {
        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.path.set_waveform(waveform);
    }

    pub fn set_frequency(&mut self, hz: f32) -> Result<f32> {
        self.ensure_unowned(Destination::Pitch)?;
        if !self.path.set_frequency(hz) {
            return Err(ControlError::Parse {
                param: Param::Frequency,
                input: hz.to_string(),
            });
        }
        Ok(hz)
    }

    pub fn set_adsr(&mut self, adsr: AdsrParams) {
        self.envelope.set_params(adsr);
    }

    pub fn set_lfo_frequency(&mut self, hz: f32) -> f32 {
        self.router.set_lfo_frequency(hz)
    }

    /// Returns false if `target` was already active.
    pub fn set_lfo_target(&mut self, target: LfoTarget, ctx: &RenderCtx) -> bool {
        self.router.set_target(target, &mut self.path, ctx)
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.path.set_filter_type(filter_type);
    }

    pub fn set_filter_cutoff(&mut self, hz: f32) -> Result<f32> {
        self.ensure_unowned(Destination::FilterCutoff)?;
        Ok(self.path.set_filter_cutoff(hz))
    }

    pub fn set_filter_resonance(&mut self, q: f32) -> f32 {
        self.path.set_filter_resonance(q)
    }

    pub fn set_output_amplitude(&mut self, amplitude: f32) -> Result<f32> {
        self.ensure_unowned(Destination::Amplitude)?;
        Ok(self.path.set_amplitude(amplitude))
    }

    #[inline]
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        self.router.next_sample(&mut self.path, ctx);
        let signal = self.path.next_sample(ctx);
        signal * self.envelope.next_sample(ctx)
    }

    pub fn path(&self) -> &SignalPath {
        &self.path
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn router(&self) -> &LfoRouter {
        &self.router
    }
}

impl GraphNode for VoiceGraph {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    fn note_on(&mut self) {
        VoiceGraph::note_on(self);
    }

    fn note_off(&mut self) {
        VoiceGraph::note_off(self);
    }

    fn is_active(&self) -> bool {
        self.envelope.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeState;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn graph() -> (VoiceGraph, RenderCtx) {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        (VoiceGraph::new(&VoiceParams::default(), 0.05, 0.01, &ctx), ctx)
    }

    fn render(graph: &mut VoiceGraph, ctx: &RenderCtx, samples: usize) -> Vec<f32> {
        let mut out = vec![0.0; samples];
        graph.render_block(&mut out, ctx);
        out
    }

    #[test]
    fn silent_until_note_on() {
        let (mut graph, ctx) = graph();
        assert!(render(&mut graph, &ctx, 100).iter().all(|&s| s == 0.0));
        assert!(!graph.is_active());

        graph.note_on();
        let out = render(&mut graph, &ctx, 300);
        assert!(out.iter().any(|s| s.abs() > 0.01));
        assert_eq!(graph.envelope().state(), EnvelopeState::Sustain);
    }

    #[test]
    fn owned_destinations_refuse_direct_writes() {
        let (mut graph, ctx) = graph();

        graph.set_lfo_target(LfoTarget::FilterCutoff, &ctx);
        assert_eq!(
            graph.set_filter_cutoff(3_000.0),
            Err(ControlError::InvalidTransition {
                param: Param::FilterCutoff,
                target: LfoTarget::FilterCutoff,
            })
        );
        // Other destinations remain writable
        assert_eq!(graph.set_frequency(220.0), Ok(220.0));
        assert_eq!(graph.set_output_amplitude(0.3), Ok(0.3));

        graph.set_lfo_target(LfoTarget::Pitch, &ctx);
        assert!(graph.set_frequency(330.0).is_err());
        assert_eq!(graph.set_filter_cutoff(3_000.0), Ok(3_000.0));
    }

    #[test]
    fn rejected_frequency_keeps_previous_value() {
        let (mut graph, _) = graph();
        graph.set_frequency(300.0).unwrap();

        assert!(matches!(
            graph.set_frequency(-5.0),
            Err(ControlError::Parse { param: Param::Frequency, .. })
        ));
        assert_eq!(graph.path().oscillator().base_frequency(), 300.0);
    }

    #[test]
    fn amplitude_route_drives_live_gain() {
        let (mut graph, ctx) = graph();
        graph.note_on();
        graph.set_lfo_target(LfoTarget::Amplitude, &ctx);

        let mut seen = Vec::new();
        for _ in 0..2_000 {
            graph.next_sample(&ctx);
            seen.push(graph.path().live_amplitude());
        }
        let min = seen.iter().cloned().fold(f32::MAX, f32::min);
        let max = seen.iter().cloned().fold(f32::MIN, f32::max);
        assert!(min < 0.1 && max > 0.9, "gain swept {min}..{max}");

        graph.set_lfo_target(LfoTarget::None, &ctx);
        assert_eq!(graph.path().live_amplitude(), 0.5);
        assert_eq!(graph.path().amplitude(), 0.5);
    }

    #[test]
    fn initial_target_is_attached() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let params = VoiceParams {
            lfo_target: LfoTarget::Pitch,
            ..VoiceParams::default()
        };
        let graph = VoiceGraph::new(&params, 0.05, 0.01, &ctx);

        assert_eq!(graph.router().target(), LfoTarget::Pitch);
        assert!(graph.router().lfo().is_running());
    }
}
