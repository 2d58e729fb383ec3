// Purpose: the control/render split of a voice
// The handle validates and queues; the voice drains and renders.

pub mod config;
pub mod handle;
pub mod message;
pub mod voice;

use rtrb::RingBuffer;
use tracing::{info, warn};

use crate::graph::{node::RenderCtx, voice::VoiceGraph};

use self::{config::VoiceConfig, handle::VoiceHandle, voice::Voice};

/// Create a voice and the handle that controls it.
///
/// Move the [`Voice`] into the audio callback and keep the [`VoiceHandle`]
/// on the control thread. An unusable sample rate falls back to 48 kHz.
pub fn voice(config: VoiceConfig) -> (Voice, VoiceHandle) {
    let sample_rate = if config.sample_rate.is_finite() && config.sample_rate > 0.0 {
        config.sample_rate
    } else {
        warn!(
            sample_rate = config.sample_rate,
            "unusable sample rate, using {}",
            VoiceConfig::DEFAULT_SAMPLE_RATE
        );
        VoiceConfig::DEFAULT_SAMPLE_RATE
    };

    let ctx = RenderCtx::new(sample_rate);
    let params = config.params.clamped();
    let graph = VoiceGraph::new(
        &params,
        config.control_period_s.max(0.0),
        config.smoothing_time_s.max(0.0),
        &ctx,
    );
    let (tx, rx) = RingBuffer::new(config.queue_capacity.max(1));

    info!(
        sample_rate,
        queue_capacity = config.queue_capacity,
        waveform = %params.waveform,
        lfo_target = %params.lfo_target,
        "voice created"
    );

    (Voice::new(rx, graph, ctx), VoiceHandle::new(tx, params))
}
