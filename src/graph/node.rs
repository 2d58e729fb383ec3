/// Per-render settings handed down to every node
///
/// The voice renders at a single, fixed sample rate handed to it by the audio
/// driver. Everything time-based (envelope ramps, smoothing, control ticks) is
/// converted to samples through this context.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Convert a duration in seconds to a whole number of samples (at least 1).
    #[inline]
    pub fn samples_for(&self, seconds: f32) -> u32 {
        (seconds * self.sample_rate).round().max(1.0) as u32
    }
}

/// Trait for nodes whose parameters can be driven by a modulation source
///
/// `get_param` reports the live (possibly modulated) value, `apply_modulation`
/// overrides it without touching the explicit setting, and `reset_param`
/// puts the parameter back to its default once modulation is removed.
pub trait Modulatable: Send {
    type Param: Copy + Send;

    fn get_param(&self, param: Self::Param) -> f32;

    fn apply_modulation(&mut self, param: Self::Param, value: f32);

    fn reset_param(&mut self, param: Self::Param);
}

/// Something that renders a block of samples and follows the note gate
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Gate high. No-op unless the node has a gated stage.
    fn note_on(&mut self) {}

    /// Gate low.
    fn note_off(&mut self) {}

    /// False once the node can only output silence
    fn is_active(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_seconds_to_samples() {
        let ctx = RenderCtx::new(48_000.0);
        assert_eq!(ctx.samples_for(0.05), 2400);
        assert_eq!(ctx.samples_for(0.01), 480);
        assert_eq!(ctx.samples_for(0.0), 1);
    }
}
