pub mod dsp; // Oscillator, filter, envelope, smoother, LFO
pub mod error;
pub mod graph; // Signal path, LFO routing, voice graph
pub mod params;
pub mod synth; // Control/render handoff

pub use error::{ControlError, Result};
pub use graph::router::LfoTarget;
pub use params::{IntoParam, Param, VoiceParams};
pub use synth::{
    config::VoiceConfig,
    handle::VoiceHandle,
    voice,
    voice::{Voice, VoiceStatus},
};

pub use dsp::{AdsrParams, EnvelopeState, FilterType, Waveform};

pub const MAX_BLOCK_SIZE: usize = 2048;
