//! The voice as a graph of DSP primitives.
//!
//! `path` wires oscillator → filter → output amplitude, `router` connects the
//! LFO to one of the path's parameters, and `voice` adds the amplitude
//! envelope and the direct-write rules on top.

/// Core traits shared by all graph nodes.
pub mod node;
/// The fixed oscillator → filter → amplitude chain.
pub mod path;
/// LFO routing, control-rate scheduling and retargeting.
pub mod router;
/// Path, envelope and router assembled into one voice.
pub mod voice;

pub use node::{GraphNode, Modulatable, RenderCtx};
pub use path::SignalPath;
pub use router::{ControlTask, Destination, LfoRouter, LfoTarget};
pub use voice::VoiceGraph;
