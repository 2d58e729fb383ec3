//! Low-level DSP primitives used by the voice graph.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside the render-side voice. They stay focused on the
//! signal-processing math; routing and modulation live in `graph`.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Two-pole biquad filter with lowpass/highpass responses.
pub mod filter;
/// Free-running low frequency oscillator.
pub mod lfo;
/// Oscillator waveforms and the replaceable generator.
pub mod oscillator;
/// Linear ramped parameter values.
pub mod smoother;

pub use envelope::{AdsrParams, Envelope, EnvelopeState};
pub use filter::{Biquad, FilterType};
pub use lfo::Lfo;
pub use oscillator::{Oscillator, Waveform};
pub use smoother::ParamSmoother;
