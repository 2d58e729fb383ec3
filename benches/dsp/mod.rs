//! Benchmarks for the DSP primitives.

mod envelope;
mod filter;
mod oscillator;
mod smoother;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use smoother::bench_smoother;
