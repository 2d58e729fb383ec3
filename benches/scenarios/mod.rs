//! Scenario benchmarks: the full voice as the audio callback drives it.

mod voice;

pub use voice::{bench_retarget, bench_voice};
