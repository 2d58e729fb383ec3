//! monosynth - terminal front end for a single synth voice
//!
//! Run with: cargo run --bin monosynth 2> monosynth.log
//! Log verbosity follows RUST_LOG (default: warnings).

mod app;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // stdout belongs to the terminal UI
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("monosynth=warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    app::run()
}
