//! Audio setup: the cpal stream owns the voice, the UI owns the handle.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};

use monosynth::{VoiceConfig, VoiceStatus, MAX_BLOCK_SIZE};

use crate::ui::UiApp;

/// Open the default output device, start the voice on it and hand the
/// terminal to the UI until the user quits.
pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "audio device opened");

    let (mut voice, handle) = monosynth::voice(VoiceConfig::default().with_sample_rate(sample_rate));

    // Render → UI: raw samples for the scope, one status snapshot per callback
    let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(sample_rate as usize);
    let (mut status_tx, status_rx) = RingBuffer::<VoiceStatus>::new(64);
    let initial_status = voice.status();

    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                voice.render(block);

                // Mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    // Scope drops samples when the UI falls behind
                    let _ = audio_tx.push(s);
                }

                frames_written += frames_to_render;
            }

            let _ = status_tx.push(voice.status());
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(handle, audio_rx, status_rx, initial_status, sample_rate).run(&mut terminal);
    ratatui::restore();

    result
}
