//! Terminal UI for monosynth
//!
//! The UI is a plain caller of the voice's control API: every key press
//! becomes a `VoiceHandle` call, and rejected calls are shown in the
//! status line instead of being retried.

mod controls;
mod panel;
mod spectrum;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use monosynth::{FilterType, LfoTarget, VoiceHandle, VoiceStatus, Waveform};

use controls::Control;
use panel::{render_controls, render_status, AudioStats};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Samples kept for the scope and the FFT
const VIS_BUFFER_SIZE: usize = 2048;

pub struct UiApp {
    handle: VoiceHandle,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<VoiceStatus>,
    status: VoiceStatus,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    selected: usize,
    gate: bool,
    /// Last rejected call, shown until the next successful one
    message: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: VoiceHandle,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<VoiceStatus>,
        status: VoiceStatus,
        sample_rate: f32,
    ) -> Self {
        Self {
            handle,
            audio_rx,
            status_rx,
            status,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            selected: 0,
            gate: false,
            message: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        // Let the voice release before the stream is dropped
        if self.gate {
            let _ = self.handle.note_off();
        }
        Ok(())
    }

    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        if let Ok(chunk) = self.audio_rx.read_chunk(available) {
            let (first, second) = chunk.as_slices();
            self.audio_buffer.extend_from_slice(first);
            self.audio_buffer.extend_from_slice(second);
            chunk.commit_all();
        }

        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_status(&mut self) {
        // Keep only the latest snapshot
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn report<T>(&mut self, result: monosynth::Result<T>) {
        self.message = result.err().map(|err| err.to_string());
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let result = if self.gate {
                    self.handle.note_off()
                } else {
                    self.handle.note_on()
                };
                if result.is_ok() {
                    self.gate = !self.gate;
                }
                self.report(result);
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                let result = self.handle.set_waveform(Waveform::ALL[index]);
                self.report(result);
            }
            KeyCode::Char('f') => {
                let next = match self.handle.filter_type() {
                    FilterType::Lowpass => FilterType::Highpass,
                    FilterType::Highpass => FilterType::Lowpass,
                };
                let result = self.handle.set_filter_type(next);
                self.report(result);
            }
            KeyCode::Char('t') => {
                let current = LfoTarget::ALL
                    .iter()
                    .position(|&t| t == self.handle.lfo_target())
                    .unwrap_or(0);
                let next = LfoTarget::ALL[(current + 1) % LfoTarget::ALL.len()];
                let result = self.handle.set_lfo_target(next);
                self.report(result);
            }
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(Control::ALL.len() - 1);
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1) % Control::ALL.len();
            }
            KeyCode::Left | KeyCode::Right => {
                let up = key == KeyCode::Right;
                let result = Control::ALL[self.selected].nudge(&mut self.handle, up);
                self.report(result);
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(11),    // Controls | scope
                Constraint::Length(10), // Spectrum
                Constraint::Length(1),  // Help / last error
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(frame, rows[0], &self.status, self.gate, &stats);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(20)])
            .split(rows[1]);
        render_controls(frame, middle[0], &self.handle, self.selected);
        render_waveform(frame, middle[1], &self.audio_buffer);

        render_spectrum(frame, rows[2], self.spectrum.data());

        let footer = match &self.message {
            Some(message) => Paragraph::new(format!(" {message}")).style(Style::default().fg(Color::Red)),
            None => Paragraph::new(
                " [Space] Gate  [1-4] Wave  [F] Filter  [T] LFO target  [↑↓] Select  [←→] Adjust  [Q] Quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer, rows[3]);
    }
}
