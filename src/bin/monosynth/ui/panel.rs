//! Status bar and control list

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monosynth::{EnvelopeState, LfoTarget, VoiceHandle, VoiceStatus};

use super::controls::Control;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn stage_color(state: EnvelopeState) -> Color {
    match state {
        EnvelopeState::Idle => Color::DarkGray,
        EnvelopeState::Attack => Color::Green,
        EnvelopeState::Decay => Color::Yellow,
        EnvelopeState::Sustain => Color::Cyan,
        EnvelopeState::Release => Color::Magenta,
    }
}

/// Envelope stage, LFO and meters in one line
pub fn render_status(frame: &mut Frame, area: Rect, status: &VoiceStatus, gate: bool, stats: &AudioStats) {
    let block = Block::default().title(" monosynth ").borders(Borders::ALL);

    let gate_span = if gate {
        Span::styled(" ● Gate  ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ Gate  ", Style::default().fg(Color::DarkGray))
    };

    let lfo = match (status.lfo_target, status.modulated_value) {
        (LfoTarget::None, _) | (_, None) => "LFO: off  ".to_string(),
        (target, Some(value)) => format!("LFO → {target}: {value:.2} ({:.2})  ", status.lfo_value),
    };

    let line = Line::from(vec![
        gate_span,
        Span::styled(
            format!("{:<8}{:.2}  ", status.envelope_state.label(), status.envelope_level),
            Style::default().fg(stage_color(status.envelope_state)),
        ),
        Span::styled(lfo, Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{:.1} Hz  ", status.frequency),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Selectable parameter list with the handle's current values
pub fn render_controls(frame: &mut Frame, area: Rect, handle: &VoiceHandle, selected: usize) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);
    let owned = handle.lfo_target().destination().map(|d| d.param());

    let mut lines = vec![
        Line::from(format!(" Oscillator      {}", handle.waveform())),
        Line::from(format!(" Filter Type     {}", handle.filter_type())),
        Line::from(format!(" LFO Target      {}", handle.lfo_target())),
    ];

    for (i, control) in Control::ALL.iter().enumerate() {
        let text = format!(
            " {:<16}{:>9.2} {}",
            control.label(),
            control.value(handle),
            control.unit()
        );
        let mut style = Style::default();
        if i == selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        // Driven by the LFO: direct edits are refused
        if owned == Some(control.param()) {
            style = style.fg(Color::Yellow);
        }
        lines.push(Line::from(Span::styled(text, style)));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
