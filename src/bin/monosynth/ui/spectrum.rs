//! Spectrum view: Hann-windowed FFT, log frequency axis, falling peaks

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

const POINTS: usize = 96;
const FLOOR_DB: f64 = -100.0;
/// dB the display falls per frame when the signal drops
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// (log10 of frequency, FFT bin) per plotted point
    points: Vec<(f64, usize)>,
    /// (log10 of frequency, level in dB)
    display: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);

        let window = (0..size)
            .map(|i| {
                let phase = i as f32 / size.saturating_sub(1).max(1) as f32;
                0.5 - 0.5 * (std::f32::consts::TAU * phase).cos()
            })
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).min(20_000.0);
        let (lo, hi) = (20f64.log10(), nyquist.max(40.0).log10());
        let last_bin = (size / 2).saturating_sub(1);
        let points: Vec<(f64, usize)> = (0..POINTS)
            .map(|i| {
                let log_f = lo + (hi - lo) * i as f64 / (POINTS - 1) as f64;
                let bin = (10f64.powf(log_f) * size as f64 / sample_rate as f64).round() as usize;
                (log_f, bin.min(last_bin))
            })
            .collect();
        let display = points.iter().map(|&(x, _)| (x, FLOOR_DB)).collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            points,
            display,
        }
    }

    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Hann window halves the coherent gain
        let norm = 2.0 / (self.window.len() as f64 * 0.5);
        for ((_, bin), (_, shown)) in self.points.iter().zip(self.display.iter_mut()) {
            let magnitude = self.scratch[*bin].norm() as f64 * norm;
            let db = (20.0 * magnitude.max(1e-9).log10()).max(FLOOR_DB);
            *shown = db.max(*shown - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.display
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let lo = spectrum.first().map_or(1.0, |p| p.0);
    let hi = spectrum.last().map_or(4.0, |p| p.0);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
