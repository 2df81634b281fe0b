//! Terminal bloom meters.
//!
//! Two gauges follow the engine's visual bloom (hidden layers, output
//! layer) above a status line, redrawn at about 60 fps while the control
//! loop keeps ticking the engine.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    DefaultTerminal, Frame,
};

use neurosonic::{
    engine::{bloom::BloomFrame, EngineStatus},
    io::Instrument,
    synth::ContextFactory,
    SonificationEngine,
};

use crate::{events::Inbox, Session};

const VOLUME_STEP: f32 = 0.05;

pub struct UiApp<'a, F: ContextFactory> {
    session: Session<'a, F>,
    should_quit: bool,
}

impl<'a, F: ContextFactory> UiApp<'a, F> {
    pub fn new(engine: &'a mut SonificationEngine<F>, inbox: &'a mut Inbox) -> Self {
        Self {
            session: Session::new(engine, inbox),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = self.session.step();

            let bloom = self.session.engine.bloom(now);
            let status = self.session.engine.status();
            terminal.draw(|frame| render(frame, &bloom, &status))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let now = self.session.now();
        let engine = &mut *self.session.engine;

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // A key press is the user gesture that unlocks audio
            KeyCode::Char(' ') => {
                if !engine.is_ready() {
                    engine.init_audio(now);
                    if !engine.is_enabled() {
                        engine.set_enabled(true, now);
                    }
                } else {
                    let on = !engine.is_enabled();
                    engine.set_enabled(on, now);
                }
            }
            KeyCode::Char('p') => {
                engine.trigger_local_chord(Instrument::Pad, 0, now);
            }
            KeyCode::Char('b') => {
                engine.trigger_local_chord(Instrument::Bell, 0, now);
            }
            KeyCode::Char('a') => {
                engine.trigger_local_chord(Instrument::Harp, 0, now);
            }
            KeyCode::Char('s') => {
                engine.trigger_local_chord(Instrument::Synth, -1, now);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                engine.set_master_volume(engine.master_volume() + VOLUME_STEP);
            }
            KeyCode::Char('-') => {
                engine.set_master_volume(engine.master_volume() - VOLUME_STEP);
            }
            _ => {}
        }
    }
}

fn render(frame: &mut Frame, bloom: &BloomFrame, status: &EngineStatus) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status
            Constraint::Length(3), // Hidden bloom
            Constraint::Length(3), // Output bloom
            Constraint::Min(0),
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], status);
    render_gauge(frame, chunks[1], " Hidden ", bloom.hidden_bloom, Color::Magenta);
    render_gauge(frame, chunks[2], " Output ", bloom.output_bloom, Color::Cyan);

    let help = Paragraph::new(
        " [Q] Quit  [Space] On/Off  [P]ad [B]ell [A]rpeggio [S]ynth chord  [+/-] Volume",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn render_status(frame: &mut Frame, area: Rect, status: &EngineStatus) {
    let block = Block::default().title(" sonify ").borders(Borders::ALL);

    let (symbol, label, color) = if status.enabled {
        ("▶", "On", Color::Green)
    } else {
        ("⏸", "Off", Color::Yellow)
    };
    let context = match &status.last_error {
        Some(err) => format!("audio: {}  ", err),
        None => format!("audio: {}  ", status.context_state.name()),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} {}  ", symbol, label), Style::default().fg(color)),
        Span::styled(
            context,
            Style::default().fg(if status.is_ready {
                Color::White
            } else {
                Color::Red
            }),
        ),
        Span::styled(
            format!("Volume: {:.0}%  ", status.master_volume * 100.0),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(
                "Routines: {}  Pending: {}",
                status.running_routines, status.pending_triggers
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_gauge(frame: &mut Frame, area: Rect, title: &str, level: f32, color: Color) {
    let gauge = Gauge::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(f64::from(level.clamp(0.0, 1.0)))
        .label(format!("{:.2}", level));
    frame.render_widget(gauge, area);
}
