use std::io;
use std::process::ExitCode;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::{error, info};

use ipl_win_predictor::config::AppConfig;
use ipl_win_predictor::invoke::{Message, PredictionResult, PredictorContext, Tone};
use ipl_win_predictor::logging;
use ipl_win_predictor::state::{AppState, Field, FormEdit, Outcome, apply_edit};

const LOG_FILE: &str = "ipl_win_predictor.log";

struct App<'a> {
    ctx: &'a PredictorContext,
    state: AppState,
    should_quit: bool,
}

impl<'a> App<'a> {
    fn new(ctx: &'a PredictorContext) -> Self {
        let mut state = AppState::new(ctx.teams().to_vec());
        state.push_log(format!(
            "[INFO] Loaded {} model with {} teams",
            ctx.model().kind(),
            ctx.teams().len()
        ));
        Self {
            ctx,
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.help_overlay = false;
            }
            return;
        }

        let focus = self.state.focus;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Enter => self.state.submit(self.ctx),
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                apply_edit(&mut self.state, FormEdit::FocusNext)
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                apply_edit(&mut self.state, FormEdit::FocusPrev)
            }
            KeyCode::Left | KeyCode::Right if focus.is_team() => apply_edit(
                &mut self.state,
                FormEdit::CycleTeam {
                    forward: key.code == KeyCode::Right,
                },
            ),
            KeyCode::Char(ch) if !focus.is_team() && is_numeric_char(ch) => {
                apply_edit(&mut self.state, FormEdit::Type(ch))
            }
            KeyCode::Backspace => apply_edit(&mut self.state, FormEdit::Backspace),
            KeyCode::Esc => apply_edit(&mut self.state, FormEdit::ClearField),
            _ => {}
        }
    }
}

fn is_numeric_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+')
}

fn main() -> ExitCode {
    let config = AppConfig::from_env();
    if let Err(err) = logging::init_file_logging(&config.log_dir, LOG_FILE) {
        eprintln!("warning: file logging disabled: {err:#}");
    }

    // Nothing is served until both artifacts are in place.
    let ctx = match PredictorContext::load(&config) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!(error = %err, "startup failed");
            eprintln!("error: {err}");
            for name in err.missing_names() {
                eprintln!("  place the trained {name} artifact next to the binary or set its path in .env");
            }
            return ExitCode::from(2);
        }
    };
    info!(
        model = %config.artifacts.model.display(),
        encoder = %config.artifacts.encoder.display(),
        policy = ?config.same_team_policy,
        "predictor ready"
    );

    match run(&ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "terminal error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &PredictorContext) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(ctx);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text()).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_form(frame, body[0], &app.state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(6)])
        .split(body[1]);
    render_outcome(frame, right[0], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(console, right[1]);

    let footer = Paragraph::new(footer_text()).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text() -> String {
    let line1 = "  |   IPL WIN PROBABILITY PREDICTOR".to_string();
    let line2 = "  |o  Enter the current match details to get the win probability.".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text() -> String {
    "Tab/j/k/↑/↓ Move | ←/→ Team | Enter Predict | Esc Clear | ? Help | q Quit".to_string()
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Match State").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(2); Field::ALL.len()];
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (idx, field) in Field::ALL.iter().copied().enumerate() {
        let selected = field == state.focus;
        let marker = if selected { ">" } else { " " };
        let value = state.field_text(field);
        let shown = if field.is_team() {
            format!("< {value} >")
        } else if selected {
            format!("{value}_")
        } else {
            value.to_string()
        };
        let mut style = Style::default();
        if selected {
            style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        let text = format!("{marker} {}\n    {shown}", field.label());
        frame.render_widget(Paragraph::new(text).style(style), rows[idx]);
    }

    if let Some(advisory) = state.advisory() {
        let warn = Paragraph::new(format!("! {}", advisory.text()))
            .style(Style::default().fg(Color::Yellow))
            .wrap(Wrap { trim: true });
        frame.render_widget(warn, rows[Field::ALL.len()]);
    }
}

fn render_outcome(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Prediction").borders(Borders::ALL);
    let lines: Vec<Line> = match &state.outcome {
        None => vec![Line::styled(
            "Press Enter to predict",
            Style::default().fg(Color::DarkGray),
        )],
        Some(Outcome::Failed(msg)) => vec![message_line(msg)],
        Some(Outcome::Predicted(response)) => {
            let mut lines: Vec<Line> = response.messages.iter().map(message_line).collect();
            if let PredictionResult::Probability { win_pct, .. } = response.result {
                lines.push(Line::raw(""));
                lines.push(Line::raw(win_bar(win_pct, 30)));
            }
            lines
        }
    };
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn message_line(msg: &Message) -> Line<'static> {
    let color = match msg.tone {
        Tone::Success => Color::Green,
        Tone::Info => Color::Blue,
        Tone::Warning => Color::Yellow,
        Tone::Error => Color::Red,
    };
    Line::styled(
        msg.text.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn win_bar(win_pct: f64, width: usize) -> String {
    let filled = ((win_pct / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "IPL Win Predictor - Help",
        "",
        "Form:",
        "  Tab / j / ↓    Next field",
        "  S-Tab / k / ↑  Previous field",
        "  ← / →          Change team",
        "  0-9 . -        Edit number",
        "  Backspace      Delete character",
        "  Esc            Clear field",
        "",
        "Actions:",
        "  Enter          Predict",
        "  ?              Toggle help",
        "  q / Ctrl-C     Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
