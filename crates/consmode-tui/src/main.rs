//! Consmode TUI
//!
//! Terminal control surface for the battery conservation flag. Checks
//! privileges and hardware support up front, shows the current state, and
//! lets the operator enable or disable conservation mode with a transient
//! acknowledgement on success.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use consmode_config::ConsmodeConfig;
use consmode_hal::{
    privilege, probe, ConservationState, ControlError, HelperWriter, PrivilegedWriter, StateStore,
    WriteError,
};

/// Transient success acknowledgement. At most one exists; a new one
/// replaces any still-visible one.
struct Toast {
    message: String,
    deadline: Instant,
}

/// Result of a background write, posted back to the event loop.
struct WriteOutcome {
    enable: bool,
    result: Result<(), WriteError>,
}

/// Application state
struct App {
    /// State reader for the control path
    store: StateStore,

    /// Privileged writer; absent when no elevation helper was found
    writer: Option<Arc<dyn PrivilegedWriter>>,

    /// Cached display snapshot, re-derived from the store after every write
    state: ConservationState,

    /// Success acknowledgement, if visible
    toast: Option<Toast>,

    /// Write failure message; blocks input until dismissed
    error: Option<String>,

    /// A write is in flight; further write requests are ignored
    write_pending: bool,

    toast_duration: Duration,

    outcome_tx: Sender<WriteOutcome>,
    outcome_rx: Receiver<WriteOutcome>,

    /// Should quit
    should_quit: bool,
}

impl App {
    fn new(
        store: StateStore,
        writer: Option<Arc<dyn PrivilegedWriter>>,
        toast_duration: Duration,
    ) -> Self {
        let state = store.read();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        Self {
            store,
            writer,
            state,
            toast: None,
            error: None,
            write_pending: false,
            toast_duration,
            outcome_tx,
            outcome_rx,
            should_quit: false,
        }
    }

    /// Handle input
    fn handle_input(&mut self, key: KeyCode) {
        // An error message blocks everything else until dismissed.
        if self.error.is_some() {
            self.error = None;
            return;
        }

        match key {
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.request_write(true);
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.request_write(false);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.state = self.store.read();
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    /// Kick off a write on a worker thread. Returns false when the request
    /// was ignored because a write is already in flight.
    fn request_write(&mut self, enable: bool) -> bool {
        if self.write_pending {
            return false;
        }

        let writer = match &self.writer {
            Some(writer) => Arc::clone(writer),
            None => {
                // No helper to attempt the write with; still show ground truth.
                self.state = self.store.read();
                self.error = Some(format!(
                    "Cannot change conservation mode: {}",
                    WriteError::HelperNotFound
                ));
                return false;
            }
        };

        self.write_pending = true;

        // The helper may block on an elevation prompt; keep that off the
        // render loop and post the outcome back over the channel.
        let tx = self.outcome_tx.clone();
        thread::spawn(move || {
            let result = writer.write_flag(enable);
            let _ = tx.send(WriteOutcome { enable, result });
        });

        true
    }

    /// Periodic tick: collect finished writes, expire the toast.
    fn on_tick(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }

        if let Some(toast) = &self.toast {
            if Instant::now() >= toast.deadline {
                self.toast = None;
            }
        }
    }

    /// Fold a finished write into the display. The store is re-read
    /// unconditionally; the snapshot is never inferred from the requested
    /// value.
    fn apply_outcome(&mut self, outcome: WriteOutcome) {
        self.write_pending = false;
        self.state = self.store.read();

        let verb = if outcome.enable { "enabled" } else { "disabled" };
        match outcome.result {
            Ok(()) => {
                info!("conservation mode {}", verb);
                self.show_toast(format!("Conservation mode {}", verb));
            }
            Err(e) => {
                warn!("write failed: {}", e);
                self.error = Some(format!("Error setting conservation mode: {}", e));
            }
        }
    }

    /// Show a success acknowledgement, replacing any visible one so its
    /// old deadline can never dismiss the new message.
    fn show_toast(&mut self, message: String) {
        self.toast = Some(Toast {
            message,
            deadline: Instant::now() + self.toast_duration,
        });
    }
}

/// Draw the UI
fn draw_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0]);

    if app.error.is_some() {
        draw_error(frame, chunks[1], app);
    } else {
        draw_status(frame, chunks[1], app);
    }

    draw_footer(frame, chunks[2], app);
}

/// Draw header
fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new("Battery Conservation Mode")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// Draw the status readout
fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let state_style = match app.state {
        ConservationState::Enabled => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ConservationState::Disabled => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ConservationState::Unknown => {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        }
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("Current status: "),
            Span::styled(app.state.as_str(), state_style),
        ]),
    ];

    if app.write_pending {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Applying change, waiting for elevation helper...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));

    frame.render_widget(paragraph, area);
}

/// Draw the write-failure message
fn draw_error(frame: &mut Frame, area: Rect, app: &App) {
    let message = app.error.as_deref().unwrap_or("");

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        );

    frame.render_widget(paragraph, area);
}

/// Draw footer
fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.error.is_some() {
        "[Any key] Dismiss"
    } else if app.write_pending {
        "Applying...  [Q] Quit"
    } else {
        "[E] Enable  [D] Disable  [R] Refresh  [Q] Quit"
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    let toast_text = app.toast.as_ref().map(|t| t.message.as_str()).unwrap_or("");
    let toast = Paragraph::new(toast_text)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, chunks[0]);
    frame.render_widget(toast, chunks[1]);
}

/// Run the startup checks: privilege first, then hardware support. Either
/// failure is fatal before any UI comes up.
fn startup_checks() -> Result<PathBuf, ControlError> {
    if !privilege::has_elevated_rights() {
        return Err(ControlError::NotPrivileged);
    }

    let control_path = probe::resolve_control_path();
    if !probe::control_path_exists(&control_path) {
        return Err(ControlError::UnsupportedDevice(control_path));
    }

    Ok(control_path)
}

fn main() -> Result<()> {
    let config = ConsmodeConfig::load_default()?;

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.surface.log_filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Consmode TUI starting...");

    let control_path = match startup_checks() {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            eprintln!("consmode: {e}");
            std::process::exit(1);
        }
    };

    let writer = match HelperWriter::new(&control_path, config.helper.command.as_deref()) {
        Ok(writer) => Some(Arc::new(writer) as Arc<dyn PrivilegedWriter>),
        Err(e) => {
            warn!("no usable elevation helper: {}", e);
            None
        }
    };

    let store = StateStore::new(control_path);
    let mut app = App::new(
        store,
        writer,
        Duration::from_millis(config.surface.toast_duration_ms),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let tick_rate = Duration::from_millis(config.surface.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_input(key.code);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Consmode TUI exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use consmode_hal::mock::RecordingWriter;
    use std::fs;

    fn test_app(contents: &str, writer: RecordingWriter) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conservation_mode");
        fs::write(&path, contents).unwrap();

        let app = App::new(
            StateStore::new(path),
            Some(Arc::new(writer)),
            Duration::from_millis(2000),
        );
        (dir, app)
    }

    #[test]
    fn test_initial_read_populates_state() {
        let (_dir, app) = test_app("1\n", RecordingWriter::succeeding());
        assert_eq!(app.state, ConservationState::Enabled);
    }

    #[test]
    fn test_reentrant_write_is_ignored() {
        let (_dir, mut app) = test_app("0\n", RecordingWriter::succeeding());

        assert!(app.request_write(true));
        // A second request while the first is pending is dropped.
        assert!(!app.request_write(false));
        assert!(app.write_pending);
    }

    #[test]
    fn test_success_outcome_refreshes_and_toasts() {
        let (_dir, mut app) = test_app("1\n", RecordingWriter::succeeding());

        app.write_pending = true;
        app.apply_outcome(WriteOutcome {
            enable: true,
            result: Ok(()),
        });

        assert!(!app.write_pending);
        assert_eq!(app.state, ConservationState::Enabled);
        assert!(app.toast.as_ref().unwrap().message.contains("enabled"));
        assert!(app.error.is_none());
    }

    #[test]
    fn test_failed_write_shows_ground_truth() {
        // Control path still holds "0"; a failed enable must not display
        // the requested value.
        let (_dir, mut app) = test_app("0\n", RecordingWriter::failing(1));

        app.write_pending = true;
        app.apply_outcome(WriteOutcome {
            enable: true,
            result: Err(WriteError::HelperFailed { code: 1 }),
        });

        assert_eq!(app.state, ConservationState::Disabled);
        assert!(app.error.is_some());
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_new_toast_replaces_old_one() {
        let (_dir, mut app) = test_app("1\n", RecordingWriter::succeeding());

        app.show_toast("Conservation mode enabled".into());
        let first_deadline = app.toast.as_ref().unwrap().deadline;

        app.show_toast("Conservation mode disabled".into());
        let toast = app.toast.as_ref().unwrap();

        // Exactly one acknowledgement, reflecting the latest action, with a
        // fresh deadline.
        assert_eq!(toast.message, "Conservation mode disabled");
        assert!(toast.deadline >= first_deadline);
    }

    #[test]
    fn test_error_message_blocks_until_dismissed() {
        let (_dir, mut app) = test_app("0\n", RecordingWriter::succeeding());
        app.error = Some("Error setting conservation mode".into());

        // First keypress only dismisses the error.
        app.handle_input(KeyCode::Char('e'));
        assert!(app.error.is_none());
        assert!(!app.write_pending);
    }

    #[test]
    fn test_missing_helper_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conservation_mode");
        fs::write(&path, "0\n").unwrap();

        let mut app = App::new(StateStore::new(path), None, Duration::from_millis(2000));
        assert!(!app.request_write(true));
        assert!(app.error.is_some());
        assert!(!app.write_pending);
    }
}
