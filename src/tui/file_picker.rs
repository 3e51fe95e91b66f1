use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use num_format::{Locale, ToFormattedString};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Terminal,
};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use tracing::{info, warn};

use crate::core::{Config, SelectionStatus, SessionError, TokenLevel};
use crate::export::SnapshotExporter;
use crate::session::Session;

struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Quit,
    SelectAll,
    Export,
}

/// A message that replaces the live status line until `until`.
#[derive(Debug, Clone)]
struct Notice {
    text: String,
    color: Color,
    until: Instant,
}

pub struct FilePicker<'a> {
    session: Session,
    exporter: &'a dyn SnapshotExporter,
    config: Config,
    list_state: ListState,
    notice: Option<Notice>,
    shown_status: SelectionStatus,
    status_dirty_since: Option<Instant>,
    show_help: bool,
}

impl<'a> FilePicker<'a> {
    pub fn new(session: Session, exporter: &'a dyn SnapshotExporter, config: Config) -> Self {
        let mut list_state = ListState::default();
        if !session.files().is_empty() {
            list_state.select(Some(0));
        }

        Self {
            shown_status: session.status(),
            session,
            exporter,
            config,
            list_state,
            notice: None,
            status_dirty_since: None,
            show_help: false,
        }
    }

    /// Runs the picker until the user quits and hands the session back.
    pub fn run(mut self) -> Result<Session> {
        let _guard = TerminalGuard::new()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
        terminal.clear()?;

        loop {
            self.tick(Instant::now());
            terminal.draw(|f| self.ui(f))?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };

            match self.handle_key(key, Instant::now()) {
                Action::Continue => {}
                Action::Quit => break,
                Action::SelectAll => {
                    self.set_busy("Selecting all...");
                    terminal.draw(|f| self.ui(f))?;
                    self.select_all();
                }
                Action::Export => {
                    self.set_busy("Generating snapshot...");
                    terminal.draw(|f| self.ui(f))?;
                    self.export(Instant::now());
                }
            }
        }

        terminal.clear()?;
        Ok(self.session)
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::Continue;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Action::Continue;
        }

        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home | KeyCode::Char('g') => self.first(),
            KeyCode::End | KeyCode::Char('G') => self.last(),
            KeyCode::Char(' ') => self.toggle_current(now),
            KeyCode::Char('a') => return Action::SelectAll,
            KeyCode::Char('c') => self.clear_selection(),
            KeyCode::Enter => {
                if self.session.selection().is_empty() {
                    self.show_error(&SessionError::NothingSelected, now);
                } else {
                    return Action::Export;
                }
            }
            _ => {}
        }
        Action::Continue
    }

    fn toggle_current(&mut self, now: Instant) {
        let Some(index) = self.list_state.selected() else {
            return;
        };

        match self.session.toggle(index) {
            Ok(_) => self.status_dirty_since = Some(now),
            Err(err) => self.show_error(&err, now),
        }
    }

    fn select_all(&mut self) {
        self.session.select_all();
        self.notice = None;
        self.refresh_status();
    }

    fn clear_selection(&mut self) {
        self.session.clear();
        self.notice = None;
        self.refresh_status();
    }

    fn export(&mut self, now: Instant) {
        match self.session.export(self.exporter) {
            Ok(report) => {
                info!(
                    files = report.file_count,
                    tokens = report.total_tokens,
                    "exported snapshot"
                );
                let name = report
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| report.path.display().to_string());
                self.set_notice(
                    format!("Snapshot saved to {name}!"),
                    Color::Green,
                    now + Duration::from_millis(3000),
                );
            }
            Err(err) => self.show_error(&err, now),
        }
    }

    fn show_error(&mut self, err: &SessionError, now: Instant) {
        let (text, hold) = match err {
            SessionError::SensitiveFile(_) => ("Cannot select sensitive file!".to_string(), 1500),
            SessionError::NothingSelected => ("No files selected!".to_string(), 2000),
            other => {
                warn!(error = %other, "picker action failed");
                (format!("Error: {other}"), 3000)
            }
        };
        self.set_notice(text, Color::Red, now + Duration::from_millis(hold));
    }

    fn set_busy(&mut self, text: &str) {
        // Held until the next action replaces or clears it.
        let until = Instant::now() + Duration::from_secs(3600);
        self.set_notice(text.to_string(), Color::Cyan, until);
    }

    fn set_notice(&mut self, text: String, color: Color, until: Instant) {
        self.notice = Some(Notice { text, color, until });
    }

    fn refresh_status(&mut self) {
        self.shown_status = self.session.status();
        self.status_dirty_since = None;
    }

    /// Expires notices and publishes the live status once toggling settles.
    fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.until) {
            self.notice = None;
        }

        let debounce = Duration::from_millis(self.config.status_debounce_ms);
        if let Some(since) = self.status_dirty_since {
            if now.duration_since(since) >= debounce {
                self.refresh_status();
            }
        }
    }

    fn status_line(&self) -> Line<'static> {
        if let Some(notice) = &self.notice {
            return Line::from(Span::styled(
                notice.text.clone(),
                Style::default()
                    .fg(notice.color)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let status = self.shown_status;
        let color = match status.level(self.config.warn_tokens, self.config.danger_tokens) {
            TokenLevel::Ok => Color::Green,
            TokenLevel::Warn => Color::Yellow,
            TokenLevel::Danger => Color::Red,
        };

        Line::from(vec![
            Span::raw(format!("Files: {} | Est. Tokens: ", status.selected_count)),
            Span::styled(
                status.total_tokens.to_formatted_string(&Locale::en),
                Style::default().fg(color),
            ),
        ])
    }

    fn ui(&mut self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(f.area());

        let items: Vec<ListItem> = self
            .session
            .rows()
            .map(|row| {
                let check = if row.selected { "[X]" } else { "[ ]" };
                let line = format!("{check} {}", row.path);
                if row.sensitive {
                    ListItem::new(Line::from(Span::styled(
                        format!("{line} (Sensitive)"),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )))
                } else if row.is_binary {
                    ListItem::new(Line::from(Span::styled(
                        line,
                        Style::default().fg(Color::DarkGray),
                    )))
                } else {
                    ListItem::new(Line::from(line))
                }
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Files (Space: Toggle, A: All, C: Clear, Enter: Dump, Q: Quit) "),
            )
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

        f.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let status = Paragraph::new(self.status_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green))
                    .title(" Status "),
            );
        f.render_widget(status, chunks[1]);

        if self.show_help {
            self.draw_help(f);
        }
    }

    fn next(&mut self) {
        let len = self.session.files().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        let len = self.session.files().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn first(&mut self) {
        if !self.session.files().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn last(&mut self) {
        let len = self.session.files().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    fn draw_help(&self, f: &mut ratatui::Frame) {
        let key = |k: &'static str| Line::from(Span::styled(k, Style::default().fg(Color::Yellow)));
        let text = vec![
            Line::from("Keybindings:"),
            Line::from(""),
            key("↓ / ↑ or j / k"),
            Line::from("  Move"),
            key("Home / End or g / G"),
            Line::from("  Jump to first / last file"),
            key("Space"),
            Line::from("  Toggle file"),
            key("a"),
            Line::from("  Select all non-sensitive files"),
            key("c"),
            Line::from("  Clear selection"),
            key("Enter"),
            Line::from(format!("  Write snapshot to {}", self.config.output_file)),
            key("q / Ctrl-C"),
            Line::from("  Quit"),
            key("?"),
            Line::from("  Toggle this help"),
            Line::from(""),
            Line::from(format!("Root Directory: {}", self.session.root().display())),
        ];

        let help = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .alignment(Alignment::Left);

        let area = Rect {
            x: f.area().width / 4,
            y: f.area().height / 4,
            width: f.area().width / 2,
            height: f.area().height / 2,
        };

        f.render_widget(Clear, area);
        f.render_widget(help, area);
    }
}
