use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::Session;
use crate::catalog::Catalog;
use crate::clipboard::ClipboardSink;
use crate::error::CalendarError;
use crate::telemetry::TelemetrySink;

const SEARCH_HINT: &str = "Example: Informatyka Stosowana";
const SPINNER: &[&str] = &["|", "/", "-", "\\"];
const TUTORIAL: &[&str] = &[
    "Google Calendar",
    "",
    "1. Search for your group and press Enter to open its calendar URL.",
    "2. Press c to copy the URL.",
    "3. Open calendar.google.com in a browser.",
    "4. Next to \"Other calendars\" click +, then \"From URL\".",
    "5. Paste the URL and click \"Add calendar\".",
    "",
    "The schedule refreshes on the calendar provider's own sync interval.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Search,
    Help,
}

pub struct Tui {
    input: String,
    view: View,
    status: Option<String>,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            view: View::Search,
            status: None,
        }
    }

    /// Runs the search screen. `load` runs once on a worker thread; its
    /// result is handed to the session when it arrives.
    pub fn run<C, T, F>(&mut self, session: &mut Session<C, T>, load: F) -> miette::Result<()>
    where
        C: ClipboardSink,
        T: TelemetrySink,
        F: FnOnce() -> Result<Catalog, CalendarError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || tx.send(load()));

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal, session, &rx);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        if !session.is_loading() {
            handle.join().ok();
        }
        result
    }

    fn event_loop<C, T>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        session: &mut Session<C, T>,
        rx: &mpsc::Receiver<Result<Catalog, CalendarError>>,
    ) -> miette::Result<()>
    where
        C: ClipboardSink,
        T: TelemetrySink,
    {
        let mut tick = 0usize;
        loop {
            if session.is_loading() {
                if let Ok(result) = rx.try_recv() {
                    session.finish_load(result);
                }
            }

            terminal
                .draw(|frame| draw_ui(frame, self, session, tick))
                .into_diagnostic()?;

            if event::poll(Duration::from_millis(120)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(session, key) {
                        return Ok(());
                    }
                }
            }

            tick = tick.wrapping_add(1);
        }
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key<C, T>(&mut self, session: &mut Session<C, T>, key: KeyEvent) -> bool
    where
        C: ClipboardSink,
        T: TelemetrySink,
    {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.view == View::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
                self.view = View::Search;
            }
            return false;
        }

        if session.dialog().is_some() {
            match key.code {
                KeyCode::Esc => {
                    session.close_dialog();
                    self.status = None;
                }
                KeyCode::Enter | KeyCode::Char('c') => {
                    self.status = match session.copy_link() {
                        Ok(()) => None,
                        Err(err) => Some(err.to_string()),
                    };
                }
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc if self.input.is_empty() => return true,
            KeyCode::Esc => {
                self.input.clear();
                self.update_query(session);
            }
            KeyCode::F(1) => self.view = View::Help,
            KeyCode::Up => session.move_highlight(-1),
            KeyCode::Down => session.move_highlight(1),
            KeyCode::Enter => {
                session.open_highlighted();
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.update_query(session);
            }
            KeyCode::Char(ch) => {
                self.input.push(ch);
                self.update_query(session);
            }
            _ => {}
        }
        false
    }

    fn update_query<C, T>(&mut self, session: &mut Session<C, T>)
    where
        C: ClipboardSink,
        T: TelemetrySink,
    {
        self.status = None;
        session.set_query(&self.input);
    }

    /// Footer text, most urgent first: copy toast, clipboard error, load
    /// error, then the key help.
    fn footer<C, T>(&self, session: &Session<C, T>, now: Instant) -> (String, Color)
    where
        C: ClipboardSink,
        T: TelemetrySink,
    {
        if let Some(message) = session.toast(now) {
            (message.to_string(), Color::Green)
        } else if let Some(status) = &self.status {
            (status.clone(), Color::Red)
        } else if let Some(err) = session.load_error() {
            (format!("groups unavailable: {err}"), Color::Red)
        } else {
            (
                format!(
                    "{} groups loaded  |  Up/Down select  Enter open  F1 help  Esc quit",
                    session.catalog().len()
                ),
                Color::DarkGray,
            )
        }
    }
}

fn draw_ui<C, T>(frame: &mut ratatui::Frame, tui: &Tui, session: &Session<C, T>, tick: usize)
where
    C: ClipboardSink,
    T: TelemetrySink,
{
    match tui.view {
        View::Search => draw_search(frame, tui, session, tick),
        View::Help => draw_help(frame),
    }
}

fn draw_search<C, T>(frame: &mut ratatui::Frame, tui: &Tui, session: &Session<C, T>, tick: usize)
where
    C: ClipboardSink,
    T: TelemetrySink,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from("UEK CALENDAR :: FIND YOUR GROUP"))
        .block(Block::default().borders(Borders::BOTTOM))
        .alignment(Alignment::Left)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(header, chunks[0]);

    let cursor = if tick % 8 < 4 { "_" } else { " " };
    let search = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(tui.input.as_str()),
            Span::styled(cursor, Style::default().fg(Color::Gray)),
        ]),
        Line::from(Span::styled(SEARCH_HINT, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search by group name, ID or faculty"),
    );
    frame.render_widget(search, chunks[1]);

    draw_results(frame, session, tick, chunks[2]);
    draw_footer(frame, tui, session, chunks[3]);

    if let Some(dialog) = session.dialog() {
        let area = centered_rect(70, 40, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                dialog.url,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(dialog.hint),
            Line::from(""),
            Line::from(Span::styled(
                "[c] Copy   [Esc] Close",
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(dialog.title));
        frame.render_widget(body, area);
    }
}

fn draw_results<C, T>(frame: &mut ratatui::Frame, session: &Session<C, T>, tick: usize, area: Rect)
where
    C: ClipboardSink,
    T: TelemetrySink,
{
    let block = Block::default().borders(Borders::ALL).title("Groups");

    if session.is_loading() {
        let spinner = SPINNER[tick % SPINNER.len()];
        let loading = Paragraph::new(format!("{spinner} loading groups..."))
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let items = session
        .results()
        .iter()
        .map(|record| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        record.name.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::raw(record.parent_category.as_str()),
                ]),
                Line::from(Span::styled(
                    format!("Group ID: {}", record.id),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !session.results().is_empty() {
        state.select(Some(session.highlighted()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer<C, T>(frame: &mut ratatui::Frame, tui: &Tui, session: &Session<C, T>, area: Rect)
where
    C: ClipboardSink,
    T: TelemetrySink,
{
    let (text, color) = tui.footer(session, Instant::now());
    let line = Line::from(Span::styled(text, Style::default().fg(color)));
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::TOP)),
        area,
    );
}

fn draw_help(frame: &mut ratatui::Frame) {
    let lines = TUTORIAL.iter().map(|line| Line::from(*line)).collect::<Vec<_>>();
    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Calendar tutorial (Esc to return)"),
        );
    frame.render_widget(help, frame.area());
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
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
