use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};

use valo_terminal::api::HttpSource;
use valo_terminal::config::AppConfig;
use valo_terminal::demo_feed::DemoSource;
use valo_terminal::fetch::{ResourceSource, spawn_provider};
use valo_terminal::grouping::EventGroups;
use valo_terminal::state::{
    self, AppState, LiveMatch, NewsItem, PastMatch, ProviderCommand, RankingEntry, Rendered,
    StatLine, UpcomingMatch, View, apply_delta, view_label,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::with_config(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='6') => {
                let idx = (c as usize) - ('1' as usize);
                let cmd = self.state.select_view(View::ALL[idx]);
                self.dispatch(cmd);
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                let cmd = self.state.next_view();
                self.dispatch(cmd);
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                let cmd = self.state.prev_view();
                self.dispatch(cmd);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let cmd = self.state.reload();
                self.dispatch(cmd);
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.state.toggle_selected().is_none() && self.state.view.is_grouped() {
                    self.state.push_log("[INFO] Nothing to expand");
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn dispatch(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Fetch unavailable: no provider");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Fetch request failed: provider stopped");
        }
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(ProviderCommand::Shutdown);
        }
    }
}

fn main() -> io::Result<()> {
    let config = AppConfig::load();
    let source: Arc<dyn ResourceSource> = if config.demo_feed {
        Arc::new(DemoSource::from_env())
    } else {
        Arc::new(HttpSource::new(config.api.clone()))
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(source, tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    if config.demo_feed {
        app.state.push_log("[INFO] Demo feed enabled");
    } else {
        app.state
            .push_log(format!("[INFO] Backend: {}", config.api.base_url));
    }
    let cmd = app.state.select_view(View::Matches);
    app.dispatch(cmd);

    let res = run_app(&mut terminal, &mut app, rx);
    app.shutdown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
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
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, chunks[0], &app.state);
    render_body(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let titles: Vec<String> = View::ALL
        .iter()
        .enumerate()
        .map(|(idx, view)| format!("{} {}", idx + 1, view_label(*view)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.view.index())
        .block(
            Block::default()
                .title(format!(" VALORANT ESPORTS | {} ", status_text(state)))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");
    frame.render_widget(tabs, area);
}

fn status_text(state: &AppState) -> String {
    match state.rendered() {
        Rendered::Idle => "idle".to_string(),
        Rendered::Loading => "loading…".to_string(),
        Rendered::Failed(_) => "error".to_string(),
        _ => match state.fetched_at {
            Some(at) => {
                let local: DateTime<Local> = at.into();
                format!("updated {}", local.format("%H:%M:%S"))
            }
            None => "ready".to_string(),
        },
    }
}

fn footer_text(state: &AppState) -> String {
    if state.view.is_grouped() {
        "1-6/Tab View | j/k Move | Enter Expand | r Reload | ? Help | q Quit".to_string()
    } else {
        "1-6/Tab View | j/k Move | r Reload | ? Help | q Quit".to_string()
    }
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(view_label(state.view))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let rendered = state.rendered();
    if let Some(notice) = rendered.empty_notice(state.past_window_days) {
        frame.render_widget(Paragraph::new(dim_line(&notice)), inner);
        return;
    }

    let (lines, focus_line) = match rendered {
        Rendered::Idle => (vec![dim_line("Pick a view with 1-6")], 0),
        Rendered::Loading => (vec![Line::from("Loading…")], 0),
        Rendered::Failed(message) => {
            let error = Line::from(Span::styled(
                format!("Error: {message}"),
                Style::default().fg(Color::Red),
            ));
            (vec![error, dim_line("Press r or switch views to try again")], 0)
        }
        Rendered::Upcoming(groups) => grouped_lines(state, &groups, UPCOMING_COLUMNS, upcoming_row),
        Rendered::Past(groups) => grouped_lines(state, &groups, PAST_COLUMNS, past_row),
        Rendered::Live(groups) => grouped_lines(state, &groups, LIVE_COLUMNS, live_row),
        Rendered::News(items) => news_lines(state, items),
        Rendered::Stats(lines) => table_lines(state, STATS_COLUMNS, lines, stat_row),
        Rendered::Rankings(entries) => table_lines(state, RANKING_COLUMNS, entries, ranking_row),
    };

    let height = inner.height as usize;
    let offset = if focus_line + 2 < height {
        0
    } else {
        focus_line.saturating_sub(height / 2)
    };
    let body = Paragraph::new(lines).scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(body, inner);
}

type Column = (&'static str, usize);

const UPCOMING_COLUMNS: &[Column] = &[
    ("Series", 28),
    ("Teams", 32),
    ("Time", 12),
    ("Winner", 16),
    ("Page", 0),
];
const PAST_COLUMNS: &[Column] = &[
    ("Series", 28),
    ("Teams", 32),
    ("Score", 7),
    ("Winner", 16),
    ("When", 14),
    ("Page", 0),
];
const LIVE_COLUMNS: &[Column] = &[
    ("Series", 24),
    ("Teams", 32),
    ("Score", 7),
    ("Elapsed", 9),
    ("Leader", 16),
    ("Page", 0),
];
const STATS_COLUMNS: &[Column] = &[
    ("Player", 16),
    ("Org", 16),
    ("Rating", 8),
    ("ACS", 8),
    ("K/D", 6),
    ("ADR", 8),
    ("HS%", 6),
    ("Clutch", 0),
];
const RANKING_COLUMNS: &[Column] = &[
    ("Rank", 6),
    ("Team", 22),
    ("Country", 18),
    ("Record", 10),
    ("Earnings", 14),
    ("Last played", 0),
];

fn upcoming_row(state: &AppState, m: &UpcomingMatch) -> Vec<String> {
    vec![
        m.series.clone(),
        format!("{} vs {}", m.teams[0], m.teams[1]),
        m.time_until.clone(),
        or_dash(&m.predicted_winner),
        state.link(&m.page),
    ]
}

fn past_row(state: &AppState, m: &PastMatch) -> Vec<String> {
    vec![
        m.series.clone(),
        format!("{} vs {}", m.teams[0], m.teams[1]),
        format!("{}-{}", m.score1, m.score2),
        m.winner().unwrap_or("Draw").to_string(),
        m.time_ago.clone(),
        state.link(&m.page),
    ]
}

fn live_row(state: &AppState, m: &LiveMatch) -> Vec<String> {
    vec![
        m.series.clone(),
        format!("{} vs {}", m.teams[0], m.teams[1]),
        format!("{}-{}", m.score1, m.score2),
        m.time_started.clone(),
        m.leader().unwrap_or("Level").to_string(),
        state.link(&m.page),
    ]
}

fn stat_row(_state: &AppState, s: &StatLine) -> Vec<String> {
    vec![
        s.player.clone(),
        or_dash(&s.org),
        or_dash(&s.rating),
        or_dash(&s.average_combat_score),
        or_dash(&s.kill_deaths),
        or_dash(&s.average_damage_per_round),
        or_dash(&s.headshot_percentage),
        or_dash(&s.clutch_success_percentage),
    ]
}

fn ranking_row(_state: &AppState, r: &RankingEntry) -> Vec<String> {
    let last = if r.last_played_team.is_empty() {
        or_dash(&r.last_played)
    } else {
        format!("{} vs {}", r.last_played, r.last_played_team)
    };
    vec![
        r.rank.clone(),
        r.team.clone(),
        or_dash(&r.country),
        or_dash(&r.record),
        or_dash(&r.earnings),
        last,
    ]
}

fn grouped_lines<T>(
    state: &AppState,
    groups: &EventGroups<'_, T>,
    columns: &[Column],
    row: fn(&AppState, &T) -> Vec<String>,
) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut focus_line = 0;
    for (idx, (event, records)) in groups.iter().enumerate() {
        let expanded = state.is_expanded(event);
        let marker = if expanded { "▾" } else { "▸" };
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if idx == state.selected {
            focus_line = lines.len();
            style = style.fg(Color::White).bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!("{marker} {event} ({})", records.len()),
            style,
        )));
        if !expanded {
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!("   {}", header_cells(columns)),
            Style::default().fg(Color::Cyan),
        )));
        for record in records {
            lines.push(Line::from(format!(
                "   {}",
                format_cells(columns, &row(state, record))
            )));
        }
    }
    (lines, focus_line)
}

fn table_lines<T>(
    state: &AppState,
    columns: &[Column],
    rows: &[T],
    row: fn(&AppState, &T) -> Vec<String>,
) -> (Vec<Line<'static>>, usize) {
    if rows.is_empty() {
        return (vec![dim_line("Nothing to show")], 0);
    }
    let mut lines = vec![Line::from(Span::styled(
        header_cells(columns),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];
    for (idx, item) in rows.iter().enumerate() {
        let text = format_cells(columns, &row(state, item));
        if idx == state.selected {
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )));
        } else {
            lines.push(Line::from(text));
        }
    }
    (lines, state.selected + 1)
}

fn news_lines(state: &AppState, items: &[NewsItem]) -> (Vec<Line<'static>>, usize) {
    if items.is_empty() {
        return (vec![dim_line("No news yet")], 0);
    }
    let mut lines = Vec::new();
    let mut focus_line = 0;
    for (idx, item) in items.iter().enumerate() {
        let mut title_style = Style::default().add_modifier(Modifier::BOLD);
        if idx == state.selected {
            focus_line = lines.len();
            title_style = title_style.fg(Color::White).bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(item.title.clone(), title_style)));
        lines.push(dim_line(&format!("{} • {}", item.date, item.author)));
        if !item.description.is_empty() {
            lines.push(Line::from(item.description.clone()));
        }
        lines.push(Line::from(Span::styled(
            state.link(&item.url_path),
            Style::default().fg(Color::Blue),
        )));
        lines.push(Line::default());
    }
    (lines, focus_line)
}

fn header_cells(columns: &[Column]) -> String {
    let names: Vec<String> = columns.iter().map(|(name, _)| name.to_string()).collect();
    format_cells(columns, &names)
}

fn format_cells(columns: &[Column], cells: &[String]) -> String {
    columns
        .iter()
        .zip(cells)
        .map(|((_, width), cell)| fit(cell, *width))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pad or truncate to `width` chars; zero means "take the rest".
fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{text:<width$}")
    }
}

fn or_dash(text: &str) -> String {
    if text.trim().is_empty() {
        "-".to_string()
    } else {
        text.to_string()
    }
}

fn dim_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
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
        "Valorant Esports Terminal - Help",
        "",
        "Views:",
        "  1 Matches   2 Past   3 Live",
        "  4 News      5 Stats  6 Rankings",
        "  Tab / l / →  Next view",
        "  S-Tab / h / ← Previous view",
        "  r            Reload current view",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move",
        "  Enter/Space  Expand or collapse event",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .wrap(Wrap { trim: false })
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
