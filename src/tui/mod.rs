pub mod card;
pub mod detail;
pub mod state;

use anyhow::Result;
use chrono::Datelike;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::filter::FilterCriteria;
use crate::models::JobPosting;
use crate::source::{FetchError, JobSource};
use card::{CARD_HEIGHT, JobCard};
use detail::DetailView;
use state::{Action, AppState, Command, Focus, LoadState, Move};

const TICK: Duration = Duration::from_millis(100);

pub fn run_browse(runtime: Runtime, source: JobSource, criteria: FilterCriteria) -> Result<()> {
    let (tx, rx) = oneshot::channel();
    runtime.spawn(async move {
        let result = source.fetch_jobs().await;
        // The receiver is gone once the UI has quit; the result is dropped.
        let _ = tx.send(result);
    });

    let mut state = AppState::new(criteria);

    let result = TerminalGuard::enter().and_then(|_guard| {
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        run_loop(&mut terminal, &mut state, rx)
    });

    // Abandon a fetch that is still in flight.
    runtime.shutdown_background();
    result
}

/// Raw mode plus the alternate screen, undone on drop so early returns and
/// panics in the loop still hand back a usable terminal.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        stdout().execute(EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to leave raw mode");
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            warn!(error = %e, "failed to leave alternate screen");
        }
    }
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    rx: oneshot::Receiver<Result<Vec<JobPosting>, FetchError>>,
) -> Result<()> {
    let mut pending = Some(rx);

    loop {
        let size = terminal.size()?;
        state.columns = grid_columns(size.width);
        fit_detail(state, Rect::new(0, 0, size.width, size.height));
        terminal.draw(|frame| draw(frame, state))?;

        if let Some(rx) = pending.as_mut() {
            match rx.try_recv() {
                Ok(result) => {
                    state.update(Action::FetchCompleted(result));
                    pending = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    state.update(Action::FetchCompleted(Err(FetchError::Interrupted)));
                    pending = None;
                }
            }
        }

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = action_for_key(state, key) {
                if let Some(command) = state.update(action) {
                    run_command(state, command);
                }
            }
        }
        if state.should_quit {
            break;
        }
    }
    Ok(())
}

fn run_command(state: &mut AppState, command: Command) {
    match command {
        Command::OpenUrl(url) => match webbrowser::open(&url) {
            Ok(()) => {
                info!(%url, "opened apply link");
                state.status = Some(format!("Opened {} in your browser", url));
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to open browser");
                state.status = Some(format!("Could not open browser: {}", e));
            }
        },
    }
}

/// Maps a key press to an action given the current focus and overlay.
pub fn action_for_key(state: &AppState, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('u') => Some(Action::ClearField),
            _ => None,
        };
    }

    if state.detail.is_some() {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => Some(Action::CloseDetail),
            KeyCode::Char('a') | KeyCode::Enter => Some(Action::Apply),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDetail(1)),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollDetail(-1)),
            KeyCode::PageDown | KeyCode::Char('J') => Some(Action::ScrollDetail(10)),
            KeyCode::PageUp | KeyCode::Char('K') => Some(Action::ScrollDetail(-10)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Tab => return Some(Action::FocusNext),
        KeyCode::BackTab => return Some(Action::FocusPrev),
        _ => {}
    }

    match state.focus {
        Focus::Grid => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(Move::Down)),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(Move::Up)),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(Move::Left)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(Move::Right)),
            KeyCode::Enter | KeyCode::Char(' ') => state
                .selected_job()
                .map(|job| JobCard::new(job, true).activate()),
            KeyCode::Char('/') | KeyCode::Char('s') => Some(Action::FocusNext),
            KeyCode::Char('c') => Some(Action::CycleCategory(true)),
            KeyCode::Char('C') => Some(Action::CycleCategory(false)),
            KeyCode::Char('L') => Some(Action::FocusPrev),
            _ => None,
        },
        Focus::Search | Focus::Location => match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::FocusGrid),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        Focus::Category => match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::FocusGrid),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                Some(Action::CycleCategory(true))
            }
            KeyCode::Left | KeyCode::Char('h') => Some(Action::CycleCategory(false)),
            _ => None,
        },
    }
}

/// Screen area taken by the detail overlay.
fn detail_area(screen: Rect) -> Rect {
    centered(screen, 80, 85)
}

fn fit_detail(state: &mut AppState, screen: Rect) {
    let max = state
        .detail_job()
        .map(|job| detail::max_scroll(job, detail_area(screen)));
    if let Some(max) = max {
        state.fit_detail(max);
    }
}

/// Card columns for a given terminal width.
pub fn grid_columns(width: u16) -> usize {
    match width {
        w if w >= 150 => 3,
        w if w >= 96 => 2,
        _ => 1,
    }
}

fn draw(frame: &mut Frame, state: &AppState) {
    let [header, filters, grid, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(frame.area());

    let visible = state.visible();

    draw_header(frame, header, visible.len(), state.jobs.len());
    draw_filters(frame, filters, state);

    if state.load == LoadState::Loading {
        draw_message(frame, grid, "Loading jobs...");
    } else if visible.is_empty() {
        draw_message(frame, grid, "No jobs found matching your criteria.");
    } else {
        let columns = grid_columns(grid.width);
        let rows_in_view = (grid.height / CARD_HEIGHT).max(1) as usize;
        let selected = state.selected.min(visible.len() - 1);
        let first_row = (selected / columns).saturating_sub(rows_in_view - 1);
        let card_width = grid.width / columns as u16;

        for (offset, job) in visible.iter().enumerate().skip(first_row * columns) {
            let row = offset / columns - first_row;
            if row >= rows_in_view {
                break;
            }
            let col = offset % columns;
            let y = grid.y + row as u16 * CARD_HEIGHT;
            let height = CARD_HEIGHT.min(grid.bottom().saturating_sub(y));
            let area = Rect::new(grid.x + col as u16 * card_width, y, card_width, height);
            frame.render_widget(JobCard::new(job, offset == selected), area);
        }
    }

    draw_footer(frame, footer, state);

    if let (Some(open), Some(job)) = (&state.detail, state.detail_job()) {
        frame.render_widget(DetailView::new(job, open.scroll), detail_area(frame.area()));
    }
}

fn draw_header(frame: &mut Frame, area: Rect, shown: usize, total: usize) {
    let title = Line::from(vec![
        Span::styled(
            "Remote Job Board",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            "Find your next remote opportunity easily",
            Style::default().fg(Color::Gray),
        ),
    ]);
    let count = Line::from(format!("{} of {} jobs", shown, total)).right_aligned();
    let block = Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [left, right] = Layout::horizontal([Constraint::Min(0), Constraint::Length(20)]).areas(
        Rect { height: inner.height.min(1), y: inner.y + inner.height / 2, ..inner },
    );
    frame.render_widget(title, left);
    frame.render_widget(count, right);
}

fn draw_filters(frame: &mut Frame, area: Rect, state: &AppState) {
    let [search, category, location] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    let criteria = &state.criteria;
    text_field(frame, search, " Search (/) ", &criteria.search, "Search by job title", state.focus == Focus::Search);
    text_field(frame, location, " Location (L) ", &criteria.location, "Filter by location", state.focus == Focus::Location);

    let focused = state.focus == Focus::Category;
    let value = Line::from(vec![
        Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
        Span::raw(criteria.category.clone()),
        Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(value).block(field_block(" Type (c) ", focused)), category);
}

fn text_field(frame: &mut Frame, area: Rect, title: &str, value: &str, placeholder: &str, focused: bool) {
    let block = field_block(title, focused);
    let inner = block.inner(area);
    let content = if value.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(value.to_string())
    };
    frame.render_widget(Paragraph::new(content).block(block), area);
    if focused {
        let x = inner.x + (value.chars().count() as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

fn field_block(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title.to_string())
}

fn draw_message(frame: &mut Frame, area: Rect, message: &str) {
    let middle = Rect { y: area.y + area.height / 3, height: area.height.min(1), ..area };
    let text = Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(text, middle);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let help = match (state.detail.is_some(), state.focus) {
        (true, _) => " j/k:scroll  a/enter:apply  esc:close  ctrl-c:quit",
        (false, Focus::Grid) => {
            " arrows/hjkl:move  enter:details  tab:filters  /:search  c/C:type  L:location  q:quit"
        }
        (false, Focus::Category) => " ←/→:change type  tab:next field  esc:back to jobs",
        (false, _) => " type to filter  ctrl-u:clear  tab:next field  esc:back to jobs",
    };
    let second = match &state.status {
        Some(status) => Span::styled(format!(" {}", status), Style::default().fg(Color::Yellow)),
        None => Span::styled(
            format!(" © {} Remote Job Board. All rights reserved.", chrono::Local::now().year()),
            Style::default().fg(Color::Blue),
        ),
    };
    let lines = vec![
        Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
        Line::from(second),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    /// Flattens a buffer to text, one line per row.
    pub fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell((x, y)) {
                    out.push_str(cell.symbol());
                }
            }
            out.push('\n');
        }
        out
    }

    fn render(state: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn job(id: &str, title: &str, types: &[&str], location: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: title.to_string(),
            job_types: types.iter().map(|t| t.to_string()).collect(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    fn loaded() -> AppState {
        let mut state = AppState::new(FilterCriteria::default());
        state.update(Action::FetchCompleted(Ok(vec![
            job("1", "Backend Dev", &["full-time"], "Berlin"),
            job("2", "Frontend Dev", &["remote"], "Remote"),
        ])));
        state
    }

    #[test]
    fn test_loading_message_before_fetch_completes() {
        let state = AppState::new(FilterCriteria::default());
        let text = render(&state, 100, 30);
        assert!(text.contains("Loading jobs..."));
        assert!(text.contains("Remote Job Board"));
    }

    #[test]
    fn test_fetch_failure_shows_empty_state_not_error() {
        let mut state = AppState::new(FilterCriteria::default());
        state.update(Action::FetchCompleted(Err(FetchError::Interrupted)));
        let text = render(&state, 100, 30);
        assert!(text.contains("No jobs found matching your criteria."));
        assert!(!text.contains("fetch task"));
        assert!(text.contains("0 of 0 jobs"));
    }

    #[test]
    fn test_cards_follow_filter() {
        let mut state = loaded();
        let text = render(&state, 100, 30);
        assert!(text.contains("Backend Dev"));
        assert!(text.contains("Frontend Dev"));
        assert!(text.contains("2 of 2 jobs"));

        state.update(Action::CycleCategory(true));
        state.update(Action::CycleCategory(true));
        state.update(Action::CycleCategory(true));
        assert_eq!(state.criteria.category, "remote");
        let text = render(&state, 100, 30);
        assert!(!text.contains("Backend Dev"));
        assert!(text.contains("Frontend Dev"));
        assert!(text.contains("1 of 2 jobs"));
    }

    #[test]
    fn test_detail_overlay_renders_for_open_job() {
        let mut state = loaded();
        state.update(Action::OpenDetail("2".to_string()));
        let text = render(&state, 100, 40);
        assert!(text.contains("Job Details"));
        assert!(text.contains("Apply link unavailable"));
        assert!(text.contains("Location: Remote"));
    }

    #[test]
    fn test_detail_scrolls_back_right_after_overshooting() {
        let mut state = AppState::new(FilterCriteria::default());
        state.update(Action::FetchCompleted(Ok(vec![JobPosting {
            id: "long".to_string(),
            description_html: (1..=60).map(|n| format!("<p>line {}</p>", n)).collect(),
            ..Default::default()
        }])));
        state.update(Action::OpenDetail("long".to_string()));
        let screen = Rect::new(0, 0, 100, 40);

        let press = |state: &mut AppState, code: KeyCode| {
            let action = action_for_key(state, key(code)).unwrap();
            state.update(action);
            fit_detail(state, screen);
            render(state, screen.width, screen.height)
        };

        for _ in 0..19 {
            press(&mut state, KeyCode::Char('J'));
        }
        let at_end = press(&mut state, KeyCode::Char('J'));
        assert!(at_end.contains("line 60"));

        let after_up = press(&mut state, KeyCode::Char('k'));
        assert_ne!(after_up, at_end);
        assert!(!after_up.contains("line 60"));

        let after_page_up = press(&mut state, KeyCode::Char('K'));
        assert_ne!(after_page_up, after_up);
    }

    #[test]
    fn test_enter_on_grid_opens_selected_card() {
        let mut state = loaded();
        state.columns = 2;
        let action = action_for_key(&state, key(KeyCode::Right)).unwrap();
        state.update(action);
        let action = action_for_key(&state, key(KeyCode::Enter)).unwrap();
        state.update(action);
        assert_eq!(state.detail.as_ref().map(|d| d.id.as_str()), Some("2"));

        let action = action_for_key(&state, key(KeyCode::Esc)).unwrap();
        state.update(action);
        assert!(state.detail.is_none());
        assert!(!state.should_quit);
    }

    #[test]
    fn test_enter_with_no_results_does_nothing() {
        let mut state = AppState::new(FilterCriteria::default());
        state.update(Action::FetchCompleted(Ok(Vec::new())));
        assert!(action_for_key(&state, key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_keys_type_into_focused_search() {
        let mut state = loaded();
        let action = action_for_key(&state, key(KeyCode::Char('/'))).unwrap();
        state.update(action);
        assert_eq!(state.focus, Focus::Search);

        // 'q' is text while a field has focus
        for c in ['f', 'r', 'q'] {
            let action = action_for_key(&state, key(KeyCode::Char(c))).unwrap();
            state.update(action);
        }
        assert_eq!(state.criteria.search, "frq");
        assert!(!state.should_quit);

        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        let action = action_for_key(&state, ctrl_u).unwrap();
        state.update(action);
        assert_eq!(state.criteria.search, "");
    }

    #[test]
    fn test_q_quits_from_grid() {
        let state = loaded();
        assert!(matches!(action_for_key(&state, key(KeyCode::Char('q'))), Some(Action::Quit)));
    }

    #[test]
    fn test_grid_columns_by_width() {
        assert_eq!(grid_columns(80), 1);
        assert_eq!(grid_columns(100), 2);
        assert_eq!(grid_columns(200), 3);
    }
}
