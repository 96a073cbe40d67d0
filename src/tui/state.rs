use tracing::{info, warn};

use crate::filter::{FilterCriteria, filter_jobs};
use crate::models::JobPosting;
use crate::source::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    Search,
    Category,
    Location,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Grid => Focus::Search,
            Focus::Search => Focus::Category,
            Focus::Category => Focus::Location,
            Focus::Location => Focus::Grid,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Grid => Focus::Location,
            Focus::Search => Focus::Grid,
            Focus::Category => Focus::Search,
            Focus::Location => Focus::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDetail {
    pub id: String,
    pub scroll: u16,
    /// Scroll limit for the current overlay size; unbounded until first fitted.
    pub max_scroll: u16,
}

#[derive(Debug)]
pub enum Action {
    FetchCompleted(Result<Vec<JobPosting>, FetchError>),
    Input(char),
    Backspace,
    ClearField,
    CycleCategory(bool),
    FocusNext,
    FocusPrev,
    FocusGrid,
    Move(Move),
    OpenDetail(String),
    CloseDetail,
    ScrollDetail(i16),
    Apply,
    Quit,
}

/// Side effects requested by `AppState::update`, carried out by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenUrl(String),
}

pub struct AppState {
    pub jobs: Vec<JobPosting>,
    pub load: LoadState,
    pub criteria: FilterCriteria,
    pub focus: Focus,
    /// Index into the filtered view, not into `jobs`.
    pub selected: usize,
    pub columns: usize,
    pub detail: Option<OpenDetail>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            jobs: Vec::new(),
            load: LoadState::Loading,
            criteria,
            focus: Focus::Grid,
            selected: 0,
            columns: 1,
            detail: None,
            status: None,
            should_quit: false,
        }
    }

    /// The filtered list, derived fresh on every call.
    pub fn visible(&self) -> Vec<&JobPosting> {
        filter_jobs(&self.jobs, &self.criteria)
    }

    pub fn selected_job(&self) -> Option<&JobPosting> {
        self.visible().get(self.selected).copied()
    }

    pub fn detail_job(&self) -> Option<&JobPosting> {
        let open = self.detail.as_ref()?;
        self.jobs.iter().find(|j| j.id == open.id)
    }

    pub fn update(&mut self, action: Action) -> Option<Command> {
        if !matches!(action, Action::FetchCompleted(_)) {
            self.status = None;
        }

        match action {
            Action::FetchCompleted(Ok(jobs)) => {
                info!(count = jobs.len(), "job list loaded");
                self.jobs = jobs;
                self.load = LoadState::Loaded;
                self.selected = 0;
            }
            Action::FetchCompleted(Err(e)) => {
                warn!(error = %e, "failed to fetch jobs, showing empty list");
                self.jobs.clear();
                self.load = LoadState::Loaded;
                self.selected = 0;
            }
            Action::Input(c) => {
                if let Some(field) = self.focused_text_mut() {
                    field.push(c);
                    self.selected = 0;
                }
            }
            Action::Backspace => {
                if let Some(field) = self.focused_text_mut() {
                    field.pop();
                    self.selected = 0;
                }
            }
            Action::ClearField => {
                if let Some(field) = self.focused_text_mut() {
                    field.clear();
                    self.selected = 0;
                }
            }
            Action::CycleCategory(forward) => {
                self.criteria.cycle_category(forward);
                self.selected = 0;
            }
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPrev => self.focus = self.focus.prev(),
            Action::FocusGrid => self.focus = Focus::Grid,
            Action::Move(dir) => self.move_selection(dir),
            Action::OpenDetail(id) => {
                info!(job_id = %id, "opening detail view");
                self.detail = Some(OpenDetail {
                    id,
                    scroll: 0,
                    max_scroll: u16::MAX,
                });
            }
            Action::CloseDetail => {
                if let Some(open) = self.detail.take() {
                    info!(job_id = %open.id, "closing detail view");
                }
            }
            Action::ScrollDetail(delta) => {
                if let Some(open) = self.detail.as_mut() {
                    open.scroll = open.scroll.saturating_add_signed(delta).min(open.max_scroll);
                }
            }
            Action::Apply => {
                let link = self.detail_job().map(|job| job.apply_link().map(str::to_string));
                match link {
                    Some(Some(url)) => return Some(Command::OpenUrl(url)),
                    Some(None) => {
                        self.status = Some("No apply link for this posting".to_string());
                    }
                    None => {}
                }
            }
            Action::Quit => self.should_quit = true,
        }
        None
    }

    /// Records how far the open detail can scroll at its drawn size and pulls
    /// the offset back inside it. Called before each draw, so it leaves the
    /// status line alone.
    pub fn fit_detail(&mut self, max_scroll: u16) {
        if let Some(open) = self.detail.as_mut() {
            open.max_scroll = max_scroll;
            open.scroll = open.scroll.min(max_scroll);
        }
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Search => Some(&mut self.criteria.search),
            Focus::Location => Some(&mut self.criteria.location),
            Focus::Grid | Focus::Category => None,
        }
    }

    fn move_selection(&mut self, dir: Move) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let cols = self.columns.max(1);
        let cur = self.selected.min(len - 1);
        self.selected = match dir {
            Move::Left => cur.saturating_sub(1),
            Move::Right => (cur + 1).min(len - 1),
            Move::Up => cur.checked_sub(cols).unwrap_or(cur),
            Move::Down if cur + cols < len => cur + cols,
            // Last partial row: land on the final card instead of staying put.
            Move::Down if cur / cols < (len - 1) / cols => len - 1,
            Move::Down => cur,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, title: &str, types: &[&str], location: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: title.to_string(),
            job_types: types.iter().map(|t| t.to_string()).collect(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    fn loaded(jobs: Vec<JobPosting>) -> AppState {
        let mut state = AppState::new(FilterCriteria::default());
        state.update(Action::FetchCompleted(Ok(jobs)));
        state
    }

    fn sample() -> Vec<JobPosting> {
        vec![
            job("1", "Backend Dev", &["full-time"], "Berlin"),
            job("2", "Frontend Dev", &["remote"], "Remote"),
            job("3", "Data Engineer", &["contract"], "Lisbon"),
        ]
    }

    #[test]
    fn test_fetch_failure_leaves_empty_loaded_list() {
        let mut state = AppState::new(FilterCriteria::default());
        assert_eq!(state.load, LoadState::Loading);
        state.update(Action::FetchCompleted(Err(FetchError::Interrupted)));
        assert_eq!(state.load, LoadState::Loaded);
        assert!(state.jobs.is_empty());
        assert!(state.visible().is_empty());
        assert!(state.status.is_none());
    }

    #[test]
    fn test_typing_in_search_filters_and_resets_selection() {
        let mut state = loaded(sample());
        state.selected = 2;

        // grid focus ignores text input
        state.update(Action::Input('x'));
        assert_eq!(state.criteria.search, "");
        assert_eq!(state.selected, 2);

        state.update(Action::FocusNext);
        assert_eq!(state.focus, Focus::Search);
        for c in "dev".chars() {
            state.update(Action::Input(c));
        }
        assert_eq!(state.criteria.search, "dev");
        assert_eq!(state.selected, 0);
        assert_eq!(state.visible().len(), 2);

        state.update(Action::Backspace);
        assert_eq!(state.criteria.search, "de");
        state.update(Action::ClearField);
        assert_eq!(state.criteria.search, "");
        assert_eq!(state.visible().len(), 3);
    }

    #[test]
    fn test_location_field_and_category_cycle() {
        let mut state = loaded(sample());
        state.focus = Focus::Location;
        for c in "lis".chars() {
            state.update(Action::Input(c));
        }
        assert_eq!(state.visible().len(), 1);
        assert_eq!(state.visible()[0].id, "3");

        state.update(Action::ClearField);
        state.update(Action::CycleCategory(true));
        assert_eq!(state.criteria.category, "full-time");
        assert_eq!(state.visible().len(), 1);
        assert_eq!(state.visible()[0].id, "1");
    }

    #[test]
    fn test_focus_cycles_both_ways() {
        let mut state = loaded(sample());
        state.update(Action::FocusPrev);
        assert_eq!(state.focus, Focus::Location);
        state.update(Action::FocusNext);
        assert_eq!(state.focus, Focus::Grid);
        state.update(Action::FocusNext);
        state.update(Action::FocusNext);
        assert_eq!(state.focus, Focus::Category);
        state.update(Action::FocusGrid);
        assert_eq!(state.focus, Focus::Grid);
    }

    #[test]
    fn test_grid_movement_respects_columns() {
        let mut jobs = sample();
        jobs.push(job("4", "QA", &[], ""));
        jobs.push(job("5", "SRE", &[], ""));
        let mut state = loaded(jobs);
        state.columns = 2;

        state.update(Action::Move(Move::Right));
        assert_eq!(state.selected, 1);
        state.update(Action::Move(Move::Down));
        assert_eq!(state.selected, 3);
        // row 2 has only index 4, so Down from 3 lands on it
        state.update(Action::Move(Move::Down));
        assert_eq!(state.selected, 4);
        state.update(Action::Move(Move::Down));
        assert_eq!(state.selected, 4);
        state.update(Action::Move(Move::Up));
        assert_eq!(state.selected, 2);
        state.update(Action::Move(Move::Left));
        state.update(Action::Move(Move::Left));
        state.update(Action::Move(Move::Left));
        assert_eq!(state.selected, 0);
        state.update(Action::Move(Move::Up));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_detail_open_close_leaves_jobs_untouched() {
        let mut state = loaded(sample());
        let before = state.jobs.clone();

        state.update(Action::OpenDetail("2".to_string()));
        assert_eq!(state.detail_job().map(|j| j.id.as_str()), Some("2"));
        state.update(Action::ScrollDetail(5));
        state.update(Action::ScrollDetail(-2));
        assert_eq!(state.detail.as_ref().map(|d| d.scroll), Some(3));

        // a second open replaces the first, one detail at a time
        state.update(Action::OpenDetail("3".to_string()));
        assert_eq!(state.detail.as_ref().map(|d| d.id.as_str()), Some("3"));
        assert_eq!(state.detail.as_ref().map(|d| d.scroll), Some(0));

        state.update(Action::CloseDetail);
        assert!(state.detail.is_none());
        assert_eq!(state.jobs, before);
    }

    #[test]
    fn test_detail_scroll_stops_at_fitted_limit() {
        let mut state = loaded(sample());
        state.update(Action::OpenDetail("1".to_string()));
        state.fit_detail(40);

        for _ in 0..20 {
            state.update(Action::ScrollDetail(10));
        }
        assert_eq!(state.detail.as_ref().map(|d| d.scroll), Some(40));

        // one step back moves off the limit right away
        state.update(Action::ScrollDetail(-1));
        assert_eq!(state.detail.as_ref().map(|d| d.scroll), Some(39));

        // a taller overlay shrinks the limit and pulls the offset in
        state.fit_detail(12);
        assert_eq!(state.detail.as_ref().map(|d| d.scroll), Some(12));
        state.update(Action::ScrollDetail(-100));
        assert_eq!(state.detail.as_ref().map(|d| d.scroll), Some(0));
    }

    #[test]
    fn test_fit_detail_keeps_status() {
        let mut state = loaded(sample());
        state.update(Action::OpenDetail("1".to_string()));
        state.update(Action::Apply);
        state.fit_detail(0);
        assert_eq!(state.status.as_deref(), Some("No apply link for this posting"));
    }

    #[test]
    fn test_apply_without_link_sets_status() {
        let mut state = loaded(sample());
        state.update(Action::OpenDetail("1".to_string()));
        let cmd = state.update(Action::Apply);
        assert!(cmd.is_none());
        assert_eq!(state.status.as_deref(), Some("No apply link for this posting"));
    }

    #[test]
    fn test_apply_with_link_requests_open() {
        let mut jobs = sample();
        jobs[0].apply_url = Some("https://example.com/apply/1".to_string());
        let mut state = loaded(jobs);
        state.update(Action::OpenDetail("1".to_string()));
        let cmd = state.update(Action::Apply);
        assert_eq!(cmd, Some(Command::OpenUrl("https://example.com/apply/1".to_string())));
    }

    #[test]
    fn test_apply_without_open_detail_is_noop() {
        let mut state = loaded(sample());
        assert!(state.update(Action::Apply).is_none());
        assert!(state.status.is_none());
    }

    #[test]
    fn test_quit() {
        let mut state = loaded(sample());
        state.update(Action::Quit);
        assert!(state.should_quit);
    }
}
