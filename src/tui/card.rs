use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::state::Action;
use crate::models::JobPosting;

/// Characters of description shown on a card.
pub const DESCRIPTION_BUDGET: usize = 180;
/// Rows one card occupies, borders included.
pub const CARD_HEIGHT: u16 = 10;
const BADGE_WIDTH: u16 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoBadge {
    Initials(String),
    Placeholder,
}

impl LogoBadge {
    /// Terminals cannot draw the logo image, so a posting with a logo gets its
    /// company initials and one without gets the "No Logo" block.
    pub fn for_job(job: &JobPosting) -> Self {
        if job.logo_link().is_none() {
            return LogoBadge::Placeholder;
        }
        let initials: String = job
            .company_name
            .split_whitespace()
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            LogoBadge::Initials("LOGO".to_string())
        } else {
            LogoBadge::Initials(initials)
        }
    }
}

/// Summary card for one posting. Stateless: everything comes from `job`.
pub struct JobCard<'a> {
    job: &'a JobPosting,
    selected: bool,
}

impl<'a> JobCard<'a> {
    pub fn new(job: &'a JobPosting, selected: bool) -> Self {
        Self { job, selected }
    }

    /// The card's "View Details" action.
    pub fn activate(&self) -> Action {
        Action::OpenDetail(self.job.id.clone())
    }
}

impl Widget for JobCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default().borders(Borders::ALL).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let [header, description, action] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        let [badge_area, _, heading] = Layout::horizontal([
            Constraint::Length(BADGE_WIDTH),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(header);

        render_badge(&LogoBadge::for_job(self.job), badge_area, buf);

        let job = self.job;
        let heading_lines = vec![
            Line::from(Span::styled(
                job.display_title().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} — {}", job.display_company(), job.display_location()),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                job.job_types.join(" · "),
                Style::default().fg(Color::Cyan),
            )),
        ];
        Paragraph::new(heading_lines).render(heading, buf);

        Paragraph::new(job.description_summary(DESCRIPTION_BUDGET))
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true })
            .render(description, buf);

        let button_style = if self.selected {
            Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Blue)
        };
        Paragraph::new(Span::styled("[ View Details ]", button_style))
            .alignment(Alignment::Center)
            .render(action, buf);
    }
}

fn render_badge(badge: &LogoBadge, area: Rect, buf: &mut Buffer) {
    let (label, style) = match badge {
        LogoBadge::Initials(initials) => (
            initials.as_str(),
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        LogoBadge::Placeholder => ("No Logo", Style::default().fg(Color::Gray).bg(Color::DarkGray)),
    };
    buf.set_style(area, style);
    let middle = Rect { y: area.y + area.height / 2, height: area.height.min(1), ..area };
    Paragraph::new(label)
        .style(style)
        .alignment(Alignment::Center)
        .render(middle, buf);
}
