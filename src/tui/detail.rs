use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::models::JobPosting;

/// Expanded view of one posting, drawn as an overlay over the card grid.
pub struct DetailView<'a> {
    job: &'a JobPosting,
    scroll: u16,
}

impl<'a> DetailView<'a> {
    pub fn new(job: &'a JobPosting, scroll: u16) -> Self {
        Self { job, scroll }
    }
}

impl Widget for DetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Job Details ")
            .title_bottom(Line::from(" j/k:scroll  a:apply  esc:close ").right_aligned());
        let (body, apply) = split(block.inner(area));
        block.render(area, buf);

        let lines = build_detail(self.job, wrap_width(body));
        let max_scroll = overflow(lines.len(), body);
        Paragraph::new(lines)
            .scroll((self.scroll.min(max_scroll), 0))
            .render(body, buf);

        apply_line(self.job).render(apply, buf);
    }
}

/// Largest scroll offset that still moves the body when `job` is drawn into `area`.
pub fn max_scroll(job: &JobPosting, area: Rect) -> u16 {
    let (body, _) = split(Block::default().borders(Borders::ALL).inner(area));
    overflow(build_detail(job, wrap_width(body)).len(), body)
}

fn split(inner: Rect) -> (Rect, Rect) {
    let [body, _, apply] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    (body, apply)
}

fn wrap_width(body: Rect) -> usize {
    body.width.saturating_sub(1).max(10) as usize
}

fn overflow(lines: usize, body: Rect) -> u16 {
    u16::try_from(lines.saturating_sub(body.height as usize)).unwrap_or(u16::MAX)
}

fn apply_line(job: &JobPosting) -> Line<'static> {
    match job.apply_link() {
        Some(url) => Line::from(vec![
            Span::styled(
                "[ Apply Here (a) ]",
                Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(url.to_string(), Style::default().fg(Color::DarkGray)),
        ])
        .centered(),
        None => Line::from(Span::styled(
            "Apply link unavailable",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
        ))
        .centered(),
    }
}

/// Pre-wrapped content lines, so scrolling counts real rows.
fn build_detail(job: &JobPosting, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    for row in textwrap::wrap(job.display_title(), width) {
        lines.push(Line::from(Span::styled(
            row.into_owned(),
            bold.fg(Color::White),
        )));
    }
    lines.push(Line::from(""));

    push_wrapped(&mut lines, &job.excerpt_text(), width, Style::default().fg(Color::Gray));
    lines.push(Line::from(""));

    let fields = [
        ("Company", job.detail_company().to_string()),
        ("Location", job.display_location().to_string()),
        ("Type", job.display_job_types()),
        ("Level", job.display_level().to_string()),
        ("Salary", job.display_salary().to_string()),
        ("Published Date", job.display_published()),
    ];
    for (label, value) in fields {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", label), bold),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Description", bold)));
    push_wrapped(&mut lines, &job.description_text(), width, Style::default());

    lines
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style) {
    for paragraph in text.lines() {
        if paragraph.is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for row in textwrap::wrap(paragraph, width) {
            lines.push(Line::from(Span::styled(row.into_owned(), style)));
        }
    }
}
