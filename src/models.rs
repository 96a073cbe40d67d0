use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::markup;

pub const NO_TITLE: &str = "No Title";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LOCATION: &str = "Remote";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_EXCERPT: &str = "No additional info";

/// One normalized remote-job record. Missing text fields are empty strings;
/// the accessors below supply the display placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company_name: String,
    pub company_logo_url: Option<String>,
    pub location: String,
    pub job_types: Vec<String>,
    pub level: Option<String>,
    pub description_html: String,
    pub excerpt_html: Option<String>,
    pub salary: Option<String>,
    pub published: Option<String>,
    pub apply_url: Option<String>,
}

impl JobPosting {
    pub fn display_title(&self) -> &str {
        non_empty(&self.title).unwrap_or(NO_TITLE)
    }

    /// Company as shown on a card.
    pub fn display_company(&self) -> &str {
        non_empty(&self.company_name).unwrap_or(UNKNOWN_COMPANY)
    }

    /// Company as shown in the detail field list.
    pub fn detail_company(&self) -> &str {
        non_empty(&self.company_name).unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_location(&self) -> &str {
        non_empty(&self.location).unwrap_or(DEFAULT_LOCATION)
    }

    pub fn display_job_types(&self) -> String {
        if self.job_types.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.job_types.join(", ")
        }
    }

    pub fn display_level(&self) -> &str {
        self.level.as_deref().and_then(non_empty).unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_salary(&self) -> &str {
        self.salary.as_deref().and_then(non_empty).unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_published(&self) -> String {
        match self.published.as_deref().and_then(non_empty) {
            Some(raw) => format_published(raw),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    /// Plain-text description, truncated to `budget` characters.
    pub fn description_summary(&self, budget: usize) -> String {
        let text = markup::to_single_line(&self.description_html);
        if text.is_empty() {
            return NO_DESCRIPTION.to_string();
        }
        format!("{} ...", markup::truncate_chars(&text, budget))
    }

    pub fn description_text(&self) -> String {
        let text = markup::to_plain_text(&self.description_html);
        if text.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            text
        }
    }

    pub fn excerpt_text(&self) -> String {
        let text = self
            .excerpt_html
            .as_deref()
            .map(markup::to_plain_text)
            .unwrap_or_default();
        if text.is_empty() {
            NO_EXCERPT.to_string()
        } else {
            text
        }
    }

    pub fn apply_link(&self) -> Option<&str> {
        self.apply_url.as_deref().and_then(non_empty)
    }

    pub fn logo_link(&self) -> Option<&str> {
        self.company_logo_url.as_deref().and_then(non_empty)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Formats an upstream timestamp as e.g. "Jan 10, 2025". Values in an
/// unknown format are shown as received.
pub fn format_published(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %d, %Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%b %d, %Y").to_string();
    }
    raw.to_string()
}

/// Builds a salary range string from upstream min/max values. Zero counts as
/// absent, since some feeds send 0 for "not disclosed".
pub fn format_salary(min: Option<i64>, max: Option<i64>, currency: Option<&str>) -> Option<String> {
    let min = min.filter(|v| *v > 0);
    let max = max.filter(|v| *v > 0);
    let prefix = match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("{} ", c),
        None => "$".to_string(),
    };
    match (min, max) {
        (Some(min), Some(max)) if min == max => Some(format!("{}{}", prefix, min)),
        (Some(min), Some(max)) => Some(format!("{}{} - {}", prefix, min, max)),
        (Some(min), None) => Some(format!("{}{}+", prefix, min)),
        (None, Some(max)) => Some(format!("up to {}{}", prefix, max)),
        (None, None) => None,
    }
}
