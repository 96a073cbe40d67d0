use clap::ValueEnum;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{JobPosting, format_salary};

const USER_AGENT: &str = concat!("jobboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("jobs API responded with status {0}")]
    Status(StatusCode),

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("fetch task ended without a result")]
    Interrupted,
}

/// Upstream listing API. Each feed has its own endpoint and record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Feed {
    /// jobicy.com: `{ "jobs": [...] }` with camelCase fields
    Jobicy,
    /// remoteok.com: a bare array whose first element is a legal notice
    #[value(name = "remoteok")]
    RemoteOk,
}

impl Feed {
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Feed::Jobicy => "https://jobicy.com/api/v2/remote-jobs",
            Feed::RemoteOk => "https://remoteok.com/api",
        }
    }

    /// Maps a decoded response body to canonical postings. Records are kept
    /// even when most fields are missing; only non-objects and entries
    /// without a usable id (feed metadata, blank or structured ids) are skipped.
    pub fn normalize(self, body: Value) -> Result<Vec<JobPosting>, FetchError> {
        let records = match (self, body) {
            (Feed::Jobicy, Value::Object(mut obj)) => match obj.remove("jobs") {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(FetchError::Shape(format!(
                        "\"jobs\" is {}, expected an array",
                        json_kind(&other)
                    )));
                }
                None => return Err(FetchError::Shape("missing \"jobs\" key".to_string())),
            },
            (Feed::RemoteOk, Value::Array(items)) => items,
            (feed, other) => {
                return Err(FetchError::Shape(format!(
                    "{:?} feed returned {}",
                    feed,
                    json_kind(&other)
                )));
            }
        };

        let total = records.len();
        let jobs: Vec<JobPosting> = records
            .iter()
            .filter_map(Value::as_object)
            .filter(|obj| text(obj, "id").is_some())
            .map(|obj| match self {
                Feed::Jobicy => from_jobicy(obj),
                Feed::RemoteOk => from_remoteok(obj),
            })
            .collect();

        if jobs.len() < total {
            debug!(skipped = total - jobs.len(), feed = ?self, "skipped non-job entries");
        }
        Ok(jobs)
    }
}

fn from_jobicy(obj: &Map<String, Value>) -> JobPosting {
    JobPosting {
        id: text(obj, "id").unwrap_or_default(),
        title: text(obj, "jobTitle").unwrap_or_default(),
        company_name: text(obj, "companyName").unwrap_or_default(),
        company_logo_url: text(obj, "companyLogo"),
        location: text(obj, "jobGeo").unwrap_or_default(),
        job_types: text_list(obj, "jobType"),
        level: text(obj, "jobLevel"),
        description_html: text(obj, "jobDescription").unwrap_or_default(),
        excerpt_html: text(obj, "jobExcerpt"),
        salary: format_salary(
            number(obj, "annualSalaryMin"),
            number(obj, "annualSalaryMax"),
            text(obj, "salaryCurrency").as_deref(),
        ),
        published: text(obj, "pubDate"),
        apply_url: text(obj, "url"),
    }
}

fn from_remoteok(obj: &Map<String, Value>) -> JobPosting {
    JobPosting {
        id: text(obj, "id").unwrap_or_default(),
        title: text(obj, "position").unwrap_or_default(),
        company_name: text(obj, "company").unwrap_or_default(),
        company_logo_url: text(obj, "company_logo").or_else(|| text(obj, "logo")),
        location: text(obj, "location").unwrap_or_default(),
        job_types: text_list(obj, "tags"),
        level: None,
        description_html: text(obj, "description").unwrap_or_default(),
        excerpt_html: None,
        salary: format_salary(number(obj, "salary_min"), number(obj, "salary_max"), None),
        published: text(obj, "date"),
        apply_url: text(obj, "apply_url").or_else(|| text(obj, "url")),
    }
}

/// Reads a scalar field as text. Numbers and booleans are stringified; empty
/// strings count as absent.
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads an array of labels. A bare string is treated as a one-element list.
fn text_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches the listing from one feed endpoint.
pub struct JobSource {
    feed: Feed,
    endpoint: String,
    client: reqwest::Client,
}

impl JobSource {
    pub fn new(feed: Feed, endpoint: Option<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(feed, endpoint, client))
    }

    pub fn with_client(feed: Feed, endpoint: Option<String>, client: reqwest::Client) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| feed.default_endpoint().to_string());
        Self { feed, endpoint, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single GET, no retry, no timeout. The whole listing arrives in one body.
    pub async fn fetch_jobs(&self) -> Result<Vec<JobPosting>, FetchError> {
        info!(endpoint = %self.endpoint, feed = ?self.feed, "fetching jobs");

        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;
        let jobs = self.feed.normalize(value)?;

        info!(count = jobs.len(), "fetched jobs");
        Ok(jobs)
    }
}
