use crate::models::JobPosting;

/// Category value that leaves the job-type predicate unconstrained.
pub const ALL_CATEGORIES: &str = "All";

/// Categories offered by the filter bar, in cycling order.
pub const CATEGORIES: &[&str] = &[
    ALL_CATEGORIES,
    "full-time",
    "part-time",
    "remote",
    "contract",
    "freelance",
];

/// Maps user-supplied text onto its `CATEGORIES` spelling, ignoring case.
/// Anything else is passed through trimmed.
pub fn canonical_category(input: &str) -> String {
    let input = input.trim();
    CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(input))
        .map_or_else(|| input.to_string(), |c| c.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub category: String,
    pub location: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            location: String::new(),
        }
    }
}

impl FilterCriteria {
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty() && self.category == ALL_CATEGORIES && self.location.is_empty()
    }

    /// Moves to the next (or previous) entry of `CATEGORIES`. A category that
    /// is not in the list restarts the cycle at "All".
    pub fn cycle_category(&mut self, forward: bool) {
        let len = CATEGORIES.len();
        let next = match CATEGORIES
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&self.category))
        {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None => 0,
        };
        self.category = CATEGORIES[next].to_string();
    }
}

/// Keeps the jobs matching all three predicates, in input order.
pub fn filter_jobs<'a>(jobs: &'a [JobPosting], criteria: &FilterCriteria) -> Vec<&'a JobPosting> {
    let search = criteria.search.to_lowercase();
    let location = criteria.location.to_lowercase();
    let category = criteria.category.to_lowercase();
    let any_category = criteria.category == ALL_CATEGORIES;

    jobs.iter()
        .filter(|job| job.title.to_lowercase().contains(&search))
        .filter(|job| any_category || job.job_types.iter().any(|t| t.to_lowercase() == category))
        .filter(|job| job.location.to_lowercase().contains(&location))
        .collect()
}
