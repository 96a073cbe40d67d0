mod filter;
mod logging;
mod markup;
mod models;
mod source;
mod tui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use filter::{ALL_CATEGORIES, FilterCriteria, canonical_category, filter_jobs};
use models::JobPosting;
use source::{Feed, JobSource};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Browse remote job listings from the terminal")]
struct Cli {
    /// Jobs API to read from
    #[arg(long, value_enum, default_value = "jobicy", global = true)]
    feed: Feed,

    /// Override the feed's endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log file (default: the platform data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse jobs interactively (default)
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print matching jobs and exit
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print normalized records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Initial title search text
    #[arg(short, long)]
    search: Option<String>,

    /// Job type (All, full-time, part-time, remote, contract, freelance)
    #[arg(short, long)]
    category: Option<String>,

    /// Initial location text
    #[arg(short, long)]
    location: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            search: args.search.unwrap_or_default(),
            category: args
                .category
                .filter(|c| !c.trim().is_empty())
                .map_or_else(|| ALL_CATEGORIES.to_string(), |c| canonical_category(&c)),
            location: args.location.unwrap_or_default(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init(cli.log_file.as_deref())?;
    info!(log = %log_path.display(), feed = ?cli.feed, "starting jobboard");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let source = JobSource::new(cli.feed, cli.endpoint).context("Failed to build HTTP client")?;

    let command = cli.command.unwrap_or(Commands::Browse {
        filters: FilterArgs::default(),
    });

    match command {
        Commands::Browse { filters } => {
            tui::run_browse(runtime, source, filters.into())?;
        }

        Commands::List { filters, json } => {
            let jobs = match runtime.block_on(source.fetch_jobs()) {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!(error = %e, endpoint = source.endpoint(), "failed to fetch jobs");
                    Vec::new()
                }
            };
            let criteria: FilterCriteria = filters.into();
            let visible = filter_jobs(&jobs, &criteria);
            info!(
                shown = visible.len(),
                total = jobs.len(),
                filtered = !criteria.is_unconstrained(),
                "listing jobs"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else if visible.is_empty() {
                println!("No jobs found.");
            } else {
                print!("{}", format_table(&visible));
            }
        }
    }

    Ok(())
}

fn format_table(jobs: &[&JobPosting]) -> String {
    let mut out = format!(
        "{:<10} {:<34} {:<22} {:<18} {:<20}\n",
        "ID", "TITLE", "COMPANY", "LOCATION", "TYPE"
    );
    out.push_str(&"-".repeat(108));
    out.push('\n');
    for job in jobs {
        out.push_str(&format!(
            "{:<10} {:<34} {:<22} {:<18} {:<20}\n",
            truncate(&job.id, 10),
            truncate(job.display_title(), 34),
            truncate(job.display_company(), 22),
            truncate(job.display_location(), 18),
            truncate(&job.display_job_types(), 20),
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", markup::truncate_chars(s, max.saturating_sub(3)))
    }
}
