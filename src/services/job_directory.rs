//! Known jobs and views of one CI server, and name-pattern resolution.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::errors::FetchError;
use crate::domain::models::{view_job_names, ServerListing};
use crate::domain::ports::SnapshotFetcher;

use super::job::Job;

/// Errors from [`JobDirectory::resolve`]
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid job pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Compile a job/view pattern so it must match the whole name.
///
/// The pattern is checked on its own first, so unbalanced groups cannot
/// escape the anchoring wrapper.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(pattern)?;
    Regex::new(&format!("^(?:{pattern})$"))
}

/// Snapshot of the jobs and views of one server, taken at construction.
#[derive(Debug)]
pub struct JobDirectory {
    server_url: String,
    jobs: HashMap<String, Arc<Job>>,
    view_urls: HashMap<String, String>,
}

impl JobDirectory {
    /// Fetch the top-level listing of `server_url`.
    ///
    /// Missing `jobs` or `views` keys are logged and leave that map empty.
    pub async fn load(server_url: &str, fetcher: &dyn SnapshotFetcher) -> Result<Self, FetchError> {
        let listing = ServerListing::from_value(&fetcher.fetch(server_url).await?);

        let jobs = listing.jobs.map_or_else(
            || {
                warn!(url = server_url, "cannot parse top level jobs");
                HashMap::new()
            },
            |jobs| {
                jobs.into_iter()
                    .map(|entry| {
                        let job = Arc::new(Job::named(entry.url, entry.name.clone()));
                        (entry.name, job)
                    })
                    .collect()
            },
        );

        let view_urls = listing.views.map_or_else(
            || {
                warn!(url = server_url, "cannot parse top level views");
                HashMap::new()
            },
            |views| views.into_iter().map(|view| (view.name, view.url)).collect(),
        );

        info!(
            url = server_url,
            jobs = jobs.len(),
            views = view_urls.len(),
            "job directory loaded"
        );

        Ok(Self {
            server_url: server_url.to_string(),
            jobs,
            view_urls,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Job handle by exact name.
    pub fn job(&self, name: &str) -> Option<Arc<Job>> {
        self.jobs.get(name).cloned()
    }

    /// Every listed job name, sorted.
    pub fn job_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.jobs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every listed view name, sorted.
    pub fn view_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.view_urls.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Jobs whose name fully matches `pattern`, plus the jobs of every view
    /// whose name fully matches it.
    ///
    /// A job listed by more than one matching view, or matching both by name
    /// and through a view, appears more than once.
    pub async fn resolve(
        &self,
        pattern: &str,
        fetcher: &dyn SnapshotFetcher,
    ) -> Result<Vec<Arc<Job>>, ResolveError> {
        let regex = compile_pattern(pattern).map_err(|source| ResolveError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matched: Vec<(&String, &Arc<Job>)> = self
            .jobs
            .iter()
            .filter(|(name, _)| regex.is_match(name))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(b.0));
        let mut jobs: Vec<Arc<Job>> = matched.into_iter().map(|(_, job)| Arc::clone(job)).collect();

        let mut views: Vec<(&String, &String)> = self
            .view_urls
            .iter()
            .filter(|(name, _)| regex.is_match(name))
            .collect();
        views.sort_by(|a, b| a.0.cmp(b.0));

        for (view_name, view_url) in views {
            jobs.extend(self.jobs_in_view(view_name, view_url, fetcher).await?);
        }

        Ok(jobs)
    }

    async fn jobs_in_view(
        &self,
        view_name: &str,
        view_url: &str,
        fetcher: &dyn SnapshotFetcher,
    ) -> Result<Vec<Arc<Job>>, FetchError> {
        let document = fetcher.fetch(view_url).await?;
        let Some(names) = view_job_names(&document) else {
            warn!(view = view_name, url = view_url, "view document has no jobs");
            return Ok(vec![]);
        };

        Ok(names
            .into_iter()
            .filter_map(|name| {
                let job = self.job(&name);
                if job.is_none() {
                    error!(
                        server = %self.server_url,
                        view = view_name,
                        job = %name,
                        "job listed in view is missing from server"
                    );
                }
                job
            })
            .collect())
    }
}
