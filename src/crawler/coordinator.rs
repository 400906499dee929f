//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives one wishlist crawl:
//! - Visiting the seed page
//! - Spawning a visit for every page a handler discovers, while other
//!   visits are still in flight
//! - Waiting until every visit, including discovered ones, has finished
//! - Recording failures without aborting sibling visits
//!
//! Visited URLs are not de-duplicated: a "see more" link that cycles back
//! to an earlier page would be followed again. The optional crawl deadline
//! is what bounds such a crawl.

use crate::crawler::extractors::PageHandler;
use crate::crawler::fetcher::{is_bot_challenge, FetchResult, Fetcher};
use crate::crawler::parser::Page;
use crate::state::{lock_state, CrawlState, SharedCrawlState};
use crate::CrawlError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Where debug mode saves fetched pages
#[derive(Debug, Clone)]
pub struct DebugDump {
    /// Directory the HTML files are written to
    pub directory: PathBuf,
}

/// Main crawler coordinator structure
pub struct Coordinator<H> {
    fetcher: Arc<Fetcher>,
    handler: Arc<H>,
    state: SharedCrawlState,
    debug_dump: Option<DebugDump>,
    deadline: Option<Duration>,
}

/// Everything a single page visit task needs
struct Visit<H> {
    fetcher: Arc<Fetcher>,
    handler: Arc<H>,
    state: SharedCrawlState,
    debug_dump: Option<DebugDump>,
}

impl<H> Clone for Visit<H> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            handler: Arc::clone(&self.handler),
            state: Arc::clone(&self.state),
            debug_dump: self.debug_dump.clone(),
        }
    }
}

impl<H: PageHandler> Coordinator<H> {
    /// Creates a coordinator for a crawl starting at the first URL of `state`
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher shared by every page visit
    /// * `handler` - What to extract from each visited page
    /// * `state` - Fresh crawl state, seeded with the start URL
    pub fn new(fetcher: Arc<Fetcher>, handler: H, state: CrawlState) -> Self {
        Self {
            fetcher,
            handler: Arc::new(handler),
            state: state.into_shared(),
            debug_dump: None,
            deadline: None,
        }
    }

    /// Saves every fetched page into `directory`
    pub fn with_debug_dump(mut self, directory: impl Into<PathBuf>) -> Self {
        self.debug_dump = Some(DebugDump {
            directory: directory.into(),
        });
        self
    }

    /// Gives up on the crawl after `deadline`; `None` waits forever
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the crawl to completion
    ///
    /// Returns only once every discovered page has been visited and
    /// extracted, or the deadline passed. Errors are recorded in the
    /// returned state rather than returned.
    pub async fn run(self) -> CrawlState {
        let seed = lock_state(&self.state).urls.first().cloned();
        let Some(seed) = seed else {
            tracing::warn!("Nothing to crawl: no seed URL");
            return into_state(self.state);
        };

        tracing::info!("Using URL {}", seed);

        let visit = Visit {
            fetcher: self.fetcher,
            handler: self.handler,
            state: Arc::clone(&self.state),
            debug_dump: self.debug_dump,
        };

        let mut tasks = JoinSet::new();
        tasks.spawn(visit.clone().run(seed));

        let finished = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, drive(&mut tasks, &visit))
                .await
                .is_ok(),
            None => {
                drive(&mut tasks, &visit).await;
                true
            }
        };

        if !finished {
            tasks.shutdown().await;
            let secs = self.deadline.map(|d| d.as_secs()).unwrap_or_default();
            lock_state(&self.state).record_error(CrawlError::Deadline { secs });
        }

        drop(visit);
        let state = into_state(self.state);
        tracing::info!(
            "Crawl finished: {} page(s), {} item(s), {} error(s)",
            state.urls.len(),
            state.items.len(),
            state.errors.len()
        );
        state
    }
}

/// Joins page visits until none are left, spawning discovered pages as they come in
async fn drive<H: PageHandler>(tasks: &mut JoinSet<Vec<String>>, visit: &Visit<H>) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(next_pages) => {
                for url in next_pages {
                    tasks.spawn(visit.clone().run(url));
                }
            }
            Err(e) => {
                lock_state(&visit.state).record_error(CrawlError::Task(e.to_string()));
            }
        }
    }
}

/// Takes the crawl state back out of its lock once no task holds it
fn into_state(state: SharedCrawlState) -> CrawlState {
    match Arc::try_unwrap(state) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
        Err(shared) => lock_state(&shared).clone(),
    }
}

impl<H: PageHandler> Visit<H> {
    /// Visits one page, returning the further pages its handler discovered
    async fn run(self, url: String) -> Vec<String> {
        tracing::debug!("Visiting {}", url);

        match self.fetcher.fetch(&url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
                from_cache,
            } => {
                tracing::debug!(
                    "Status {} for {}{}",
                    status_code,
                    final_url,
                    if from_cache { " (cached)" } else { "" }
                );

                if is_bot_challenge(&body) {
                    self.record(CrawlError::BotDetected { url: url.clone() });
                }

                if let Some(dump) = &self.debug_dump {
                    self.save_page(dump, &final_url, &body).await;
                }

                let page_url = match Url::parse(&final_url) {
                    Ok(page_url) => page_url,
                    Err(e) => {
                        self.record(CrawlError::Fetch {
                            url,
                            message: format!("Invalid final URL {}: {}", final_url, e),
                        });
                        return Vec::new();
                    }
                };

                extract_page(self.handler.as_ref(), &self.state, &body, page_url)
            }

            FetchResult::HttpError { status_code } => {
                self.record(CrawlError::HttpStatus { url, status_code });
                Vec::new()
            }

            FetchResult::NetworkError { error } => {
                self.record(CrawlError::Fetch {
                    url,
                    message: error,
                });
                Vec::new()
            }
        }
    }

    fn record(&self, error: CrawlError) {
        lock_state(&self.state).record_error(error);
    }

    /// Writes the raw HTML of a page for debugging
    async fn save_page(&self, dump: &DebugDump, page_url: &str, body: &str) {
        let wishlist_id = lock_state(&self.state).wishlist_id.clone();
        let path = dump
            .directory
            .join(format!("wishlist-{}-{}.html", wishlist_id, page_file_name(page_url)));

        tracing::debug!("Saving wishlist HTML source to {}", path.display());
        if let Err(e) = tokio::fs::write(&path, body).await {
            self.record(CrawlError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            });
        }
    }
}

/// Parses a page and runs the handler against it with the state locked
///
/// Synchronous so the parsed document never lives across an await point.
fn extract_page<H: PageHandler>(
    handler: &H,
    state: &Mutex<CrawlState>,
    body: &str,
    page_url: Url,
) -> Vec<String> {
    let page = Page::parse(body, page_url);
    let mut state = lock_state(state);
    handler.handle(&page, &mut state)
}

/// Turns a page URL's path and query into a safe file name fragment
fn page_file_name(page_url: &str) -> String {
    let path_and_query = match Url::parse(page_url) {
        Ok(url) => format!("{}{}", url.path(), url.query().unwrap_or_default()),
        Err(_) => page_url.to_string(),
    };

    let name: String = path_and_query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    name.trim_matches('_').to_string()
}
