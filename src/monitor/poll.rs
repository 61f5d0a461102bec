use crate::core::error::{ExtractError, FatalError};
use crate::dispatch::{DispatchOutcome, Dispatcher, DownloadClient, Notifier};
use crate::models::torrent::TorrentSet;
use crate::scrape::extractor;
use crate::site::ListingSource;
use crate::tracker::diff::TrackedSet;
use std::time::Duration;
use tracing::{debug, error, info};

/// Characters of the listing body kept in the log on a fatal page
const BODY_LOG_LIMIT: usize = 4096;

/// Result of one non-fatal cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Fetch failed; the tracked set was left untouched
    FetchFailed,
    Completed {
        snapshot_len: usize,
        delta: TorrentSet,
        outcome: DispatchOutcome,
    },
}

/// Sequential fetch → extract → diff → dispatch → commit → sleep loop.
///
/// All calls are awaited in order on one task, so cycle n+1 never starts
/// before cycle n has committed or been abandoned.
pub struct PollLoop<S, D, N> {
    source: S,
    dispatcher: Dispatcher<D, N>,
    tracked: TrackedSet,
    interval: Duration,
}

impl<S, D, N> PollLoop<S, D, N>
where
    S: ListingSource,
    D: DownloadClient,
    N: Notifier,
{
    pub fn new(source: S, dispatcher: Dispatcher<D, N>, interval: Duration) -> Self {
        Self {
            source,
            dispatcher,
            tracked: TrackedSet::new(),
            interval,
        }
    }

    pub fn tracked(&self) -> &TrackedSet {
        &self.tracked
    }

    pub fn dispatcher(&self) -> &Dispatcher<D, N> {
        &self.dispatcher
    }

    /// Run cycles forever. Returns only when a fatal condition ends the loop.
    pub async fn run(mut self) -> FatalError {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Poll loop started"
        );

        loop {
            if let Err(fatal) = self.run_cycle().await {
                return fatal;
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One full cycle without the trailing sleep
    pub async fn run_cycle(&mut self) -> Result<CycleReport, FatalError> {
        let body = match self.source.fetch_listing().await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to fetch listing, skipping this cycle");
                return Ok(CycleReport::FetchFailed);
            }
        };

        let snapshot = match extractor::extract(&body) {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e, &body).await),
        };

        let snapshot_len = snapshot.len();
        debug!(count = snapshot_len, "Promoted torrents on listing");

        let diff = self.tracked.diff(snapshot);

        let outcome = if diff.is_empty() {
            DispatchOutcome::Skipped
        } else {
            for torrent in diff.delta.iter() {
                info!(id = torrent.id, name = %torrent.name, "New promoted torrent");
            }
            self.dispatcher.dispatch(&diff.delta).await
        };

        // The baseline advances whatever the dispatch outcome was
        self.tracked.replace(diff.next);

        Ok(CycleReport::Completed {
            snapshot_len,
            delta: diff.delta,
            outcome,
        })
    }

    async fn fail(&self, e: ExtractError, body: &str) -> FatalError {
        error!(fatal = true, error = %e, "Failed to read torrent listing, login state may be invalid");
        info!(body = %truncate(body, BODY_LOG_LIMIT), "Listing response body");

        self.dispatcher.notify_fatal().await;

        FatalError::from(e)
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
