pub mod bark;
pub mod qbittorrent;

use crate::core::error::{EnqueueError, NotifyError};
use crate::models::torrent::TorrentSet;
use async_trait::async_trait;
use tracing::{error, info};

/// Download client that accepts a batch of torrent links in one request
#[async_trait]
pub trait DownloadClient: Send + Sync {
    async fn enqueue(&self, links: &[String]) -> Result<(), EnqueueError>;
}

/// Push notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub lines: Vec<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Summary of one enqueue attempt
    pub fn for_batch(enqueued: bool, count: usize) -> Self {
        let title = if enqueued {
            "new items succeeded"
        } else {
            "new items failed"
        };
        let noun = if count == 1 { "item" } else { "items" };

        Self::new(title, vec![format!("{} {}", count, noun)])
    }

    /// Sent once before the process exits on a missing listing table
    pub fn listing_unavailable() -> Self {
        Self::new(
            "listing fetch failed",
            vec!["session may have expired, check the log".to_string()],
        )
    }

    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

/// What a dispatch did with a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Empty delta; nothing was sent anywhere
    Skipped,
    Enqueued { count: usize, notified: bool },
    Failed { count: usize, notified: bool },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DispatchOutcome::Failed { .. })
    }
}

/// Hands new torrents to the download client and reports the result
pub struct Dispatcher<D, N> {
    base_url: String,
    passkey: String,
    download_client: D,
    notifier: N,
}

impl<D: DownloadClient, N: Notifier> Dispatcher<D, N> {
    pub fn new(base_url: String, passkey: String, download_client: D, notifier: N) -> Self {
        Self {
            base_url,
            passkey,
            download_client,
            notifier,
        }
    }

    pub fn download_client(&self) -> &D {
        &self.download_client
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// One enqueue attempt and one notification attempt for a nonempty delta
    pub async fn dispatch(&self, delta: &TorrentSet) -> DispatchOutcome {
        if delta.is_empty() {
            return DispatchOutcome::Skipped;
        }

        let count = delta.len();
        let links: Vec<String> = delta
            .iter()
            .map(|torrent| torrent.download_link(&self.base_url, &self.passkey))
            .collect();

        let enqueued = match self.download_client.enqueue(&links).await {
            Ok(()) => {
                info!(count, "Pushed torrents to download client");
                true
            }
            Err(e) => {
                error!(count, error = %e, "Failed to push torrents to download client");
                false
            }
        };

        let notified = self.send(&Notification::for_batch(enqueued, count)).await;

        if enqueued {
            DispatchOutcome::Enqueued { count, notified }
        } else {
            DispatchOutcome::Failed { count, notified }
        }
    }

    pub async fn notify_fatal(&self) -> bool {
        self.send(&Notification::listing_unavailable()).await
    }

    /// Deliver a notification; failures are logged and reported as `false`
    async fn send(&self, notification: &Notification) -> bool {
        match self.notifier.notify(notification).await {
            Ok(()) => {
                info!(title = %notification.title, "Notification sent");
                true
            }
            Err(e) => {
                error!(title = %notification.title, error = %e, "Failed to send notification");
                false
            }
        }
    }
}
