// Error types for each failure class of the monitor

use thiserror::Error;

/// Errors while fetching the listing page. Always recoverable: the cycle is
/// abandoned and the tracked set stays as it was.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Listing returned error status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to read listing body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Structural extraction failures. These end the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Listing table not found, the session is probably no longer valid")]
    ListingTableMissing,
}

/// Reasons a single promoted row is dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Row has no detail link")]
    MissingDetailLink,

    #[error("Row has no download link")]
    MissingDownloadLink,

    #[error("Download link has no id parameter: {0}")]
    MissingId(String),

    #[error("Download link id is not numeric: {0}")]
    InvalidId(String),
}

/// Errors while handing a batch to the download client
#[derive(Error, Debug)]
pub enum EnqueueError {
    #[error("Failed to build download client: {0}")]
    Client(String),

    #[error("Download client rejected the login")]
    LoginRejected,

    #[error("Download client rejected the torrents")]
    AddRejected,

    #[error("Download client returned error status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Request to download client failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors while delivering a push notification
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid notification URL: {0}")]
    InvalidUrl(String),

    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification service returned error status: {0}")]
    Status(reqwest::StatusCode),
}

/// Conditions that stop the poll loop and end the process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
}
