use crate::core::config::DownloadConfig;
use crate::core::error::EnqueueError;
use crate::dispatch::DownloadClient;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// qBittorrent Web UI client.
///
/// Every [`enqueue`](DownloadClient::enqueue) call opens its own session:
/// a fresh cookie jar, a login, then a single add request for the batch.
pub struct QbtClient {
    url: String,
    username: Option<String>,
    password: Option<String>,
    save_path: String,
    timeout: Duration,
}

impl QbtClient {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            save_path: config.save_path.clone(),
            timeout: config.timeout(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.url, path)
    }

    async fn log_in(&self, client: &reqwest::Client, username: &str) -> Result<(), EnqueueError> {
        let password = self.password.as_deref().unwrap_or_default();
        let response = client
            .post(self.endpoint("auth/login"))
            .header(reqwest::header::REFERER, &self.url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnqueueError::Status(response.status()));
        }

        if !is_ok(&response.text().await?) {
            return Err(EnqueueError::LoginRejected);
        }

        debug!(username = %username, "Logged in to download client");
        Ok(())
    }
}

#[async_trait]
impl DownloadClient for QbtClient {
    async fn enqueue(&self, links: &[String]) -> Result<(), EnqueueError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .build()
            .map_err(|e| EnqueueError::Client(e.to_string()))?;

        if let Some(username) = &self.username {
            self.log_in(&client, username).await?;
        }

        let urls = links.join("\n");
        let response = client
            .post(self.endpoint("torrents/add"))
            .header(reqwest::header::REFERER, &self.url)
            .form(&[("urls", urls.as_str()), ("savepath", self.save_path.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnqueueError::Status(response.status()));
        }

        if !is_ok(&response.text().await?) {
            return Err(EnqueueError::AddRejected);
        }

        Ok(())
    }
}

/// qBittorrent answers `Ok.` on success and `Fails.` otherwise
fn is_ok(body: &str) -> bool {
    body.trim() == "Ok."
}
