use crate::core::config::NotifyConfig;
use crate::core::error::NotifyError;
use crate::dispatch::{Notification, Notifier};
use async_trait::async_trait;
use url::Url;

/// Push notifications over a Bark-style URL channel:
/// `GET {base_url}/{title}/{body}` with both parts percent-encoded.
pub struct BarkNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl BarkNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let url = push_url(&self.base_url, notification)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status()));
        }

        Ok(())
    }
}

fn push_url(base_url: &str, notification: &Notification) -> Result<Url, NotifyError> {
    let mut url = Url::parse(base_url).map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| NotifyError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .push(&notification.title)
        .push(&notification.body());

    Ok(url)
}
