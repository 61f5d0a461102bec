use crate::core::config::SiteConfig;
use crate::core::error::FetchError;
use crate::site::ListingSource;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};

/// HTTP client for the tracker site's listing page
pub struct SiteClient {
    client: reqwest::Client,
    listing_url: String,
}

impl SiteClient {
    pub fn new(config: &SiteConfig) -> Result<Self, FetchError> {
        let headers = build_headers(config)?;

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            listing_url: listing_url(config),
        })
    }
}

#[async_trait]
impl ListingSource for SiteClient {
    /// Fetch the raw listing page
    async fn fetch_listing(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.listing_url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.listing_url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        response.text().await.map_err(FetchError::Body)
    }
}

fn listing_url(config: &SiteConfig) -> String {
    format!(
        "{}/{}",
        config.base_url,
        config.listing_path.trim_start_matches('/')
    )
}

fn build_headers(config: &SiteConfig) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();

    if let Some(cookie) = &config.cookie {
        let value = HeaderValue::from_str(cookie)
            .map_err(|_| FetchError::InvalidHeader("Cookie".to_string()))?;
        headers.insert(COOKIE, value);
    }

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FetchError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| FetchError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn site_config() -> SiteConfig {
        SiteConfig {
            base_url: "https://bt.example.org".to_string(),
            passkey: "abc".to_string(),
            listing_path: "torrents.php".to_string(),
            cookie: Some("uid=1; pass=2".to_string()),
            user_agent: "bidwatch-test".to_string(),
            headers: HashMap::new(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn test_site_client_creation() {
        let client = SiteClient::new(&site_config()).unwrap();
        assert_eq!(client.listing_url, "https://bt.example.org/torrents.php");
    }

    #[test]
    fn test_listing_url_strips_leading_slash() {
        let mut config = site_config();
        config.listing_path = "/torrents.php?inclbookmarked=0".to_string();
        assert_eq!(
            listing_url(&config),
            "https://bt.example.org/torrents.php?inclbookmarked=0"
        );
    }

    #[test]
    fn test_build_headers() {
        let mut config = site_config();
        config
            .headers
            .insert("Referer".to_string(), "https://bt.example.org/".to_string());

        let headers = build_headers(&config).unwrap();

        assert_eq!(headers.get(COOKIE).unwrap(), "uid=1; pass=2");
        assert_eq!(headers.get("referer").unwrap(), "https://bt.example.org/");
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let mut config = site_config();
        config
            .headers
            .insert("bad header".to_string(), "value".to_string());

        assert!(matches!(
            build_headers(&config),
            Err(FetchError::InvalidHeader(name)) if name == "bad header"
        ));
    }
}
