//! GitHub Releases API client.

use crate::domain::model::Release;
use crate::domain::ports::ReleaseSource;
use crate::utils::error::{NotifierError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("release-notifier/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Option<serde_json::Value>> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Fetching {}", url);
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(NotifierError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn latest_release(
        &self,
        repo: &str,
        include_prereleases: bool,
    ) -> Result<Option<Release>> {
        let releases_url = format!("{}/repos/{}/releases", self.base_url, repo);

        // /latest never returns prereleases, so take the newest entry of the list instead
        let item = if include_prereleases {
            match self.get_json(&format!("{}?per_page=1", releases_url)).await? {
                Some(serde_json::Value::Array(items)) => items.into_iter().next(),
                _ => None,
            }
        } else {
            self.get_json(&format!("{}/latest", releases_url)).await?
        };

        let Some(item) = item.filter(serde_json::Value::is_object) else {
            return Ok(None);
        };

        let mut release: Release = serde_json::from_value(item)?;
        if release.tag_name.trim().is_empty() {
            return Ok(None);
        }
        if release.name.trim().is_empty() {
            release.name = release.tag_name.clone();
        }

        Ok(Some(release))
    }
}
