// GitHub release publishing for generated reports
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use super::errors::GitHubError;
use super::types::{AssetInfo, PublishedAsset, ReleaseInfo};
use crate::config::GitHubConfig;
use crate::errors::ReportError;
use crate::pipeline::AssetPublisher;
use crate::window::ReportWindow;

const RELEASE_NAME: &str = "Sentry vendor report";

/// Keeps the latest report attached to a single rolling release
#[derive(Debug, Clone)]
pub struct ReleasePublisher {
    octocrab: Octocrab,
    http: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
    tag: String,
}

impl ReleasePublisher {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let octocrab = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_url.as_str())?
            .build()?;

        Ok(Self {
            octocrab,
            http: reqwest::Client::new(),
            token: config.token.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            tag: config.release_tag.clone(),
        })
    }

    /// The release carrying our tag, or `None` when it does not exist yet
    pub async fn find_release(&self) -> Result<Option<ReleaseInfo>, GitHubError> {
        let route = format!(
            "/repos/{}/{}/releases/tags/{}",
            self.owner, self.repo, self.tag
        );
        match self.octocrab.get::<ReleaseInfo, _, _>(route, None::<&()>).await {
            Ok(release) => Ok(Some(release)),
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
                debug!(tag = %self.tag, "No release for tag yet");
                Ok(None)
            }
            Err(e) => Err(GitHubError::from(e)),
        }
    }

    pub async fn create_release(&self, window: &ReportWindow) -> Result<ReleaseInfo, GitHubError> {
        let route = format!("/repos/{}/{}/releases", self.owner, self.repo);
        let body = json!({
            "tag_name": self.tag,
            "name": RELEASE_NAME,
            "body": format!(
                "Sentry errors grouped by vendor for {} to {}.",
                window.start_label(),
                window.end_label()
            ),
        });

        let release: ReleaseInfo = self.octocrab.post(route, Some(&body)).await?;
        info!(
            tag = %release.tag_name,
            release_id = release.id,
            "Created report release"
        );
        Ok(release)
    }

    /// Remove every asset currently attached to `release`
    pub async fn delete_assets(&self, release: &ReleaseInfo) -> Result<usize, GitHubError> {
        for asset in &release.assets {
            debug!(asset = %asset.name, asset_id = asset.id, "Deleting prior report asset");
            self.octocrab
                .repos(&self.owner, &self.repo)
                .release_assets()
                .delete(asset.id)
                .await?;
        }
        Ok(release.assets.len())
    }

    pub async fn upload_asset(
        &self,
        release: &ReleaseInfo,
        file: &Path,
    ) -> Result<PublishedAsset, GitHubError> {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("report.csv")
            .to_string();
        let mut url = Url::parse(release.upload_endpoint())
            .map_err(|_| GitHubError::InvalidUploadUrl(release.upload_url.clone()))?;
        url.query_pairs_mut().append_pair("name", &name);

        let bytes = tokio::fs::read(file).await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(CONTENT_TYPE, "text/csv")
            .header(USER_AGENT, "vendor-report")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::UploadRejected {
                asset: name,
                status: status.as_u16(),
                body,
            });
        }

        let asset: AssetInfo = response.json().await?;
        Ok(PublishedAsset {
            name: asset.name,
            download_url: asset.browser_download_url,
            release_url: release.html_url.clone(),
        })
    }

    /// Replace whatever the rolling release holds with `file`
    pub async fn publish_file(
        &self,
        file: &Path,
        window: &ReportWindow,
    ) -> Result<PublishedAsset, GitHubError> {
        let release = match self.find_release().await? {
            Some(release) => {
                let removed = self.delete_assets(&release).await?;
                info!(tag = %release.tag_name, removed, "Cleared prior report assets");
                release
            }
            None => self.create_release(window).await?,
        };

        let asset = self.upload_asset(&release, file).await?;
        info!(
            owner = %self.owner,
            repo = %self.repo,
            asset = %asset.name,
            url = %asset.download_url,
            "Published report asset"
        );
        Ok(asset)
    }
}

#[async_trait]
impl AssetPublisher for ReleasePublisher {
    async fn publish(&self, file: &Path, window: &ReportWindow) -> Result<String, ReportError> {
        Ok(self.publish_file(file, window).await?.download_url)
    }
}
