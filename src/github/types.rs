use serde::Deserialize;

/// The parts of a GitHub release the publisher needs
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub id: u64,
    pub tag_name: String,
    /// Hypermedia template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    pub upload_url: String,
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<AssetInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetInfo {
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
}

/// Where the published report can be downloaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAsset {
    pub name: String,
    pub download_url: String,
    pub release_url: String,
}

impl ReleaseInfo {
    /// Upload endpoint with the `{?name,label}` template suffix stripped
    pub fn upload_endpoint(&self) -> &str {
        self.upload_url
            .split_once('{')
            .map(|(base, _)| base)
            .unwrap_or(&self.upload_url)
    }
}
