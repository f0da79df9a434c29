pub mod errors;
pub mod releases;
pub mod types;

pub use errors::GitHubError;
pub use releases::ReleasePublisher;
pub use types::{AssetInfo, PublishedAsset, ReleaseInfo};
