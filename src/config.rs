use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::report::vendor::{parse_vendor_table, VendorEntry};

/// Optional configuration file read from the working directory
pub const CONFIG_FILE: &str = "vendor-report.toml";

/// Environment variables recognised by the report, mapped to config keys
const ENV_KEYS: &[(&str, &str)] = &[
    ("SENTRY_ORG", "sentry.org"),
    ("SENTRY_PROJECT", "sentry.project"),
    ("SENTRY_TOKEN", "sentry.token"),
    ("SENTRY_QUERY", "sentry.query"),
    ("SENTRY_BASE_URL", "sentry.base_url"),
    ("SENTRY_RELEASE_COUNT", "sentry.release_count"),
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_OWNER", "github.owner"),
    ("GITHUB_REPO", "github.repo"),
    ("GITHUB_API_URL", "github.api_url"),
    ("GITHUB_RELEASE_TAG", "github.release_tag"),
    ("WEBHOOK_URL", "webhook.url"),
    ("REPORT_OUTPUT_DIR", "report.output_dir"),
    ("REPORT_VENDORS", "report.vendors"),
    ("REPORT_SAMPLE_MESSAGES", "report.sample_messages"),
];

/// Sentry's page size ceiling also bounds how many releases we filter on
const MAX_RELEASE_COUNT: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),
}

/// Complete configuration for one report run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    pub sentry: SentryConfig,
    pub github: GitHubConfig,
    pub webhook: WebhookConfig,
    pub report: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentryConfig {
    /// Organization slug
    pub org: String,
    /// Project slug
    pub project: String,
    /// API auth token
    pub token: String,
    /// Base search query every day query starts from
    pub query: String,
    pub base_url: String,
    /// How many of the most recent releases scope the search
    pub release_count: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    /// Tag of the rolling release the report is attached to
    pub release_tag: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub output_dir: String,
    /// Known vendors, `Name` or `Name=needle`, comma separated
    pub vendors: String,
    pub sample_messages: usize,
}

impl ReportConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. `vendor-report.toml` in the working directory
    /// 3. Environment variables (after loading `.env`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_env_file()?;
        Self::load_from(Path::new(CONFIG_FILE), |name| std::env::var(name).ok())
    }

    /// Load configuration from a file path and a variable lookup, then validate it
    pub fn load_from<F>(file: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("sentry.org", "")?
            .set_default("sentry.project", "")?
            .set_default("sentry.token", "")?
            .set_default("sentry.query", "")?
            .set_default("sentry.base_url", "https://sentry.io")?
            .set_default("sentry.release_count", 5)?
            .set_default("github.token", "")?
            .set_default("github.owner", "")?
            .set_default("github.repo", "")?
            .set_default("github.api_url", "https://api.github.com")?
            .set_default("github.release_tag", "vendor-report")?
            .set_default("webhook.url", "")?
            .set_default("report.output_dir", "report")?
            .set_default("report.vendors", "")?
            .set_default("report.sample_messages", 3)?;

        if file.exists() {
            builder = builder.add_source(File::from(file).required(false));
        }

        for (var, key) in ENV_KEYS {
            let value = lookup(var).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        let config: ReportConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<(), ConfigError> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Check every field up front so no network call runs on a bad config
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("SENTRY_ORG", &self.sentry.org),
            ("SENTRY_PROJECT", &self.sentry.project),
            ("SENTRY_TOKEN", &self.sentry.token),
            ("SENTRY_QUERY", &self.sentry.query),
            ("GITHUB_TOKEN", &self.github.token),
            ("GITHUB_OWNER", &self.github.owner),
            ("GITHUB_REPO", &self.github.repo),
            ("WEBHOOK_URL", &self.webhook.url),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        check_url("SENTRY_BASE_URL", &self.sentry.base_url)?;
        check_url("GITHUB_API_URL", &self.github.api_url)?;
        check_url("WEBHOOK_URL", &self.webhook.url)?;

        if self.sentry.release_count == 0 || self.sentry.release_count > MAX_RELEASE_COUNT {
            return Err(ConfigError::Invalid {
                field: "SENTRY_RELEASE_COUNT",
                reason: format!(
                    "must be between 1 and {MAX_RELEASE_COUNT}, got {}",
                    self.sentry.release_count
                ),
            });
        }

        if self.github.release_tag.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "GITHUB_RELEASE_TAG",
                reason: "must not be blank".to_string(),
            });
        }

        self.vendor_table()?;
        Ok(())
    }

    /// Parsed known-vendor table
    pub fn vendor_table(&self) -> Result<Vec<VendorEntry>, ConfigError> {
        parse_vendor_table(&self.report.vendors).map_err(|e| ConfigError::Invalid {
            field: "REPORT_VENDORS",
            reason: e.to_string(),
        })
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("`{value}` is not a valid URL: {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme `{scheme}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("SENTRY_ORG", "acme".to_string()),
            ("SENTRY_PROJECT", "storefront".to_string()),
            ("SENTRY_TOKEN", "sntrys_token".to_string()),
            ("SENTRY_QUERY", "is:unresolved".to_string()),
            ("GITHUB_TOKEN", "ghp_token".to_string()),
            ("GITHUB_OWNER", "acme".to_string()),
            ("GITHUB_REPO", "reports".to_string()),
            ("WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<ReportConfig, ConfigError> {
        ReportConfig::load_from(Path::new("does-not-exist.toml"), |name| {
            env.get(name).cloned()
        })
    }

    #[test]
    fn test_defaults_fill_optional_values() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.sentry.base_url, "https://sentry.io");
        assert_eq!(config.sentry.release_count, 5);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.release_tag, "vendor-report");
        assert_eq!(config.report.output_dir, "report");
        assert_eq!(config.report.sample_messages, 3);
        assert!(config.vendor_table().unwrap().is_empty());
    }

    #[test]
    fn test_missing_values_are_all_reported() {
        let mut env = full_env();
        env.remove("SENTRY_TOKEN");
        env.remove("WEBHOOK_URL");
        env.insert("GITHUB_REPO", "   ".to_string());

        match load(&env) {
            Err(ConfigError::Missing(names)) => {
                assert_eq!(names, vec!["SENTRY_TOKEN", "GITHUB_REPO", "WEBHOOK_URL"]);
            }
            other => panic!("expected missing error, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_overrides_parse_from_strings() {
        let mut env = full_env();
        env.insert("SENTRY_RELEASE_COUNT", "12".to_string());
        env.insert("REPORT_SAMPLE_MESSAGES", "7".to_string());

        let config = load(&env).unwrap();
        assert_eq!(config.sentry.release_count, 12);
        assert_eq!(config.report.sample_messages, 7);
    }

    #[test]
    fn test_release_count_bounds() {
        let mut env = full_env();
        env.insert("SENTRY_RELEASE_COUNT", "0".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { field: "SENTRY_RELEASE_COUNT", .. })
        ));
    }

    #[test]
    fn test_webhook_url_must_be_http() {
        let mut env = full_env();
        env.insert("WEBHOOK_URL", "ftp://example.com/hook".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { field: "WEBHOOK_URL", .. })
        ));

        env.insert("WEBHOOK_URL", "not a url".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { field: "WEBHOOK_URL", .. })
        ));
    }

    #[test]
    fn test_bad_vendor_table_fails_validation() {
        let mut env = full_env();
        env.insert("REPORT_VENDORS", "Amazon,=shopify".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { field: "REPORT_VENDORS", .. })
        ));
    }

    #[test]
    fn test_file_values_are_overridden_by_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendor-report.toml");
        std::fs::write(
            &path,
            "[sentry]\norg = \"from-file\"\nrelease_count = 9\n\n[report]\nvendors = \"Amazon,Shopify=myshopify\"\n",
        )
        .unwrap();

        let mut env = full_env();
        env.remove("SENTRY_ORG");
        let config = ReportConfig::load_from(&path, |name| env.get(name).cloned()).unwrap();
        assert_eq!(config.sentry.org, "from-file");
        assert_eq!(config.sentry.release_count, 9);
        assert_eq!(config.vendor_table().unwrap().len(), 2);

        env.insert("SENTRY_ORG", "from-env".to_string());
        let config = ReportConfig::load_from(&path, |name| env.get(name).cloned()).unwrap();
        assert_eq!(config.sentry.org, "from-env");
    }
}
