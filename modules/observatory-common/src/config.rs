use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "https://nocodb.openup.org.za/api/v1/db/data/v1/AORAI";
pub const DEFAULT_PAGE_SIZE: u32 = 150;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Data API
    pub api_url: String,
    pub api_token: String,
    pub page_size: u32,
    pub timeout: Duration,

    // Static reference data (boundaries, tracked countries, centroids)
    pub reference_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url =
            std::env::var("OBSERVATORY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        url::Url::parse(&api_url)
            .with_context(|| format!("OBSERVATORY_API_URL is not a valid URL: {api_url}"))?;

        let config = Self {
            api_url,
            api_token: std::env::var("OBSERVATORY_API_TOKEN")
                .context("OBSERVATORY_API_TOKEN environment variable is required")?,
            page_size: std::env::var("OBSERVATORY_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            timeout: Duration::from_secs(
                std::env::var("OBSERVATORY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            reference_dir: std::env::var("OBSERVATORY_REFERENCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(4);
            match val.get(..n) {
                Some(head) if !val.is_empty() => format!("{head}..."),
                _ => "(empty)".to_string(),
            }
        }

        tracing::info!(
            api_url = self.api_url.as_str(),
            api_token = preview(&self.api_token).as_str(),
            page_size = self.page_size,
            timeout_secs = self.timeout.as_secs(),
            reference_dir = %self.reference_dir.display(),
            "Loaded configuration"
        );
    }
}
