//! Scraper configuration loaded from a YAML file.
//!
//! Every key has a default, so a missing file yields a usable configuration
//! aimed at the MID announcement page. CLI flags override a few paths after
//! loading (see [`crate::cli`]).
//!
//! ```yaml
//! main_page: https://mid.ru/ru/foreign_policy/news/
//! page_content_class: page-content
//! announce_item_class: announce__item
//! incognito: true
//! random_delay: { min: 3000, max: 9000 }
//! cron:
//!   evening: "0 21 * * *"
//!   daily: "0 9 * * *"
//!   hourly: "0 * * * *"
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// URL of the announcement list.
    pub main_page: String,
    /// Class of the content container, on the list page and on article pages.
    pub page_content_class: String,
    /// Class of a single announcement inside the content container.
    pub announce_item_class: String,
    /// Keep no cookies between page loads.
    pub incognito: bool,
    pub random_delay: DelayWindow,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub base_dir: PathBuf,
    pub global_index_name: String,
    pub database: PathBuf,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub user_agent: String,
    pub cron: Schedules,
}

/// Inter-fetch delay window in milliseconds, `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DelayWindow {
    pub min: u64,
    pub max: u64,
}

/// The three schedule expressions. Each one triggers the same pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Schedules {
    pub evening: Option<String>,
    pub daily: Option<String>,
    pub hourly: Option<String>,
}

impl Default for Schedules {
    fn default() -> Self {
        Self {
            evening: Some("0 21 * * *".to_string()),
            daily: Some("0 9 * * *".to_string()),
            hourly: Some("0 * * * *".to_string()),
        }
    }
}

impl Schedules {
    /// Configured expressions tagged with their name, in evening/daily/hourly order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("evening", self.evening.as_deref()),
            ("daily", self.daily.as_deref()),
            ("hourly", self.hourly.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, expr)| expr.map(|e| (name, e.trim())))
        .filter(|(_, expr)| !expr.is_empty())
        .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_page: "https://mid.ru/ru/foreign_policy/news/".to_string(),
            page_content_class: "page-content".to_string(),
            announce_item_class: "announce__item".to_string(),
            incognito: true,
            random_delay: DelayWindow { min: 3000, max: 9000 },
            wait_timeout_secs: 10,
            poll_interval_ms: 500,
            base_dir: PathBuf::from("mid-news"),
            global_index_name: "mid_news_index.html".to_string(),
            database: PathBuf::from("mid-news.sqlite"),
            browserless_url: None,
            browserless_token: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/89.0.4389.82 Safari/537.36"
                .to_string(),
            cron: Schedules::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is absent.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let settings = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let parsed: Settings = serde_yaml::from_str(&raw)?;
            info!("Loaded configuration");
            parsed
        } else {
            warn!("Config file not found; using defaults");
            Settings::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.main_page.trim().is_empty() {
            return Err("main_page must not be empty".to_string());
        }
        if self.page_content_class.trim().is_empty() || self.announce_item_class.trim().is_empty()
        {
            return Err("page_content_class and announce_item_class must not be empty".to_string());
        }
        if self.random_delay.min > self.random_delay.max {
            return Err(format!(
                "random_delay.min ({}) exceeds random_delay.max ({})",
                self.random_delay.min, self.random_delay.max
            ));
        }
        if self.wait_timeout_secs == 0 {
            return Err("wait_timeout_secs must be positive".to_string());
        }
        if self.global_index_name.contains('/') || self.global_index_name.is_empty() {
            return Err("global_index_name must be a plain file name".to_string());
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
