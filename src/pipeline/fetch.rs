//! Article page capture.
//!
//! Requests are spaced by a random delay so the crawl does not hit the site
//! at a fixed rhythm. Each fetch is independent: the caller logs a failure and
//! moves on to the next record.

use crate::config::DelayWindow;
use crate::error::RenderError;
use crate::models::NewsRecord;
use crate::renderer::PageRenderer;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub delay: DelayWindow,
    pub content_class: String,
    pub timeout: Duration,
}

/// Uniform pick in `[min, max)`; a degenerate window yields `min`.
pub fn pick_delay(window: DelayWindow) -> Duration {
    let ms = if window.max > window.min {
        rng().random_range(window.min..window.max)
    } else {
        window.min
    };
    Duration::from_millis(ms)
}

/// Wait, open the record's page and return the outer markup of its content container.
#[instrument(level = "info", skip_all, fields(url = %record.url))]
pub async fn fetch_content<R: PageRenderer>(
    renderer: &mut R,
    record: &NewsRecord,
    policy: &FetchPolicy,
) -> Result<String, RenderError> {
    let delay = pick_delay(policy.delay);
    if !delay.is_zero() {
        info!(delay_ms = delay.as_millis() as u64, "Waiting before opening page");
        sleep(delay).await;
    }

    renderer.navigate(&record.url).await?;
    let container = renderer
        .wait_for_visible(&policy.content_class, policy.timeout)
        .await?;
    let markup = container.outer_markup().to_string();
    debug!(
        bytes = markup.len(),
        preview = %truncate_for_log(&markup, 120),
        "Captured article content"
    );
    Ok(markup)
}
