//! HTTP-backed page renderer.
//!
//! Pages are fetched with `reqwest`, either directly or through a Browserless
//! `/content` endpoint when JavaScript rendering is needed. An element counts
//! as visible once it is present in the fetched document; while it is absent
//! the page is re-fetched every poll interval until the wait times out.

use super::{Element, PageRenderer, first_by_class};
use crate::config::Settings;
use crate::error::RenderError;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug)]
enum Backend {
    Direct,
    Browserless { endpoint: String },
}

#[derive(Debug)]
struct Page {
    url: Url,
    html: String,
}

#[derive(Debug)]
pub struct HttpRenderer {
    client: reqwest::Client,
    backend: Backend,
    poll_interval: Duration,
    current: Option<Page>,
}

impl HttpRenderer {
    /// Build a session from settings. With `incognito` the client keeps no cookies.
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .cookie_store(!settings.incognito)
            .timeout(settings.wait_timeout())
            .build()?;

        let backend = match settings.browserless_url.as_deref() {
            Some(base) => {
                let mut endpoint = format!("{}/content", base.trim_end_matches('/'));
                if let Some(token) = settings.browserless_token.as_deref() {
                    endpoint.push_str(&format!("?token={token}"));
                }
                Backend::Browserless { endpoint }
            }
            None => Backend::Direct,
        };

        info!(
            incognito = settings.incognito,
            browserless = matches!(backend, Backend::Browserless { .. }),
            "Renderer session opened"
        );
        Ok(Self {
            client,
            backend,
            poll_interval: settings.poll_interval(),
            current: None,
        })
    }

    async fn fetch(&self, url: &Url) -> Result<String, RenderError> {
        let navigation = |e: reqwest::Error| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        let request = match &self.backend {
            Backend::Direct => self.client.get(url.as_str()),
            Backend::Browserless { endpoint } => self
                .client
                .post(endpoint)
                .json(&serde_json::json!({ "url": url.as_str() })),
        };

        let resp = request.send().await.map_err(navigation)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RenderError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().await.map_err(navigation)?;
        debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    async fn poll_until_present(&mut self, class: &str) -> Result<Element, RenderError> {
        loop {
            let page = self.current.as_ref().ok_or(RenderError::NoPage)?;
            if let Some(element) = first_by_class(&page.html, &page.url, class) {
                return Ok(element);
            }
            let url = page.url.clone();
            debug!(%url, %class, "Element not present yet; re-fetching");
            sleep(self.poll_interval).await;
            let html = self.fetch(&url).await?;
            self.current = Some(Page { url, html });
        }
    }
}

impl PageRenderer for HttpRenderer {
    #[instrument(level = "info", skip(self))]
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let parsed = Url::parse(url).map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.current = None;
        let html = self.fetch(&parsed).await?;
        self.current = Some(Page { url: parsed, html });
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn wait_for_visible(
        &mut self,
        class: &str,
        wait: Duration,
    ) -> Result<Element, RenderError> {
        let t0 = Instant::now();
        match timeout(wait, self.poll_until_present(class)).await {
            Ok(found) => {
                if found.is_ok() {
                    debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Element visible");
                }
                found
            }
            Err(_) => {
                warn!(%class, secs = wait.as_secs(), "Timed out waiting for element");
                Err(RenderError::Timeout {
                    selector: class.to_string(),
                    secs: wait.as_secs(),
                })
            }
        }
    }

    async fn close(&mut self) {
        self.current = None;
        info!("Renderer session closed");
    }
}
