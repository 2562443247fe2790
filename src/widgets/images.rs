// Image fallback.
// Probes placeholder-flagged images and reports the ones that cannot be loaded.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::Client;

use crate::error::{FolioError, Result};
use crate::fetch::with_timeout;
use crate::render::format::encode_uri_component;

use super::toast::{Notifier, ToastLevel};

/// Attribute that opts an image into the fallback.
pub const PLACEHOLDER_ATTR: &str = "data-placeholder";
/// Class added to an image once it shows the placeholder.
pub const PLACEHOLDER_CLASS: &str = "image-placeholder";

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="480"><rect width="100%" height="100%" fill="#f2f4f8"/><text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" fill="#6c7a89" font-family="Arial" font-size="20">Image unavailable</text></svg>"##;

/// Data URI of the generated placeholder image.
pub fn placeholder_uri() -> String {
    format!(
        "data:image/svg+xml;charset=UTF-8,{}",
        encode_uri_component(PLACEHOLDER_SVG)
    )
}

/// Checks whether image sources can be loaded.
#[derive(Debug, Clone)]
pub struct ImageProbe {
    client: Client,
    base_dir: PathBuf,
    timeout: Duration,
}

impl ImageProbe {
    /// Relative sources resolve against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("repofolio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_dir: base_dir.into(),
            timeout,
        })
    }

    pub async fn is_available(&self, src: &str) -> bool {
        let src = src.trim();
        if src.is_empty() {
            return false;
        }
        if src.starts_with("data:") {
            return true;
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            return self.probe_remote(src).await;
        }

        let path = src.split(['?', '#']).next().unwrap_or(src);
        let path = percent_decode_str(path)
            .decode_utf8()
            .unwrap_or(Cow::Borrowed(path));
        tokio::fs::metadata(self.base_dir.join(path.trim_start_matches('/')))
            .await
            .is_ok_and(|meta| meta.is_file())
    }

    async fn probe_remote(&self, url: &str) -> bool {
        let request = async { self.client.head(url).send().await.map_err(FolioError::from) };
        match with_timeout(self.timeout, request).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Image probe for {} failed: {}", url, e);
                false
            }
        }
    }

    /// Sources among `sources` that cannot be loaded, with one warning per failure.
    pub async fn broken(&self, sources: &[String], notifier: &dyn Notifier) -> Vec<String> {
        let mut broken = Vec::new();
        for src in sources {
            if self.is_available(src).await {
                continue;
            }
            tracing::warn!("Image unavailable: {}", src);
            notifier.notify(&format!("Could not load: {}", src), ToastLevel::Warn);
            broken.push(src.clone());
        }
        broken
    }
}
