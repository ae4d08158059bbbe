//! Headless-browser rendering capability for JavaScript-heavy menu pages.
//!
//! Uses chromiumoxide (CDP). Non-essential resource types (images, styles,
//! fonts) are blocked to reduce render cost; the page is scrolled to the
//! bottom after load to trigger lazy-loaded content.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig as CdpBrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

/// Errors from the rendering capability.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser unavailable: {0}")]
    Unavailable(String),

    #[error("render failed: {0}")]
    Browser(String),

    #[error("render timed out after {0}s")]
    Timeout(u64),
}

/// Headless rendering capability: load a URL and return the rendered DOM.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Browser engine configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run without a visible window.
    pub headless: bool,
    /// Seconds to wait for the page to reach a ready/idle state.
    pub idle_timeout_secs: u64,
    /// Extra Chrome arguments.
    pub chrome_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            idle_timeout_secs: 10,
            chrome_args: Vec::new(),
        }
    }
}

/// URL patterns blocked during rendering. Menu text does not need them.
#[cfg(feature = "browser")]
const BLOCKED_RESOURCE_PATTERNS: &[&str] = &[
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.css", "*.woff", "*.woff2",
    "*.ttf", "*.otf",
];

/// JavaScript to wait for page ready state.
#[cfg(feature = "browser")]
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

#[cfg(feature = "browser")]
const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Browser-based renderer.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    config: BrowserConfig,
    browser: Mutex<Option<Browser>>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    /// Create a new browser renderer. The browser is launched lazily on the
    /// first render.
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            browser: Mutex::new(None),
        }
    }

    /// Find a Chrome executable.
    fn find_chrome() -> Result<std::path::PathBuf, RenderError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(RenderError::Unavailable(
            "Chrome/Chromium not found in common paths or PATH".to_string(),
        ))
    }

    async fn launch(&self) -> Result<Browser, RenderError> {
        info!("Launching browser (headless={})", self.config.headless);
        let chrome_path = Self::find_chrome()?;

        let mut builder = CdpBrowserConfig::builder().chrome_executable(chrome_path);
        if !self.config.headless {
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox")
            .arg("--disable-gpu");
        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| RenderError::Unavailable(format!("bad browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Unavailable(format!("failed to launch browser: {}", e)))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Wait for the page to reach a ready state, bounded by the idle timeout.
    async fn wait_for_page_ready(&self, page: &Page) -> Result<(), RenderError> {
        let timeout = Duration::from_secs(self.config.idle_timeout_secs);
        match tokio::time::timeout(timeout, page.evaluate(WAIT_FOR_READY_SCRIPT.to_string())).await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
                Ok(())
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
                Ok(())
            }
            Err(_) => Err(RenderError::Timeout(self.config.idle_timeout_secs)),
        }
    }

    async fn render_inner(&self, page: &Page, url: &str) -> Result<String, RenderError> {
        let patterns = BLOCKED_RESOURCE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        if let Err(e) = page.execute(SetBlockedUrLsParams::new(patterns)).await {
            debug!("Could not set blocked URL patterns: {}", e);
        }

        let nav_timeout = Duration::from_secs(self.config.idle_timeout_secs);
        tokio::time::timeout(nav_timeout, page.goto(url))
            .await
            .map_err(|_| RenderError::Timeout(self.config.idle_timeout_secs))?
            .map_err(|e| RenderError::Browser(format!("navigation failed: {}", e)))?;

        self.wait_for_page_ready(page).await?;

        // Trigger lazy-loaded content.
        if let Err(e) = page.evaluate(SCROLL_TO_BOTTOM_SCRIPT.to_string()).await {
            debug!("Scroll script failed: {}", e);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        page.content()
            .await
            .map_err(|e| RenderError::Browser(format!("could not read page content: {}", e)))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl Renderer for BrowserFetcher {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }
        let browser = guard.as_ref().expect("browser initialized above");

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Browser(format!("could not open page: {}", e)))?;

        let result = self.render_inner(&page, url).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        result
    }
}

// Stub for when browser feature is disabled.
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    #[allow(dead_code)]
    config: BrowserConfig,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl Renderer for BrowserFetcher {
    async fn render(&self, _url: &str) -> Result<String, RenderError> {
        Err(RenderError::Unavailable(
            "Browser support not compiled. Rebuild with: cargo build --features browser".to_string(),
        ))
    }
}
