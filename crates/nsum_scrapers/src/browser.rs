//! Scoped headless Chromium sessions.
//!
//! Every session is its own browser process with its own profile
//! directory. [`with_session`] is the only way the rest of the crate
//! drives a browser: it launches, hands a page to the caller, and tears
//! the process down again whether the caller succeeded, failed or
//! panicked.

use async_trait::async_trait;
use chromiumoxide::auth::Credentials;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use nsum_core::{Error, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::fetch::PageFetcher;
use crate::proxy::ProxyConfig;

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub chrome_bin: Option<PathBuf>,
    pub proxy: Option<ProxyConfig>,
    pub no_sandbox: bool,
    pub request_timeout: Duration,
    pub window_size: (u32, u32),
    pub user_agent: String,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_bin: None,
            proxy: None,
            no_sandbox: false,
            request_timeout: Duration::from_secs(60),
            window_size: (1920, 1080),
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

impl BrowserOptions {
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-extensions".to_string(),
            "--no-first-run".to_string(),
            format!("--user-agent={}", self.user_agent),
        ];
        if self.no_sandbox {
            args.push("--no-sandbox".to_string());
        }
        if let Some(proxy) = &self.proxy {
            args.push(proxy.chrome_arg());
        }
        args
    }

    fn to_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .window_size(self.window_size.0, self.window_size.1)
            .request_timeout(self.request_timeout)
            .args(self.launch_args());
        if let Some(bin) = &self.chrome_bin {
            builder = builder.chrome_executable(bin);
        }
        builder
            .build()
            .map_err(|e| Error::Browser(format!("Invalid browser config: {}", e)))
    }
}

/// Something that hands out one page and must be released afterwards.
#[async_trait]
pub trait ScopedResource: Send + Sync + Sized {
    type Page: Send;

    async fn open_page(&self) -> Result<Self::Page>;

    /// Tears the resource down. Failures are logged, never returned.
    async fn release(self);
}

/// Opens a page on `resource`, runs `f` on it, and releases the resource
/// on every path: page failure, `f` failure and success alike.
pub async fn scoped<R, T, F, Fut>(resource: R, f: F) -> Result<T>
where
    R: ScopedResource,
    F: FnOnce(R::Page) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let result = match resource.open_page().await {
        Ok(page) => f(page).await,
        Err(e) => Err(e),
    };
    resource.release().await;
    result
}

/// Per-session Chrome profile directory, removed when dropped.
#[derive(Debug)]
pub struct ProfileDir(PathBuf);

impl ProfileDir {
    fn next() -> Self {
        let id = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(std::env::temp_dir().join(format!("nsum-browser-{}-{}", std::process::id(), id)))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.0) {
                debug!(error = %e, profile = %self.0.display(), "Profile cleanup skipped");
            }
        }
    }
}

/// One running browser process and its event loop.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    credentials: Option<Credentials>,
    // Declared after `browser` so the child process is gone before the
    // directory is removed.
    profile_dir: ProfileDir,
}

impl BrowserSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let profile_dir = ProfileDir::next();
        let config = options.to_config(profile_dir.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let credentials = options
            .proxy
            .as_ref()
            .and_then(|p| p.credentials())
            .map(|(username, password)| Credentials {
                username: username.to_string(),
                password: password.to_string(),
            });

        debug!(profile = %profile_dir.path().display(), "Browser session launched");
        Ok(Self {
            browser,
            handler,
            credentials,
            profile_dir,
        })
    }

    pub async fn new_page(&self) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::Browser(format!("Failed to create page: {}", e)))?;
        if let Some(credentials) = &self.credentials {
            page.authenticate(credentials.clone())
                .await
                .map_err(|e| Error::Browser(format!("Proxy authentication failed: {}", e)))?;
        }
        Ok(page)
    }

    /// Shuts the browser down. Failures are logged, never returned.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Waiting for browser exit failed");
        }
        self.handler.abort();
        if let Err(e) = tokio::fs::remove_dir_all(self.profile_dir.path()).await {
            debug!(error = %e, profile = %self.profile_dir.path().display(), "Profile cleanup skipped");
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Reached without close() only on panic or cancellation. Dropping
        // the Browser kills the child process, then ProfileDir removes the
        // profile.
        self.handler.abort();
    }
}

#[async_trait]
impl ScopedResource for BrowserSession {
    type Page = Page;

    async fn open_page(&self) -> Result<Page> {
        self.new_page().await
    }

    async fn release(self) {
        self.close().await
    }
}

/// Runs `f` against a fresh page of a fresh browser, then closes it.
pub async fn with_session<T, F, Fut>(options: &BrowserOptions, f: F) -> Result<T>
where
    F: FnOnce(Page) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let session = BrowserSession::launch(options).await?;
    scoped(session, f).await
}

pub async fn goto(page: &Page, url: &str, limit: Duration) -> Result<()> {
    match timeout(limit, page.goto(url)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(Error::Browser(format!("Failed to navigate to {}: {}", url, e))),
        Err(_) => Err(Error::Timeout(format!("navigation to {} exceeded {:?}", url, limit))),
    }
}

/// Calls `check` every poll interval until it yields a value or `limit`
/// passes. `check` always runs at least once.
pub async fn poll_until<T, F, Fut>(limit: Duration, what: &str, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + limit;
    loop {
        if let Some(value) = check().await {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout(format!("{} within {:?}", what, limit)));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Polls until the first element matching `selector` has a non-empty box.
pub async fn wait_for_visible(page: &Page, selector: &str, limit: Duration) -> Result<Element> {
    let quoted = serde_json::to_string(selector)?;
    let probe = format!(
        "(() => {{ const el = document.querySelector({}); if (!el) return false; const r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }})()",
        quoted
    );
    let what = format!("no visible '{}' element", selector);

    poll_until(limit, &what, || {
        let probe = probe.clone();
        async move {
            let visible = match page.evaluate(probe).await {
                Ok(result) => result.into_value::<bool>().unwrap_or(false),
                Err(_) => false,
            };
            if !visible {
                return None;
            }
            page.find_element(selector).await.ok()
        }
    })
    .await
}

pub async fn attribute(element: &Element, name: &str) -> Option<String> {
    element
        .attribute(name)
        .await
        .ok()
        .flatten()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fetches the fully rendered HTML of a page through a browser session.
#[derive(Debug, Clone)]
pub struct RenderedFetcher {
    options: BrowserOptions,
    navigation_timeout: Duration,
}

impl RenderedFetcher {
    pub fn new(options: BrowserOptions, navigation_timeout: Duration) -> Self {
        Self {
            options,
            navigation_timeout,
        }
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let limit = self.navigation_timeout;
        with_session(&self.options, |page| async move {
            goto(&page, url, limit).await?;
            page.content()
                .await
                .map_err(|e| Error::Browser(format!("Failed to read page content: {}", e)))
        })
        .await
    }
}
