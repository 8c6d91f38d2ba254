//! BrowserManager: Chrome discovery, launch, connection and the current page.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::{CdpClient, PageProfile, PageSession};
use crate::driver::{BrowserBackend, PageDriver};

const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(200);
const STARTUP_POLL_ATTEMPTS: u32 = 30;

/// A started browser: connection, current page and the process we spawned.
struct BrowserState {
    client: CdpClient,
    page: Arc<PageSession>,
    chrome: Option<Child>,
}

/// Manages the browser process and its single active page.
pub struct BrowserManager {
    config: BrowserManagerConfig,
    state: Mutex<Option<BrowserState>>,
}

impl BrowserManager {
    /// Create a manager. Nothing is launched until a page is requested.
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(None),
        }
    }

    /// Whether a browser connection is currently held.
    pub async fn is_started(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Find Chrome executable path.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths: &[&str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths: &[&str] = &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: &[&str] = &[];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Command-line flags for a Chrome we launch ourselves.
    pub(super) fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.config.debug_port),
            format!("--user-data-dir={}", self.config.resolved_profile_dir().display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "--disable-file-system".to_string(),
            format!(
                "--window-size={},{}",
                self.config.viewport_width, self.config.viewport_height
            ),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        args
    }

    pub(super) fn page_profile(&self) -> PageProfile {
        PageProfile {
            viewport_width: self.config.viewport_width,
            viewport_height: self.config.viewport_height,
            ..PageProfile::default()
        }
    }

    /// Check if Chrome is already running on the debug port.
    async fn is_chrome_running(&self) -> bool {
        reqwest::get(&format!("{}/json/version", self.config.devtools_url()))
            .await
            .is_ok()
    }

    /// Launch Chrome with remote debugging enabled.
    async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = match &self.config.chrome_path {
            Some(path) => path.clone(),
            None => Self::find_chrome().ok_or(BrowserError::ChromeNotFound)?,
        };
        let profile_dir = self.config.resolved_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let child = Command::new(&chrome_path)
            .args(self.launch_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Launch (or attach to) Chrome and open the first page.
    async fn start(&self) -> Result<BrowserState, BrowserError> {
        let mut chrome = None;

        if !self.is_chrome_running().await {
            info!("Chrome not running on port {}, launching...", self.config.debug_port);
            let mut child = self.launch_chrome().await?;

            let mut ready = false;
            for _ in 0..STARTUP_POLL_ATTEMPTS {
                tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
                if self.is_chrome_running().await {
                    ready = true;
                    break;
                }
            }

            if !ready {
                let _ = child.kill().await;
                return Err(BrowserError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
            chrome = Some(child);
        } else {
            info!("Chrome already running on port {}", self.config.debug_port);
        }

        let client = CdpClient::connect(&self.config.devtools_url()).await?;
        let page = self.new_configured_page(&client).await?;

        info!("Connected to Chrome at {}", self.config.devtools_url());
        Ok(BrowserState {
            client,
            page,
            chrome,
        })
    }

    /// Open a tab and apply the page profile. Profile failures are not fatal.
    async fn new_configured_page(&self, client: &CdpClient) -> Result<Arc<PageSession>, BrowserError> {
        let page = client.new_page().await?;
        if let Err(e) = page.apply_profile(&self.page_profile()).await {
            warn!("Failed to apply page profile: {}", e);
        }
        Ok(Arc::new(page))
    }
}

#[async_trait]
impl BrowserBackend for BrowserManager {
    async fn current_page(&self) -> Result<Arc<dyn PageDriver>, BrowserError> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            *state = Some(self.start().await?);
        }
        match state.as_ref() {
            Some(s) => Ok(s.page.clone() as Arc<dyn PageDriver>),
            None => Err(BrowserError::NotConnected),
        }
    }

    async fn open_new_page(&self) -> Result<Arc<dyn PageDriver>, BrowserError> {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            let started = self.start().await?;
            let page = started.page.clone();
            *guard = Some(started);
            return Ok(page as Arc<dyn PageDriver>);
        }
        let Some(state) = guard.as_mut() else {
            return Err(BrowserError::NotConnected);
        };

        let page = self.new_configured_page(&state.client).await?;
        let old = std::mem::replace(&mut state.page, page.clone());
        if let Err(e) = state.client.close_page(&old).await {
            debug!("Failed to close previous page: {}", e);
        }

        debug!("Opened new page {}", page.target_id());
        Ok(page as Arc<dyn PageDriver>)
    }

    async fn shutdown(&self) -> Result<(), BrowserError> {
        let Some(mut state) = self.state.lock().await.take() else {
            return Ok(());
        };

        match state.chrome.take() {
            Some(mut child) => {
                info!("Shutting down Chrome...");
                let _ = child.kill().await;
            }
            None => {
                // Attached to a browser we did not launch: leave it running, close our tab.
                if let Err(e) = state.client.close_page(&state.page).await {
                    debug!("Failed to close page on shutdown: {}", e);
                }
            }
        }

        info!("Browser connection closed");
        Ok(())
    }
}
