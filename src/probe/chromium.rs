//! Chromium-backed search sessions
//!
//! Each session owns its own browser process. The CDP handler loop runs on
//! a spawned task for the session's lifetime and is aborted on close.

use crate::cli::config::ProbeConfig;
use crate::errors::ProbeFailure;
use crate::probe::session::{SearchSession, SessionLauncher};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long the browser gets to come up
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Per-command CDP timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Well-known install locations, checked in order
const CHROME_CANDIDATES: [&str; 8] = [
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    "/snap/chromium/stable/usr/lib/chromium-browser/chrome",
];

#[cfg(target_os = "linux")]
fn is_executable_binary(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let Ok(real_path) = fs::canonicalize(path) else {
        return false;
    };
    let Ok(meta) = real_path.metadata() else {
        return false;
    };
    if !meta.is_file() || meta.permissions().mode() & 0o111 == 0 {
        return false;
    }

    let Ok(mut f) = fs::File::open(&real_path) else {
        return false;
    };
    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_err() {
        return false;
    }

    // Wrapper scripts (e.g. snap shims) are fine too
    magic == [0x7f, b'E', b'L', b'F'] || magic[..2] == *b"#!"
}

#[cfg(not(target_os = "linux"))]
fn is_executable_binary(path: &Path) -> bool {
    path.exists()
}

/// Resolve the browser binary: explicit path first, then known locations
pub fn find_chrome_binary(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return is_executable_binary(p).then(|| p.to_path_buf());
    }

    CHROME_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| is_executable_binary(p))
}

/// Command-line flags passed to the browser
pub fn launch_args(config: &ProbeConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-infobars".to_string(),
        "--window-size=1366,768".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    if config.no_sandbox {
        args.push("--no-sandbox".to_string());
        args.push("--disable-setuid-sandbox".to_string());
    }
    if let Some(ua) = config.user_agent.as_deref().filter(|ua| !ua.trim().is_empty()) {
        args.push(format!("--user-agent={}", ua));
    }
    args
}

/// Starts one Chromium process per session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    args: Vec<String>,
    headless: bool,
}

impl ChromiumLauncher {
    pub fn from_config(config: &ProbeConfig) -> Self {
        let executable = find_chrome_binary(config.chrome_binary.as_deref());
        match &executable {
            Some(p) => info!(path = %p.display(), "resolved chrome binary"),
            None => warn!("no chrome binary found, relying on chromiumoxide detection"),
        }

        Self {
            executable,
            args: launch_args(config),
            headless: config.headless,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, ProbeFailure> {
        let mut builder = BrowserConfig::builder()
            .launch_timeout(LAUNCH_TIMEOUT)
            .request_timeout(REQUEST_TIMEOUT)
            .args(self.args.clone());

        if let Some(bin) = &self.executable {
            builder = builder.chrome_executable(bin);
        }
        if !self.headless {
            builder = builder.with_head();
        }

        builder.build().map_err(ProbeFailure::Launch)
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn SearchSession>, ProbeFailure> {
        let config = self.browser_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ProbeFailure::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("chromium event loop exited");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(browser, handler_task).await;
                return Err(ProbeFailure::Driver(format!("Failed to create page: {}", e)));
            }
        };

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
        }))
    }
}

async fn shutdown(mut browser: Browser, handler_task: JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        debug!(error = %e, "browser close command failed");
    }
    if let Err(e) = browser.wait().await {
        debug!(error = %e, "waiting for browser exit failed");
    }
    handler_task.abort();
}

/// CSS selector for an input by `name` attribute
fn input_selector(name: &str) -> String {
    format!("input[name=\"{}\"]", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// One browser process with a single page
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl SearchSession for ChromiumSession {
    async fn open(&mut self, url: &str) -> Result<(), ProbeFailure> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeFailure::Navigation {
                url: url.to_string(),
                details: e.to_string(),
            })?;
        Ok(())
    }

    async fn has_input(&mut self, name: &str) -> Result<bool, ProbeFailure> {
        Ok(self.page.find_element(input_selector(name)).await.is_ok())
    }

    async fn type_into(&mut self, name: &str, text: &str) -> Result<(), ProbeFailure> {
        let selector = input_selector(name);
        let element = self
            .page
            .find_element(selector.as_str())
            .await
            .map_err(|e| ProbeFailure::Element {
                selector: selector.clone(),
                details: e.to_string(),
            })?;

        element
            .focus()
            .await
            .map_err(|e| ProbeFailure::Element {
                selector: selector.clone(),
                details: format!("focus failed: {}", e),
            })?
            .type_str(text)
            .await
            .map_err(|e| ProbeFailure::Element {
                selector,
                details: format!("typing failed: {}", e),
            })?;
        Ok(())
    }

    async fn click(&mut self, element_id: &str) -> Result<(), ProbeFailure> {
        let id_json = serde_json::to_string(element_id)
            .map_err(|e| ProbeFailure::Driver(format!("Id encode failed: {}", e)))?;
        let script = format!(
            r#"(() => {{
                const el = document.getElementById({id_json});
                if (!el) return false;
                el.click();
                return true;
            }})()"#
        );

        let clicked: bool = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ProbeFailure::Driver(format!("Click script failed: {}", e)))?
            .into_value()
            .map_err(|e| ProbeFailure::Driver(format!("Click result unreadable: {}", e)))?;

        if !clicked {
            return Err(ProbeFailure::Element {
                selector: format!("#{}", element_id),
                details: "not found".to_string(),
            });
        }
        Ok(())
    }

    async fn content(&mut self) -> Result<String, ProbeFailure> {
        self.page
            .content()
            .await
            .map_err(|e| ProbeFailure::Driver(format!("Failed to read page: {}", e)))
    }

    async fn close(self: Box<Self>) {
        let ChromiumSession {
            browser,
            page,
            handler_task,
        } = *self;
        drop(page);
        shutdown(browser, handler_task).await;
    }
}
