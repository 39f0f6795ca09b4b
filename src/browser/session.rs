use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Tab};

use crate::browser::PageDriver;
use crate::config::{AgentConfig, DismissRule, LaunchOptions};
use crate::error::{AgentError, Result};
use crate::grounding::ElementObservation;

/// JavaScript that collects the visible interactive elements.
const COLLECT_ELEMENTS_JS: &str = include_str!("interactive.js");

/// Browser session that manages a Chrome/Chromium instance driving a single
/// tab.
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// The tab the agent works in
    tab: Arc<Tab>,

    /// Timing and dismissal settings
    config: AgentConfig,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions, config: AgentConfig) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Set the browser's idle timeout to 1 hour (default is 30 seconds) to prevent the session from closing too soon
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        // Configure headless mode
        launch_opts.headless = options.headless;

        // Set window size
        launch_opts.window_size = Some((options.window_width, options.window_height));

        // Set Chrome binary path if provided
        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        // Set user data directory if provided
        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        // Set sandbox mode
        launch_opts.sandbox = options.sandbox;

        // Launch browser
        let browser =
            Browser::new(launch_opts).map_err(|e| AgentError::Session(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AgentError::Session(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(config.navigation_timeout);

        Ok(Self { browser, tab, config })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default(), AgentConfig::default())
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL, wait for the load to finish, let late content
    /// settle, then sweep for blocking popups
    pub fn navigate(&self, url: &str) -> Result<()> {
        let url = normalize_url(url);
        log::info!("Navigating to {}", url);

        self.tab
            .navigate_to(&url)
            .map_err(|e| AgentError::Navigation(format!("Failed to navigate to {}: {}", url, e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AgentError::Navigation(format!("Navigation timeout: {}", e)))?;

        // Give late dynamic content time to render
        std::thread::sleep(self.config.navigation_settle);

        self.dismiss_popups()?;

        Ok(())
    }

    /// Get the URL of the current page
    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Probe each dismissal rule in priority order, clicking whatever
    /// matches. Returns the number of popups dismissed; a miss is not an
    /// error.
    pub fn dismiss_popups(&self) -> Result<usize> {
        let mut dismissed = 0;
        for rule in &self.config.dismiss_rules {
            if self.probe_dismiss_rule(rule) {
                dismissed += 1;
                log::info!("Dismissed popup via {:?}", rule);
                std::thread::sleep(self.config.scroll_settle);
            }
        }
        Ok(dismissed)
    }

    /// Poll one dismissal rule until it clicks something or its window runs
    /// out
    fn probe_dismiss_rule(&self, rule: &DismissRule) -> bool {
        let script = match rule {
            DismissRule::Css(selector) => format!(
                "(function() {{ var el = document.querySelector({}); if (el) {{ el.click(); return true; }} return false; }})()",
                js_string(selector)
            ),
            DismissRule::ButtonText(text) => {
                let xpath = format!("//button[contains(normalize-space(.), \"{}\")]", text);
                format!(
                    "(function() {{ var hit = document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; if (hit) {{ hit.click(); return true; }} return false; }})()",
                    js_string(&xpath)
                )
            }
        };

        let deadline = Instant::now() + self.config.dismiss_timeout;
        loop {
            match self.tab.evaluate(&script, false) {
                Ok(remote_object) => {
                    if let Some(value) = remote_object.value {
                        if value.as_bool().unwrap_or(false) {
                            return true;
                        }
                    }
                }
                Err(e) => {
                    log::debug!("Popup probe failed: {}", e);
                    return false;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(250));
        }
    }

    /// Capture a PNG screenshot of the current viewport
    pub fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| AgentError::Session(format!("Failed to capture screenshot: {}", e)))
    }

    /// Collect the visible interactive elements from the page
    pub fn interactive_elements(&self) -> Result<Vec<ElementObservation>> {
        let result = self
            .tab
            .evaluate(COLLECT_ELEMENTS_JS, false)
            .map_err(|e| AgentError::Evaluation(format!("Failed to collect interactive elements: {}", e)))?;

        let value = result
            .value
            .ok_or_else(|| AgentError::Evaluation("Element collection returned no value".to_string()))?;

        let json: String = serde_json::from_value(value)
            .map_err(|e| AgentError::Evaluation(format!("Element collection returned a non-string value: {}", e)))?;

        serde_json::from_str(&json)
            .map_err(|e| AgentError::Evaluation(format!("Failed to parse element payload: {}", e)))
    }

    /// Click whatever element occupies the given viewport coordinates
    pub fn click_at(&self, x: f64, y: f64) -> Result<()> {
        let script = format!(
            "(function() {{ var el = document.elementFromPoint({}, {}); if (el) {{ el.click(); return true; }} return false; }})()",
            x, y
        );

        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| AgentError::Evaluation(format!("Failed to click at ({:.0}, {:.0}): {}", x, y, e)))?;

        let clicked = result.value.map(|v| v.as_bool().unwrap_or(false)).unwrap_or(false);
        if !clicked {
            return Err(AgentError::Input(format!("No element at point ({:.0}, {:.0})", x, y)));
        }
        Ok(())
    }

    /// Type text into the currently focused element
    pub fn type_text(&self, text: &str) -> Result<()> {
        self.tab
            .type_str(text)
            .map_err(|e| AgentError::Input(format!("Failed to type text: {}", e)))?;
        Ok(())
    }

    /// Press a named key, e.g. "Enter" or "PageDown"
    pub fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .map_err(|e| AgentError::Input(format!("Failed to press {}: {}", key, e)))?;
        Ok(())
    }

    /// Close the session
    pub fn close(&self) -> Result<()> {
        // The Browser struct doesn't have a public close method in
        // headless_chrome; it shuts down when dropped. Closing the tab ends
        // the session cleanly.
        let _ = self.tab.close(false);
        Ok(())
    }
}

impl PageDriver for BrowserSession {
    fn navigate(&self, url: &str) -> Result<()> {
        BrowserSession::navigate(self, url)
    }

    fn current_url(&self) -> String {
        BrowserSession::current_url(self)
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        BrowserSession::screenshot(self)
    }

    fn interactive_elements(&self) -> Result<Vec<ElementObservation>> {
        BrowserSession::interactive_elements(self)
    }

    fn click_at(&self, x: f64, y: f64) -> Result<()> {
        BrowserSession::click_at(self, x, y)
    }

    fn type_text(&self, text: &str) -> Result<()> {
        BrowserSession::type_text(self, text)
    }

    fn press_key(&self, key: &str) -> Result<()> {
        BrowserSession::press_key(self, key)
    }

    fn close(&self) -> Result<()> {
        BrowserSession::close(self)
    }
}

/// Normalize a URL the way a person types it: bare domains get a scheme and
/// a `www.` prefix. `about:` and `data:` URLs pass through untouched.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http") || trimmed.starts_with("about:") || trimmed.starts_with("data:") {
        trimmed.to_string()
    } else if trimmed.starts_with("www.") {
        format!("https://{}", trimmed)
    } else {
        format!("https://www.{}", trimmed)
    }
}

/// Quote a string as a JavaScript literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
