use std::path::PathBuf;
use std::time::Duration;

/// Options for launching the browser session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run the browser in headless mode (default: false, the agent is
    /// normally watched while it works).
    pub headless: bool,

    /// Window width in pixels.
    pub window_width: u32,

    /// Window height in pixels.
    pub window_height: u32,

    /// Path to the Chrome/Chromium binary (default: auto-detect).
    pub chrome_path: Option<PathBuf>,

    /// User data directory for the browser profile.
    pub user_data_dir: Option<PathBuf>,

    /// Enable the Chrome sandbox.
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1440,
            window_height: 900,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    /// Create launch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size.
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set the Chrome binary path.
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set the user data directory.
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: set sandbox mode.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

/// One popup-dismissal probe. Rules are tried in order after navigation;
/// each probe gets a short timeout and a miss is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissRule {
    /// Probe by CSS selector.
    Css(String),
    /// Probe for a button whose visible text contains the given string.
    ButtonText(String),
}

impl DismissRule {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn button_text(text: impl Into<String>) -> Self {
        Self::ButtonText(text.into())
    }
}

/// The built-in close-affordance probes, highest priority first.
pub fn default_dismiss_rules() -> Vec<DismissRule> {
    vec![
        DismissRule::button_text("Close"),
        DismissRule::button_text("Not now"),
        DismissRule::button_text("Maybe later"),
        DismissRule::css("[aria-label=\"Close\"]"),
        DismissRule::css(".close-button"),
        DismissRule::css("[class*=\"close\"]"),
    ]
}

/// Tuning knobs for the execution engine. Delays are settle delays: fixed
/// pauses that let rendering and navigation stabilize before the next
/// observation is taken.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Hard bound on control-loop iterations per goal.
    pub max_iterations: u32,

    /// Click-resolution attempts before a click step is reported failed.
    pub click_attempts: u32,

    /// Navigation timeout.
    pub navigation_timeout: Duration,

    /// Settle delay after navigation, for late dynamic content.
    pub navigation_settle: Duration,

    /// Settle delay after a click or typed submission.
    pub action_settle: Duration,

    /// Settle delay after a scroll gesture.
    pub scroll_settle: Duration,

    /// Pacing delay between control-loop iterations.
    pub iteration_pacing: Duration,

    /// Per-probe timeout for popup dismissal.
    pub dismiss_timeout: Duration,

    /// Popup-dismissal probes, in priority order.
    pub dismiss_rules: Vec<DismissRule>,

    /// Directory where overlay debug artifacts are written.
    pub artifacts_dir: PathBuf,

    /// Candidate font files for overlay labels, probed in order.
    pub font_paths: Vec<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            click_attempts: 3,
            navigation_timeout: Duration::from_secs(60),
            navigation_settle: Duration::from_secs(3),
            action_settle: Duration::from_secs(2),
            scroll_settle: Duration::from_secs(1),
            iteration_pacing: Duration::from_secs(1),
            dismiss_timeout: Duration::from_secs(2),
            dismiss_rules: default_dismiss_rules(),
            artifacts_dir: PathBuf::from("assets"),
            font_paths: default_font_paths(),
        }
    }
}

impl AgentConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the iteration cap.
    pub fn max_iterations(mut self, cap: u32) -> Self {
        self.max_iterations = cap;
        self
    }

    /// Builder method: set the click-resolution retry budget.
    pub fn click_attempts(mut self, attempts: u32) -> Self {
        self.click_attempts = attempts;
        self
    }

    /// Builder method: set the artifacts directory.
    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }
}

/// Candidate label fonts: `OCULAR_FONT` first if set, then common
/// distribution paths. The overlay degrades to unlabeled boxes when none of
/// these load.
pub fn default_font_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(custom) = std::env::var("OCULAR_FONT") {
        paths.push(PathBuf::from(custom));
    }
    for known in [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ] {
        paths.push(PathBuf::from(known));
    }
    paths
}

/// Connection settings for one OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Resolve the planner endpoint from the environment.
    ///
    /// `DEEPSEEK_API_KEY` wins and selects the DeepSeek endpoint; otherwise
    /// `OPENAI_API_KEY`/`OPENAI_BASE_URL`/`OPENAI_MODEL` apply, with
    /// defaults that also suit local OpenAI-compatible servers.
    pub fn planner_from_env() -> Self {
        if let Ok(api_key) = std::env::var("DEEPSEEK_API_KEY") {
            return Self {
                api_key,
                base_url: "https://api.deepseek.com/v1".to_string(),
                model: "deepseek-chat".to_string(),
                temperature: 0.3,
                timeout: Duration::from_secs(120),
            };
        }
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "dummy-key".to_string()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            temperature: 0.3,
            timeout: Duration::from_secs(120),
        }
    }

    /// Resolve the vision endpoint from the environment.
    ///
    /// `OCULAR_VISION_BASE_URL`/`OCULAR_VISION_API_KEY`/`OCULAR_VISION_MODEL`
    /// override; anything unset falls back to the planner endpoint with a
    /// multimodal default model.
    pub fn vision_from_env() -> Self {
        let planner = Self::planner_from_env();
        Self {
            api_key: std::env::var("OCULAR_VISION_API_KEY").unwrap_or(planner.api_key),
            base_url: std::env::var("OCULAR_VISION_BASE_URL").unwrap_or(planner.base_url),
            model: std::env::var("OCULAR_VISION_MODEL")
                .unwrap_or_else(|_| "qwen2.5-vl-3b-instruct".to_string()),
            temperature: 0.0,
            timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new().headless(true).window_size(800, 600);

        assert!(opts.headless);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
    }

    #[test]
    fn test_agent_config_defaults() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.max_iterations, 20);
        assert_eq!(cfg.click_attempts, 3);
        assert_eq!(cfg.navigation_timeout, Duration::from_secs(60));
        assert_eq!(cfg.dismiss_rules.len(), 6);
    }

    #[test]
    fn test_agent_config_builder() {
        let cfg = AgentConfig::new().max_iterations(5).click_attempts(1);
        assert_eq!(cfg.max_iterations, 5);
        assert_eq!(cfg.click_attempts, 1);
    }

    #[test]
    fn test_dismiss_rule_order() {
        let rules = default_dismiss_rules();
        assert_eq!(rules[0], DismissRule::button_text("Close"));
        assert_eq!(rules[3], DismissRule::css("[aria-label=\"Close\"]"));
    }

    // Environment variables are process-global, so every endpoint-precedence
    // check runs sequentially inside this one test.
    #[test]
    fn test_llm_endpoint_env_precedence() {
        unsafe {
            std::env::set_var("DEEPSEEK_API_KEY", "dsk-test");
            std::env::set_var("OPENAI_API_KEY", "oai-test");
        }
        let planner = LlmConfig::planner_from_env();
        assert_eq!(planner.api_key, "dsk-test");
        assert_eq!(planner.base_url, "https://api.deepseek.com/v1");
        assert_eq!(planner.model, "deepseek-chat");

        unsafe {
            std::env::remove_var("DEEPSEEK_API_KEY");
            std::env::set_var("OPENAI_BASE_URL", "http://localhost:1234/v1");
            std::env::set_var("OPENAI_MODEL", "local-planner");
        }
        let planner = LlmConfig::planner_from_env();
        assert_eq!(planner.api_key, "oai-test");
        assert_eq!(planner.base_url, "http://localhost:1234/v1");
        assert_eq!(planner.model, "local-planner");

        // With nothing vision-specific set, the vision endpoint reuses the
        // planner's credentials with a multimodal default model.
        let vision = LlmConfig::vision_from_env();
        assert_eq!(vision.api_key, "oai-test");
        assert_eq!(vision.base_url, "http://localhost:1234/v1");
        assert_eq!(vision.model, "qwen2.5-vl-3b-instruct");

        unsafe {
            std::env::set_var("OCULAR_VISION_API_KEY", "vis-test");
            std::env::set_var("OCULAR_VISION_BASE_URL", "http://vision-host:8000/v1");
            std::env::set_var("OCULAR_VISION_MODEL", "qwen-vl-max");
        }
        let vision = LlmConfig::vision_from_env();
        assert_eq!(vision.api_key, "vis-test");
        assert_eq!(vision.base_url, "http://vision-host:8000/v1");
        assert_eq!(vision.model, "qwen-vl-max");

        unsafe {
            for var in [
                "OPENAI_API_KEY",
                "OPENAI_BASE_URL",
                "OPENAI_MODEL",
                "OCULAR_VISION_API_KEY",
                "OCULAR_VISION_BASE_URL",
                "OCULAR_VISION_MODEL",
            ] {
                std::env::remove_var(var);
            }
        }
    }
}
