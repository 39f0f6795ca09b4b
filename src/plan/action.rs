use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Scroll gestures the executor can issue. Scroll steps are never produced
/// by the plan grammar; the executor constructs them while hunting for an
/// off-screen element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Bottom,
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollDirection::Up => write!(f, "up"),
            ScrollDirection::Down => write!(f, "down"),
            ScrollDirection::Bottom => write!(f, "bottom"),
        }
    }
}

/// One atomic step of a plan.
///
/// `Navigate`, `Click` and `Type` round-trip through the plan grammar;
/// `Scroll` exists only inside the executor. The payload of a `Click` is a
/// natural-language description of the target, resolved against a numbered
/// screenshot at execution time, never a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load a URL (scheme optional, normalized by the session).
    Navigate(String),
    /// Click the element matching a visual description.
    Click(String),
    /// Type text into the focused element and submit it.
    Type(String),
    /// Scroll the page.
    Scroll(ScrollDirection),
}

impl Action {
    /// Short uppercase tag for logs and execution records.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Navigate(_) => "NAVIGATE",
            Action::Click(_) => "CLICK",
            Action::Type(_) => "TYPE",
            Action::Scroll(_) => "SCROLL",
        }
    }

    /// Parse a single plan line into an action.
    ///
    /// Ordinal prefixes (`1.`, `2)`, `Step 3:`) are stripped first, then the
    /// line must carry one of the case-sensitive `NAVIGATE:`, `CLICK:` or
    /// `TYPE:` prefixes with a non-empty payload. Blank lines, `#` comments
    /// and anything else yield `None`.
    pub fn parse_line(line: &str) -> Option<Action> {
        let trimmed = strip_ordinal(line.trim());
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        for (prefix, build) in [
            ("NAVIGATE:", Action::Navigate as fn(String) -> Action),
            ("CLICK:", Action::Click as fn(String) -> Action),
            ("TYPE:", Action::Type as fn(String) -> Action),
        ] {
            if let Some(rest) = trimmed.strip_prefix(prefix) {
                let value = rest.trim();
                if value.is_empty() {
                    log::warn!("Dropping plan line with empty payload: {:?}", line);
                    return None;
                }
                return Some(build(value.to_string()));
            }
        }
        log::debug!("Dropping unrecognized plan line: {:?}", line);
        None
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Navigate(url) => write!(f, "NAVIGATE: {}", url),
            Action::Click(target) => write!(f, "CLICK: {}", target),
            Action::Type(text) => write!(f, "TYPE: {}", text),
            Action::Scroll(direction) => write!(f, "SCROLL: {}", direction),
        }
    }
}

/// Remove a leading `1.` / `2)` / `Step 3:` marker, if any.
fn strip_ordinal(line: &str) -> &str {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    static STEP: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED.get_or_init(|| Regex::new(r"^\d+[.)]\s*").expect("static pattern"));
    let step = STEP.get_or_init(|| Regex::new(r"(?i)^step\s+\d+:\s*").expect("static pattern"));

    let line = match numbered.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    match step.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Parse a whole model reply into the actions it contains, in order.
/// Unrecognized lines are dropped, so a chatty reply still yields whatever
/// well-formed steps it carries.
pub fn parse_plan(text: &str) -> Vec<Action> {
    text.lines().filter_map(Action::parse_line).collect()
}
