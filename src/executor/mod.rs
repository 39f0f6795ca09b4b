//! Action execution: turns one plan step into driver calls, including the
//! observe-resolve-click cycle that grounds click targets in what is
//! actually on screen.

use std::sync::OnceLock;

use regex::Regex;

use crate::browser::PageDriver;
use crate::config::AgentConfig;
use crate::error::Result;
use crate::grounding::Grounder;
use crate::llm::{prompt, Vision};
use crate::plan::{Action, ScrollDirection};

/// How one step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran to completion.
    Completed,
    /// The step could not be carried out. The control loop decides whether
    /// to replan or press on.
    Failed(String),
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

/// Executes single plan steps against a page.
pub struct Executor {
    config: AgentConfig,
}

impl Executor {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    /// Execute one step. Every failure comes back as
    /// [`StepOutcome::Failed`] with a diagnostic, driver trouble included;
    /// nothing a single step does can abort the control loop.
    pub fn execute(
        &self,
        action: &Action,
        driver: &dyn PageDriver,
        grounder: &mut Grounder,
        vision: &dyn Vision,
    ) -> StepOutcome {
        log::info!("Executing {}", action);
        match self.dispatch(action, driver, grounder, vision) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("{} errored: {}", action.kind(), e);
                StepOutcome::Failed(e.to_string())
            }
        }
    }

    fn dispatch(
        &self,
        action: &Action,
        driver: &dyn PageDriver,
        grounder: &mut Grounder,
        vision: &dyn Vision,
    ) -> Result<StepOutcome> {
        match action {
            Action::Navigate(url) => {
                driver.navigate(url)?;
                Ok(StepOutcome::Completed)
            }
            Action::Click(target) => self.execute_click(target, driver, grounder, vision),
            Action::Type(text) => {
                driver.type_text(text)?;
                driver.press_key("Enter")?;
                std::thread::sleep(self.config.action_settle);
                Ok(StepOutcome::Completed)
            }
            Action::Scroll(direction) => {
                self.scroll(driver, *direction)?;
                Ok(StepOutcome::Completed)
            }
        }
    }

    /// Locate and click a described element.
    ///
    /// Each attempt works from a fresh observation: the vision model picks a
    /// mark id off the overlay, and the click lands on that element's center
    /// from the same observation. A miss scrolls down and tries again, in
    /// case the target sits below the fold.
    fn execute_click(
        &self,
        target: &str,
        driver: &dyn PageDriver,
        grounder: &mut Grounder,
        vision: &dyn Vision,
    ) -> Result<StepOutcome> {
        let question = prompt::resolve_prompt(target);

        for attempt in 1..=self.config.click_attempts {
            let observation = grounder.observe(driver)?;

            if observation.element_count() == 0 {
                log::warn!(
                    "No interactive elements in observation {} (attempt {}/{})",
                    observation.epoch(),
                    attempt,
                    self.config.click_attempts
                );
                self.scroll(driver, ScrollDirection::Down)?;
                continue;
            }

            let reply = vision.analyze(observation.overlay(), &question)?;
            log::debug!("Resolution reply for '{}': {:?}", target, reply);

            let id = match first_integer(&reply) {
                Some(id) => id,
                None => {
                    log::warn!(
                        "No mark id in vision reply (attempt {}/{}), scrolling",
                        attempt,
                        self.config.click_attempts
                    );
                    self.scroll(driver, ScrollDirection::Down)?;
                    continue;
                }
            };

            match observation.element(id) {
                Some(element) => {
                    let (x, y) = element.center();
                    log::info!(
                        "Clicking '{}' via mark {} at ({:.0}, {:.0})",
                        target,
                        id,
                        x,
                        y
                    );
                    if let Err(e) = driver.click_at(x, y) {
                        log::warn!("Click on mark {} failed: {}", id, e);
                        continue;
                    }
                    std::thread::sleep(self.config.action_settle);
                    return Ok(StepOutcome::Completed);
                }
                None => {
                    log::warn!(
                        "Mark {} not in observation {} (attempt {}/{}), scrolling",
                        id,
                        observation.epoch(),
                        attempt,
                        self.config.click_attempts
                    );
                    self.scroll(driver, ScrollDirection::Down)?;
                }
            }
        }

        Ok(StepOutcome::Failed(format!(
            "Could not locate '{}' after {} attempts",
            target, self.config.click_attempts
        )))
    }

    fn scroll(&self, driver: &dyn PageDriver, direction: ScrollDirection) -> Result<()> {
        let key = match direction {
            ScrollDirection::Up => "PageUp",
            ScrollDirection::Down => "PageDown",
            ScrollDirection::Bottom => "End",
        };
        driver.press_key(key)?;
        std::thread::sleep(self.config.scroll_settle);
        Ok(())
    }
}

/// First run of digits in a vision reply, the mark id it names.
pub(crate) fn first_integer(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+").expect("static pattern"));
    re.find(text).and_then(|m| m.as_str().parse().ok())
}
