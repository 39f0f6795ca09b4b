//! The control loop: drives plan steps through the executor, watches the
//! page after each one, and lets the verifier swap in a new plan when the
//! page disagrees with the old one.

use std::fmt;

use crate::browser::PageDriver;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::executor::{Executor, StepOutcome};
use crate::grounding::Grounder;
use crate::llm::{prompt, Planner, Vision};
use crate::plan::{Action, ExecutionRecord, PlanStore};

/// How a goal is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Draft a plan once and execute it straight through.
    Planned,
    /// No upfront plan; ask for one action at a time.
    Reactive,
    /// Plan upfront, verify after every step, replan when the page
    /// disagrees with the plan.
    #[default]
    Adaptive,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Planned => write!(f, "pre-planned"),
            Mode::Reactive => write!(f, "reactive"),
            Mode::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every planned step ran, or the model declared the goal done.
    Completed,
    /// Planning broke down: no usable plan or next action.
    Failed,
    /// The iteration cap cut the run short.
    IterationLimit,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

/// Final report for one goal.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub steps_executed: u32,
    /// The verifier's last word, when there was one.
    pub reason: Option<String>,
}

/// One agent working one browser session toward user goals.
pub struct Agent<'a> {
    driver: &'a dyn PageDriver,
    planner: &'a dyn Planner,
    vision: &'a dyn Vision,
    executor: Executor,
    grounder: Grounder,
    config: AgentConfig,
}

impl<'a> Agent<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        planner: &'a dyn Planner,
        vision: &'a dyn Vision,
        config: AgentConfig,
    ) -> Self {
        Self {
            driver,
            planner,
            vision,
            executor: Executor::new(config.clone()),
            grounder: Grounder::new(&config),
            config,
        }
    }

    /// Builder method: skip overlay debug artifacts.
    pub fn without_artifacts(mut self) -> Self {
        self.grounder = Grounder::new(&self.config).without_artifacts();
        self
    }

    /// Drive one goal to a terminal status.
    pub fn run(&mut self, goal: &str, mode: Mode) -> Result<RunOutcome> {
        log::info!("Goal: {} ({} mode)", goal, mode);
        match mode {
            Mode::Planned => self.run_planned(goal),
            Mode::Reactive => self.run_reactive(goal),
            Mode::Adaptive => self.run_adaptive(goal),
        }
    }

    /// Execute a one-shot plan with no verification between steps.
    fn run_planned(&mut self, goal: &str) -> Result<RunOutcome> {
        let plan = match self.initial_plan(goal)? {
            Ok(plan) => plan,
            Err(outcome) => return Ok(outcome),
        };
        let mut store = PlanStore::from_actions(plan);
        let mut executed = 0u32;

        loop {
            if store.is_empty() {
                return Ok(RunOutcome {
                    status: RunStatus::Completed,
                    steps_executed: executed,
                    reason: None,
                });
            }
            if executed >= self.config.max_iterations {
                return Ok(self.capped_outcome(executed));
            }
            let action = match store.pop_front() {
                Some(action) => action,
                None => continue,
            };

            let outcome = self.execute(&action);
            executed += 1;
            if let StepOutcome::Failed(reason) = outcome {
                log::warn!("Step failed: {}", reason);
            }

            std::thread::sleep(self.config.iteration_pacing);
        }
    }

    /// Ask for one action at a time until the model reports the goal done.
    fn run_reactive(&mut self, goal: &str) -> Result<RunOutcome> {
        let mut record = ExecutionRecord::new();
        let mut executed = 0u32;

        loop {
            if executed >= self.config.max_iterations {
                return Ok(self.capped_outcome(executed));
            }

            let description = self.describe_page(prompt::DESCRIBE_PAGE_DETAILED)?;
            log::info!("Page: {}", description);

            let action = match self.planner.next_action(goal, record.entries(), &description) {
                Ok(Some(action)) => action,
                Ok(None) => {
                    log::info!("Model reports the goal complete");
                    return Ok(RunOutcome {
                        status: RunStatus::Completed,
                        steps_executed: executed,
                        reason: None,
                    });
                }
                Err(AgentError::PlanParse(msg)) => {
                    log::warn!("Unusable next-action reply: {}", msg);
                    return Ok(RunOutcome {
                        status: RunStatus::Failed,
                        steps_executed: executed,
                        reason: Some(msg),
                    });
                }
                Err(e) => return Err(e),
            };

            let outcome = self.execute(&action);
            executed += 1;
            // Recorded either way, so the model knows what was already
            // attempted when it picks the next step.
            record.record(&action);
            if let StepOutcome::Failed(reason) = outcome {
                log::warn!("Step failed: {}", reason);
            }

            std::thread::sleep(self.config.iteration_pacing);
        }
    }

    /// Plan, then execute with a verification pass after every step. A
    /// failed verification that carries a replacement plan swaps out the
    /// pending steps; the run completes when the plan runs dry.
    fn run_adaptive(&mut self, goal: &str) -> Result<RunOutcome> {
        let plan = match self.initial_plan(goal)? {
            Ok(plan) => plan,
            Err(outcome) => return Ok(outcome),
        };
        let mut store = PlanStore::from_actions(plan);
        let mut record = ExecutionRecord::new();
        let mut executed = 0u32;
        let mut last_reason = None;

        loop {
            if store.is_empty() {
                log::info!("Plan complete after {} steps", executed);
                return Ok(RunOutcome {
                    status: RunStatus::Completed,
                    steps_executed: executed,
                    reason: last_reason,
                });
            }
            if executed >= self.config.max_iterations {
                return Ok(self.capped_outcome(executed));
            }
            let action = match store.pop_front() {
                Some(action) => action,
                None => continue,
            };

            let outcome = self.execute(&action);
            executed += 1;
            // The step enters the record either way; the verifier judges
            // success from the screen, not from the executor's return value.
            record.record(&action);
            if let StepOutcome::Failed(reason) = &outcome {
                log::warn!("Step failed: {}", reason);
            }

            let description = self.describe_page(prompt::DESCRIBE_PAGE)?;
            log::info!("Page: {}", description);

            let remaining = store.snapshot();
            let verification = self.planner.verify(
                goal,
                &remaining,
                record.entries(),
                &description,
                &action.to_string(),
            )?;
            log::info!(
                "Verifier: {} ({})",
                if verification.success { "success" } else { "failed" },
                verification.reason
            );
            last_reason = Some(verification.reason);

            if !verification.success {
                match verification.new_plan {
                    Some(new_plan) => {
                        log::info!("Installing replacement plan");
                        log_plan(&new_plan);
                        store.replace(new_plan);
                    }
                    None => {
                        log::warn!("Verifier reported failure without a replacement plan");
                    }
                }
            }

            std::thread::sleep(self.config.iteration_pacing);
        }
    }

    /// Draft the initial plan for the planned and adaptive modes. An empty
    /// or unusable planner reply ends the run before anything executes.
    fn initial_plan(
        &self,
        goal: &str,
    ) -> Result<std::result::Result<Vec<Action>, RunOutcome>> {
        let plan = match self.planner.create_plan(goal) {
            Ok(plan) => plan,
            Err(AgentError::PlanParse(msg)) => {
                log::warn!("Unusable plan reply: {}", msg);
                return Ok(Err(RunOutcome {
                    status: RunStatus::Failed,
                    steps_executed: 0,
                    reason: Some(msg),
                }));
            }
            Err(e) => return Err(e),
        };
        if plan.is_empty() {
            log::warn!("Planner produced no steps");
            return Ok(Err(RunOutcome {
                status: RunStatus::Failed,
                steps_executed: 0,
                reason: Some("planner produced no steps".to_string()),
            }));
        }
        log_plan(&plan);
        Ok(Ok(plan))
    }

    fn execute(&mut self, action: &Action) -> StepOutcome {
        self.executor
            .execute(action, self.driver, &mut self.grounder, self.vision)
    }

    fn describe_page(&mut self, question: &str) -> Result<String> {
        let png = self.driver.screenshot()?;
        self.vision.analyze(&png, question)
    }

    fn capped_outcome(&self, executed: u32) -> RunOutcome {
        log::warn!(
            "{}",
            AgentError::IterationLimit(self.config.max_iterations)
        );
        RunOutcome {
            status: RunStatus::IterationLimit,
            steps_executed: executed,
            reason: None,
        }
    }
}

fn log_plan(plan: &[Action]) {
    log::info!("Plan with {} steps:", plan.len());
    for (i, step) in plan.iter().enumerate() {
        log::info!("  {}. {}", i + 1, step);
    }
}
