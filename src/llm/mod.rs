//! Model integration: the planner and vision seams, and the chat plumbing
//! behind the production implementations.

pub mod chat;
pub mod planner;
pub mod prompt;
pub mod vision;

pub use chat::ChatClient;
pub use planner::ChatPlanner;
pub use vision::ChatVision;

use crate::error::Result;
use crate::plan::Action;

/// Outcome of one verification pass.
#[derive(Debug, Clone)]
pub struct Verification {
    /// Whether the last action achieved its intended effect. The verifier
    /// reads this off the screen, so it is authoritative over whatever the
    /// executor reported.
    pub success: bool,
    /// The verifier's one-line justification, for logs.
    pub reason: String,
    /// Replacement plan, present when the verifier decided the pending
    /// steps no longer fit the page.
    pub new_plan: Option<Vec<Action>>,
}

/// Drafts plans, picks next actions and verifies progress. Implemented by
/// [`ChatPlanner`] in production and by scripted fakes in tests.
pub trait Planner {
    /// Draft a complete plan for a goal.
    fn create_plan(&self, goal: &str) -> Result<Vec<Action>>;

    /// Pick the single next action toward the goal, or `None` when the
    /// goal is already complete.
    fn next_action(
        &self,
        goal: &str,
        completed: &[String],
        page_description: &str,
    ) -> Result<Option<Action>>;

    /// Judge whether the last action worked and whether the remaining plan
    /// still fits the page, optionally producing a replacement plan.
    fn verify(
        &self,
        goal: &str,
        remaining: &[Action],
        completed: &[String],
        page_description: &str,
        last_action: &str,
    ) -> Result<Verification>;
}

/// Answers free-form questions about a screenshot.
pub trait Vision {
    fn analyze(&self, png: &[u8], question: &str) -> Result<String>;
}
