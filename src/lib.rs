//! Vision-grounded browser automation.
//!
//! ocular drives a real Chrome/Chromium session toward natural-language
//! goals. A planner model drafts plans of atomic steps, a Set-of-Mark
//! overlay pins click targets to numbered marks a vision model can name,
//! and an adaptive control loop verifies progress after every step,
//! swapping in a new plan when the page disagrees with the old one.
//!
//! # Example
//!
//! ```no_run
//! use ocular::llm::{ChatPlanner, ChatVision};
//! use ocular::{Agent, AgentConfig, BrowserSession, LaunchOptions, Mode};
//!
//! # fn main() -> ocular::Result<()> {
//! let config = AgentConfig::default();
//! let session = BrowserSession::launch(LaunchOptions::new().headless(true), config.clone())?;
//! let planner = ChatPlanner::from_env()?;
//! let vision = ChatVision::from_env()?;
//!
//! let mut agent = Agent::new(&session, &planner, &vision, config);
//! let outcome = agent.run("search flipkart for a wireless mouse", Mode::Adaptive)?;
//! println!("{}: {} steps", outcome.status, outcome.steps_executed);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod grounding;
pub mod llm;
pub mod plan;

pub use agent::{Agent, Mode, RunOutcome, RunStatus};
pub use browser::{BrowserSession, PageDriver};
pub use config::{AgentConfig, LaunchOptions, LlmConfig};
pub use error::{AgentError, Result};
pub use executor::{Executor, StepOutcome};
pub use grounding::{ElementObservation, Grounder, Observation};
pub use llm::{Planner, Verification, Vision};
pub use plan::{Action, ExecutionRecord, PlanStore, ScrollDirection};
