use thiserror::Error;

/// Errors emitted by the ocular agent.
///
/// Execution-level variants (navigation, grounding, input) are converted into
/// step outcomes at the action boundary and never abort the control loop;
/// only session-level failures propagate out of a command.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Browser failed to launch or the session/tab became unusable.
    #[error("browser session error: {0}")]
    Session(String),

    /// Navigation timed out or the network request failed.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// In-page JavaScript evaluation failed or returned an unusable value.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// The vision reply contained no usable element id.
    #[error("no element id found in vision reply: {0:?}")]
    GroundingParse(String),

    /// A parsed element id is absent from the current observation map.
    /// The element likely scrolled out of view or was hallucinated.
    #[error("element id {0} not present in the current observation")]
    ElementNotFound(u32),

    /// Keystroke dispatch failed because no input channel was available.
    #[error("input failed: {0}")]
    Input(String),

    /// A planner or verifier reply could not be parsed.
    #[error("plan parse error: {0}")]
    PlanParse(String),

    /// The control loop hit its safety bound before the plan finished.
    #[error("iteration limit of {0} reached")]
    IterationLimit(u32),

    /// A planner or vision service request failed at the transport level.
    #[error("model request failed: {0}")]
    Llm(String),

    /// Overlay rendering could not decode or encode the screenshot.
    #[error("overlay rendering failed: {0}")]
    Overlay(String),
}

impl AgentError {
    /// Helper for session-level failures.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Helper for model transport failures.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }
}

/// Result type alias using [`AgentError`].
pub type Result<T> = std::result::Result<T, AgentError>;
