use crate::config::LlmConfig;
use crate::error::{AgentError, Result};
use crate::llm::chat::ChatClient;
use crate::llm::{prompt, Planner, Verification};
use crate::plan::{parse_plan, Action};

const PLAN_MAX_TOKENS: u32 = 200;
const ACTION_MAX_TOKENS: u32 = 50;
const VERIFY_MAX_TOKENS: u32 = 200;

/// Planner backed by a chat model.
pub struct ChatPlanner {
    client: ChatClient,
}

impl ChatPlanner {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// Build a planner from the environment's endpoint settings.
    pub fn from_env() -> Result<Self> {
        let client = ChatClient::new(LlmConfig::planner_from_env())?;
        log::info!("Planner model: {}", client.model());
        Ok(Self::new(client))
    }
}

impl Planner for ChatPlanner {
    fn create_plan(&self, goal: &str) -> Result<Vec<Action>> {
        let reply = self
            .client
            .complete_text(&prompt::plan_prompt(goal), PLAN_MAX_TOKENS)?;
        log::debug!("Planner reply:\n{}", reply);

        let plan = parse_plan(&reply);
        if plan.is_empty() {
            return Err(AgentError::PlanParse(format!(
                "No actionable steps in planner reply: {:?}",
                reply
            )));
        }
        Ok(plan)
    }

    fn next_action(
        &self,
        goal: &str,
        completed: &[String],
        page_description: &str,
    ) -> Result<Option<Action>> {
        let reply = self.client.complete_text(
            &prompt::next_action_prompt(goal, &completed.join("\n"), page_description),
            ACTION_MAX_TOKENS,
        )?;
        log::debug!("Next-action reply: {:?}", reply);
        parse_next_action(&reply)
    }

    fn verify(
        &self,
        goal: &str,
        remaining: &[Action],
        completed: &[String],
        page_description: &str,
        last_action: &str,
    ) -> Result<Verification> {
        let remaining: Vec<String> = remaining.iter().map(|a| a.to_string()).collect();
        let reply = self.client.complete_text(
            &prompt::verify_prompt(
                goal,
                &remaining.join("\n"),
                &completed.join("\n"),
                page_description,
                last_action,
            ),
            VERIFY_MAX_TOKENS,
        )?;
        log::debug!("Verifier reply:\n{}", reply);
        Ok(parse_verification(&reply))
    }
}

/// Interpret a next-action reply: the `DONE` sentinel as the first token
/// means the goal is complete, a plan line means one more step, anything
/// else is a parse error. The sentinel is case-sensitive so prose that
/// merely opens with "Done" cannot end a run.
pub(crate) fn parse_next_action(reply: &str) -> Result<Option<Action>> {
    let trimmed = reply.trim();
    let first = trimmed.split_whitespace().next().unwrap_or("");
    if first.trim_end_matches(['.', ',', '!']) == "DONE" {
        return Ok(None);
    }
    match parse_plan(trimmed).into_iter().next() {
        Some(action) => Ok(Some(action)),
        None => Err(AgentError::PlanParse(format!(
            "No action in next-action reply: {:?}",
            reply
        ))),
    }
}

/// Interpret a verifier reply against the STATUS/REASON/NEXT_PLAN form.
///
/// A malformed reply degrades toward caution: a reply with no STATUS line
/// reads as a failure with no replan, and a NEXT_PLAN that is `CONTINUE`,
/// absent or unparsable keeps the current plan.
pub(crate) fn parse_verification(reply: &str) -> Verification {
    let mut status = None;
    let mut reason = String::new();

    for line in reply.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("STATUS:") {
            status = Some(rest.trim().to_uppercase().contains("SUCCESS"));
        } else if let Some(rest) = line.strip_prefix("REASON:") {
            reason = rest.trim().to_string();
        }
    }

    let success = match status {
        Some(success) => success,
        None => {
            log::warn!("Verifier reply carried no STATUS line, assuming failure without replan");
            return Verification {
                success: false,
                reason,
                new_plan: None,
            };
        }
    };

    let mut new_plan = None;
    if let Some(idx) = reply.find("NEXT_PLAN:") {
        let section = &reply[idx + "NEXT_PLAN:".len()..];
        if !section.trim().eq_ignore_ascii_case("CONTINUE") {
            let plan = parse_plan(section);
            if !plan.is_empty() {
                new_plan = Some(plan);
            } else if !section.trim().is_empty() {
                log::warn!("NEXT_PLAN section parsed to no steps, keeping current plan");
            }
        }
    }

    Verification {
        success,
        reason,
        new_plan,
    }
}
