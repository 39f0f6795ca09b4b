//! Prompt text for the planner and vision models, kept in one place so the
//! wording the reply parsers depend on stays next to its consumers.

/// One-sentence page description, used as verifier context.
pub const DESCRIBE_PAGE: &str = "Describe what you see on this webpage in one sentence.";

/// Richer description for the reactive loop's next-action context.
pub const DESCRIBE_PAGE_DETAILED: &str =
    "Describe what you see on this webpage in one sentence. What are the main elements visible?";

/// Ask the planner for a complete plan.
pub fn plan_prompt(goal: &str) -> String {
    format!(
        "You are a web automation planner. Create a step-by-step plan for this goal: {goal}\n\
         \n\
         Rules:\n\
         - Use ONLY these step forms, one per line:\n\
         NAVIGATE: <url>\n\
         CLICK: <visual description of the element>\n\
         TYPE: <text>\n\
         - CLICK descriptions name what a person sees, like \"search box\" or \"Add to Cart button\", never CSS selectors.\n\
         - TYPE goes into the last clicked input and is submitted with Enter.\n\
         \n\
         Example plan for \"search flipkart for a wireless mouse\":\n\
         1. NAVIGATE: flipkart.com\n\
         2. CLICK: search box\n\
         3. TYPE: wireless mouse\n\
         \n\
         Reply with ONLY the numbered steps."
    )
}

/// Ask the planner for the single next step, given where things stand.
pub fn next_action_prompt(goal: &str, record: &str, page_description: &str) -> String {
    let record = if record.is_empty() { "(none)" } else { record };
    format!(
        "You are driving a web browser toward this goal: {goal}\n\
         \n\
         Current page: {page_description}\n\
         Steps already completed:\n\
         {record}\n\
         \n\
         Reply with the single next step in NAVIGATE:/CLICK:/TYPE: form, or DONE if the goal is complete."
    )
}

/// Ask the planner whether the last step worked and whether the remaining
/// plan still fits the page.
pub fn verify_prompt(
    goal: &str,
    remaining: &str,
    record: &str,
    page_description: &str,
    last_action: &str,
) -> String {
    let record = if record.is_empty() { "(none)" } else { record };
    let remaining = if remaining.is_empty() { "(none)" } else { remaining };
    format!(
        "You are checking progress on this goal: {goal}\n\
         \n\
         Last executed step: {last_action}\n\
         Steps already executed:\n\
         {record}\n\
         Remaining plan:\n\
         {remaining}\n\
         \n\
         Current page: {page_description}\n\
         \n\
         Reply in exactly this form:\n\
         STATUS: SUCCESS if the last step achieved its effect, otherwise FAILED\n\
         REASON: <one line>\n\
         NEXT_PLAN: CONTINUE if the remaining steps still fit, otherwise the replacement steps, one per line in NAVIGATE:/CLICK:/TYPE: form"
    )
}

/// Ask the vision model to pick the marked element matching a description.
/// Common e-commerce targets get sharper wording than the generic form.
pub fn resolve_prompt(target: &str) -> String {
    let lowered = target.to_lowercase();
    let marks = "Look at the screenshot. Every interactive element has a RED BOX around it with a WHITE NUMBER label.";

    if lowered.contains("search") {
        format!(
            "{marks} Find the MAIN SEARCH INPUT BOX, the wide text input usually near the top of the page. \
             Reply with ONLY the number."
        )
    } else if lowered.contains("quantity") || lowered.contains("increase") {
        format!(
            "{marks} Find the '+' button that increases the quantity. Reply with ONLY the number."
        )
    } else if lowered.contains("add to cart") || lowered.contains("add") {
        format!("{marks} Find the 'Add to Cart' button. Reply with ONLY the number.")
    } else {
        format!(
            "{marks} Find the element matching this description: '{target}'. Reply with ONLY the number."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prompt_names_all_step_forms() {
        let prompt = plan_prompt("buy shoes");
        assert!(prompt.contains("buy shoes"));
        assert!(prompt.contains("NAVIGATE:"));
        assert!(prompt.contains("CLICK:"));
        assert!(prompt.contains("TYPE:"));
    }

    #[test]
    fn test_next_action_prompt_fills_empty_record() {
        let prompt = next_action_prompt("goal", "", "a search page");
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("DONE"));
    }

    #[test]
    fn test_verify_prompt_spells_out_reply_form() {
        let prompt = verify_prompt(
            "goal",
            "CLICK: search box",
            "NAVIGATE: example.com",
            "a page",
            "NAVIGATE: example.com",
        );
        assert!(prompt.contains("STATUS:"));
        assert!(prompt.contains("REASON:"));
        assert!(prompt.contains("NEXT_PLAN:"));
        assert!(prompt.contains("NAVIGATE: example.com"));
        assert!(prompt.contains("CLICK: search box"));
    }

    #[test]
    fn test_verify_prompt_fills_empty_sections() {
        let prompt = verify_prompt("goal", "", "", "a page", "TYPE: tea");
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("TYPE: tea"));
    }

    #[test]
    fn test_resolve_prompt_specializes_search_targets() {
        let prompt = resolve_prompt("the search box");
        assert!(prompt.contains("MAIN SEARCH INPUT BOX"));
        assert!(prompt.contains("ONLY the number"));
    }

    #[test]
    fn test_resolve_prompt_specializes_quantity_and_cart() {
        assert!(resolve_prompt("increase quantity").contains("'+' button"));
        assert!(resolve_prompt("Add to Cart button").contains("'Add to Cart'"));
    }

    #[test]
    fn test_resolve_prompt_generic_carries_target() {
        let prompt = resolve_prompt("blue login link");
        assert!(prompt.contains("'blue login link'"));
    }
}
