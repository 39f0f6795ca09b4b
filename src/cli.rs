//! Interactive goal REPL: reads goals from stdin, picks a mode, and reports
//! how each run ended.

use std::io::{self, Write};

use anyhow::Context;

use crate::agent::{Agent, Mode};
use crate::browser::BrowserSession;
use crate::config::{AgentConfig, LaunchOptions};
use crate::grounding::Grounder;
use crate::llm::{ChatPlanner, ChatVision, Vision};

/// Page loaded at startup so the first observation has something to look at.
const HOME_PAGE: &str = "https://www.google.com";

/// Questions the `test vision` command puts to the vision model.
const VISION_TEST_QUESTIONS: [&str; 4] = [
    "What website is this?",
    "Describe what you see on this page in detail.",
    "What are the main interactive elements visible?",
    "Is there a search box? If yes, describe where it is.",
];

/// Launch the browser and run the goal loop until `exit` or EOF.
pub fn run(launch: LaunchOptions, config: AgentConfig) -> anyhow::Result<()> {
    let planner = ChatPlanner::from_env().context("Failed to set up the planner model")?;
    let vision = ChatVision::from_env().context("Failed to set up the vision model")?;

    let session =
        BrowserSession::launch(launch, config.clone()).context("Failed to launch the browser")?;

    println!("ocular - vision-grounded browser agent");
    println!("Type a goal, 'test vision' to probe the vision model, or 'exit' to quit.");

    if let Err(e) = session.navigate(HOME_PAGE) {
        log::warn!("Could not open home page: {}", e);
    }

    let mut agent = Agent::new(&session, &planner, &vision, config.clone());

    loop {
        let input = match read_line("\nGoal (or 'exit', 'test vision'): ")? {
            Some(input) => input,
            None => break,
        };

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.eq_ignore_ascii_case("test vision") {
            if let Err(e) = run_vision_test(&session, &vision, &config) {
                println!("Vision test failed: {}", e);
            }
            continue;
        }

        let mode = prompt_mode()?;
        match agent.run(&input, mode) {
            Ok(outcome) => {
                println!(
                    "\nRun {}: {} steps executed",
                    outcome.status, outcome.steps_executed
                );
                if let Some(reason) = outcome.reason {
                    println!("Verifier: {}", reason);
                }
            }
            Err(e) => println!("\nRun error: {}", e),
        }
    }

    let _ = session.close();
    println!("Goodbye.");
    Ok(())
}

/// Capture the current page and put the standard probe questions to the
/// vision model against the marked overlay.
fn run_vision_test(
    session: &BrowserSession,
    vision: &dyn Vision,
    config: &AgentConfig,
) -> crate::error::Result<()> {
    let mut grounder = Grounder::new(config);
    let observation = grounder.observe(session)?;

    println!("Current URL: {}", session.current_url());
    println!("Interactive elements: {}", observation.element_count());

    for question in VISION_TEST_QUESTIONS {
        println!("\nQ: {}", question);
        match vision.analyze(observation.overlay(), question) {
            Ok(answer) => println!("A: {}", answer),
            Err(e) => println!("Vision error: {}", e),
        }
    }
    Ok(())
}

fn prompt_mode() -> io::Result<Mode> {
    let choice = read_line("Mode: [1] Pre-planned  [2] Reactive  [3] Adaptive (default 3): ")?;
    Ok(parse_mode(choice.as_deref().unwrap_or_default()))
}

fn parse_mode(choice: &str) -> Mode {
    match choice.trim() {
        "1" => Mode::Planned,
        "2" => Mode::Reactive,
        _ => Mode::Adaptive,
    }
}

/// Prompt and read one trimmed line; `None` on EOF.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_choices() {
        assert_eq!(parse_mode("1"), Mode::Planned);
        assert_eq!(parse_mode("2"), Mode::Reactive);
        assert_eq!(parse_mode("3"), Mode::Adaptive);
    }

    #[test]
    fn test_parse_mode_defaults_to_adaptive() {
        assert_eq!(parse_mode(""), Mode::Adaptive);
        assert_eq!(parse_mode("  "), Mode::Adaptive);
        assert_eq!(parse_mode("adaptive please"), Mode::Adaptive);
    }
}
