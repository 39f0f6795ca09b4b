#![allow(dead_code)]

//! Scripted doubles shared by the scenario tests: a recording page driver, a
//! vision model that answers from a script, and a planner with canned
//! verdicts. Everything runs without Chrome or a network.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};

use ocular::error::AgentError;
use ocular::llm::{Planner, Verification, Vision};
use ocular::{Action, AgentConfig, ElementObservation, PageDriver, Result};

/// Config with the waits zeroed so scenarios run instantly.
pub fn fast_config() -> AgentConfig {
    AgentConfig {
        navigation_settle: Duration::ZERO,
        action_settle: Duration::ZERO,
        scroll_settle: Duration::ZERO,
        iteration_pacing: Duration::ZERO,
        ..AgentConfig::default()
    }
}

pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    png
}

pub fn element(id: u32, x: f64, y: f64, width: f64, height: f64) -> ElementObservation {
    ElementObservation {
        id,
        x,
        y,
        width,
        height,
        tag: "button".to_string(),
    }
}

/// Page driver double: records every call and serves element sets one
/// observation at a time, repeating the last set once the script runs out.
pub struct FakeDriver {
    element_sets: RefCell<VecDeque<Vec<ElementObservation>>>,
    pub navigations: RefCell<Vec<String>>,
    pub clicks: RefCell<Vec<(f64, f64)>>,
    pub typed: RefCell<Vec<String>>,
    pub keys: RefCell<Vec<String>>,
    png: Vec<u8>,
}

impl FakeDriver {
    pub fn new(element_sets: Vec<Vec<ElementObservation>>) -> Self {
        Self {
            element_sets: RefCell::new(element_sets.into()),
            navigations: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
            typed: RefCell::new(Vec::new()),
            keys: RefCell::new(Vec::new()),
            png: blank_png(320, 200),
        }
    }
}

impl PageDriver for FakeDriver {
    fn navigate(&self, url: &str) -> Result<()> {
        self.navigations.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> String {
        self.navigations
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string())
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.png.clone())
    }

    fn interactive_elements(&self) -> Result<Vec<ElementObservation>> {
        let mut sets = self.element_sets.borrow_mut();
        if sets.len() > 1 {
            Ok(sets.pop_front().unwrap_or_default())
        } else {
            Ok(sets.front().cloned().unwrap_or_default())
        }
    }

    fn click_at(&self, x: f64, y: f64) -> Result<()> {
        self.clicks.borrow_mut().push((x, y));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.typed.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.keys.borrow_mut().push(key.to_string());
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Vision double: mark-resolution questions consume the scripted replies,
/// every other question gets a fixed page description.
pub struct RoutedVision {
    resolutions: RefCell<VecDeque<String>>,
    description: String,
}

impl RoutedVision {
    pub fn new(resolutions: &[&str], description: &str) -> Self {
        Self {
            resolutions: RefCell::new(resolutions.iter().map(|r| r.to_string()).collect()),
            description: description.to_string(),
        }
    }
}

impl Vision for RoutedVision {
    fn analyze(&self, _png: &[u8], question: &str) -> Result<String> {
        if question.contains("RED BOX") {
            self.resolutions
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| AgentError::llm("no scripted resolution reply left"))
        } else {
            Ok(self.description.clone())
        }
    }
}

/// Planner double with a fixed first plan and scripted verifications.
pub struct ScriptedPlanner {
    plan: Vec<Action>,
    verifications: RefCell<VecDeque<Verification>>,
    next_actions: RefCell<VecDeque<Option<Action>>>,
    pub verify_records: RefCell<Vec<String>>,
    pub verify_remaining: RefCell<Vec<Vec<Action>>>,
}

impl ScriptedPlanner {
    pub fn new(plan: Vec<Action>) -> Self {
        Self {
            plan,
            verifications: RefCell::new(VecDeque::new()),
            next_actions: RefCell::new(VecDeque::new()),
            verify_records: RefCell::new(Vec::new()),
            verify_remaining: RefCell::new(Vec::new()),
        }
    }

    pub fn with_verifications(self, verifications: Vec<Verification>) -> Self {
        *self.verifications.borrow_mut() = verifications.into();
        self
    }

    pub fn with_next_actions(self, next_actions: Vec<Option<Action>>) -> Self {
        *self.next_actions.borrow_mut() = next_actions.into();
        self
    }
}

impl Planner for ScriptedPlanner {
    fn create_plan(&self, _goal: &str) -> Result<Vec<Action>> {
        Ok(self.plan.clone())
    }

    fn next_action(
        &self,
        _goal: &str,
        _completed: &[String],
        _page_description: &str,
    ) -> Result<Option<Action>> {
        match self.next_actions.borrow_mut().pop_front() {
            Some(scripted) => Ok(scripted),
            None => Err(AgentError::PlanParse("script exhausted".to_string())),
        }
    }

    fn verify(
        &self,
        _goal: &str,
        remaining: &[Action],
        completed: &[String],
        _page: &str,
        _last_action: &str,
    ) -> Result<Verification> {
        self.verify_records.borrow_mut().push(completed.join("\n"));
        self.verify_remaining.borrow_mut().push(remaining.to_vec());
        Ok(self
            .verifications
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(step_ok))
    }
}

pub fn step_ok() -> Verification {
    Verification {
        success: true,
        reason: "looks right".to_string(),
        new_plan: None,
    }
}

pub fn step_failed() -> Verification {
    Verification {
        success: false,
        reason: "nothing changed".to_string(),
        new_plan: None,
    }
}

pub fn replan(steps: Vec<Action>) -> Verification {
    Verification {
        success: false,
        reason: "plan no longer fits".to_string(),
        new_plan: Some(steps),
    }
}
