//! Plan representation: atomic actions, the line grammar that recovers them
//! from model replies, and the FIFO store the control loop drains.

pub mod action;
pub mod store;

pub use action::{parse_plan, Action, ScrollDirection};
pub use store::{ExecutionRecord, PlanStore};
