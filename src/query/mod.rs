//! Search specifications, parsing, planning and execution.
//!
//! A [`SearchSpec`] is split by the planner into graph, index and local
//! phases, run in that order by the [`SearchExecutor`], then narrowed by an
//! optional [`ProbabilityWindow`].

pub mod executor;
pub mod parser;
pub mod planner;
pub mod probability;
pub mod spec;

pub use executor::SearchExecutor;
pub use parser::parse_search;
pub use planner::{ConditionPhase, PlanStep, QueryPlan, condition_phase};
pub use probability::{ProbabilityKey, ProbabilityWindow, sort_by_probability};
pub use spec::{SearchCondition, SearchSet, SearchSpec, ValueRange};
