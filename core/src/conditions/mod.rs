//! User-defined boolean conditions and their evaluator.
//!
//! This module provides:
//! - **Definitions**: serde records describing a condition (color match,
//!   time interval, AND/OR combo over other conditions)
//! - **Engine**: resolves definitions by id and evaluates them against
//!   the current time and a screen sample
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 ConditionDefinition (JSON config)             │
//! │  "true while region (10,10)-(40,40) averages near #648064"   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                    probe(id, now, sampler)
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ConditionEngine                         │
//! │  resolves combo children by id, bounds recursion, keeps the   │
//! │  per-id interval state (pure probe / explicit consume)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Probing is side-effect free: a `TimeInterval` that evaluates true is
//! only advanced when the caller explicitly calls [`ConditionEngine::consume`],
//! so the same condition can back a "test condition" button and the live
//! scheduler without falsely consuming the interval.

mod definitions;
mod engine;

#[cfg(test)]
mod engine_tests;

pub use definitions::{ConditionDefinition, ConditionKind};
pub use engine::{ConditionEngine, EvalError, MAX_COMBO_DEPTH};
