//! mockexam-core: Exam session engine, sampling and scoring.
//!
//! This crate defines the data model, the plan and question-bank parsers, the
//! session state machine with its countdown, and the engine that turns user
//! and timer commands into a timed, scored exam attempt.

pub mod answers;
pub mod engine;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod report;
pub mod sampler;
pub mod session;
pub mod source;
pub mod timer;
pub mod traits;

#[cfg(test)]
mod testing;
