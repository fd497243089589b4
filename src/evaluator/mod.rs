//! Formula evaluator
//!
//! Evaluates expression trees against a [`DataLedger`](crate::ledger::DataLedger)
//! using the functions of a [`FunctionRegistry`](crate::registry::FunctionRegistry).

#![warn(missing_docs)]

mod config;
mod engine;
mod error;

pub use config::EngineConfig;
pub use engine::FormulaEngine;
pub use error::{EvaluationError, EvaluationResult};
