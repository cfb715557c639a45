// courier-core/src/pipelines/mod.rs

//! The two end-to-end flows: model invocation followed by local dispatch.

pub mod calculator;
pub mod summary;

pub use calculator::CalculatorAssistant;
pub use summary::SummaryMailer;
