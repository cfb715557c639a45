// courier-cli/src/lib.rs

//! Shared setup for the demonstration binaries.

pub mod logging;
pub mod setup;
