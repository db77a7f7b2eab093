//! CLI module graph.

pub mod command;
pub mod confirm;
pub mod diagnostic;
pub mod output;
pub mod run;
