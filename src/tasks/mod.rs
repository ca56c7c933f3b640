//! Background tasks module
//!
//! This module contains the tasks that drive the coordinator: the tick loop
//! and the command reader.

pub mod commands;
pub mod tick_loop;

// Re-export main functions
pub use commands::{command_reader_task, Command};
pub use tick_loop::tick_loop_task;
