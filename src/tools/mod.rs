//! Tool implementations and the registry that dispatches to them.

pub mod calculator;
pub mod get_date;
pub mod get_time;
pub mod recall_memory;
pub mod registry;
pub mod save_memory;

pub use registry::{Tool, ToolRegistry};
