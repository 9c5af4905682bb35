//! CLI library components for the contract feed tool.

pub mod logging;
pub mod pipeline;
pub mod summary;
