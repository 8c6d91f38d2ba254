//! Error types for the WebVision protocol layer.

mod agent;
mod provider;
mod tool;

pub use agent::*;
pub use provider::*;
pub use tool::*;
