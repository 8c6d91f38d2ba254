//! Common types used across the WebVision crates.

mod common;
mod message;

pub use common::*;
pub use message::*;
