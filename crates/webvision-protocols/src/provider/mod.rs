//! LLM Provider protocol definitions.

mod model;
mod request;
mod response;
mod traits;

pub use model::*;
pub use request::*;
pub use response::*;
pub use traits::*;
