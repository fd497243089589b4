//! Built-in formula functions

mod add;
mod concat;
mod get;

pub use add::AddFunction;
pub use concat::ConcatFunction;
pub use get::{GET_NODE_TYPE, GetFunction};
