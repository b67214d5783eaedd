//! Transforms applied to the merged context before invocation, always in this order:
//! cross reference resolution first so it sees raw `@@` placeholders, markup second.
mod globalizer;
pub use globalizer::*;

mod markdown;
pub use markdown::*;
