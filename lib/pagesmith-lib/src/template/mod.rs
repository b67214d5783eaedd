mod engine;
pub use engine::*;

mod compiler;
pub use compiler::*;
