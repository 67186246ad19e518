pub mod expr;
mod parser;

pub use parser::{ParseError, Parser, DEFAULT_MAX_DEPTH};
