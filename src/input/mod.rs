pub mod handler;
pub mod parse;
pub mod tokenize;

pub use handler::{Command, Flow};
pub use tokenize::split_args;
