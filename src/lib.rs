//! ListScript: a line-at-a-time interpreter for a small list language.
//!
//! Each line goes through [`reader`] (tokenizer and parser), is evaluated by
//! an [`interpreter::Interpreter`], and the result is rendered back to text.

pub mod config;
pub mod interpreter;
pub mod reader;
pub mod repl;

pub use config::Config;
pub use interpreter::node::Node;
pub use interpreter::Interpreter;
