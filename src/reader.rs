pub mod lexer;
pub mod parser;

use std::fmt;

use crate::interpreter::node::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "Parse error: {}", self.message) }
}

impl std::error::Error for ParseError {}

#[macro_export]
macro_rules! parse_error {
    ($($arg:tt)*) => (
        return Err($crate::reader::ParseError { message: format!($($arg)*)})
    )
}

/// Parse the single expression held by `line`.
///
/// Returns `Ok(None)` for a line with no tokens (blank or comment only).
pub fn parse_line(line: &str, max_token_len: usize) -> Result<Option<Node>, ParseError> {
    parser::Parser::new(lexer::Lexer::new(line, max_token_len)).parse()
}
