pub mod env;
pub mod error;
pub mod eval;
pub mod node;
pub mod primitive;
pub mod render;
pub mod stack;


use std::io::Write;

use crate::config::Config;
use crate::interpreter::env::Env;
use crate::interpreter::eval::Evaluator;
use crate::interpreter::node::Node;
use crate::reader::{self, ParseError};

/// One session: the ambient environment plus the sink `write` prints to.
pub struct Interpreter<W: Write> {
    env: Env,
    out: W,
    config: Config,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W, config: Config) -> Interpreter<W> {
        Interpreter {
            env: Env::new_root(),
            out,
            config,
        }
    }

    pub fn env(&self) -> &Env { &self.env }

    pub fn config(&self) -> &Config { &self.config }

    pub fn output(&self) -> &W { &self.out }

    pub fn output_mut(&mut self) -> &mut W { &mut self.out }

    pub fn into_output(self) -> W { self.out }

    pub fn parse(&self, line: &str) -> Result<Option<Node>, ParseError> { reader::parse_line(line, self.config.max_token_len) }

    /// Evaluate against the ambient environment; top-level `def`s persist.
    pub fn evaluate(&mut self, node: &Node) -> Node { Evaluator::new(&mut self.out, self.config.max_depth).eval(node, &mut self.env) }

    /// Parse and evaluate one line. `Ok(None)` means the line held no expression.
    pub fn execute(&mut self, line: &str) -> Result<Option<Node>, ParseError> {
        match self.parse(line)? {
            Some(node) => Ok(Some(self.evaluate(&node))),
            None => Ok(None),
        }
    }
}
