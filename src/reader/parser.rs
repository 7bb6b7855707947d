use std::rc::Rc;

use phf::phf_map;
use tracing::{trace, warn};

use crate::interpreter::node::{Conditional, Definition, Node};
use crate::interpreter::stack::ensure_sufficient_stack;
use crate::parse_error;
use crate::reader::lexer::{Lexer, Token};
use crate::reader::ParseError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    Def,
    If,
    List,
    Data,
}

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "def" => Keyword::Def,
    "if" => Keyword::If,
    "list" => Keyword::List,
    "data" => Keyword::Data,
};

/// Marks a function definition: `def name args(p q) body`.
pub const ARGS: &str = "args";

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Parser<'a> { Parser { lexer } }

    /// Parse the first expression of the input; later tokens are ignored.
    pub fn parse(mut self) -> Result<Option<Node>, ParseError> {
        let token = match self.lexer.next_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        let node = self.parse_expression(token)?;
        if let Ok(Some(extra)) = self.lexer.next_token() {
            warn!("ignoring input after the first expression, starting at `{}`", extra);
        }
        Ok(Some(node))
    }

    fn next(&mut self, context: &str) -> Result<Token, ParseError> {
        match self.lexer.next_token()? {
            Some(token) => Ok(token),
            None => parse_error!("unexpected end of input in {}", context),
        }
    }

    fn expect_open(&mut self, context: &str) -> Result<(), ParseError> {
        match self.next(context)? {
            Token::Open => Ok(()),
            other => parse_error!("expected '(' after {}, found `{}`", context, other),
        }
    }

    /// Fetch the next token and parse the expression it starts.
    fn parse_next(&mut self, context: &str) -> Result<Node, ParseError> {
        let token = self.next(context)?;
        self.parse_expression(token)
    }

    pub fn parse_expression(&mut self, token: Token) -> Result<Node, ParseError> {
        ensure_sufficient_stack(|| self.parse_token(token))
    }

    fn parse_token(&mut self, token: Token) -> Result<Node, ParseError> {
        trace!("parse / {}", token);
        match token {
            Token::Open => Ok(Node::Sequence(self.parse_paren_content("group")?)),
            Token::Close => parse_error!("unexpected ')'"),
            Token::Str(s) => Ok(match s.parse::<i64>() {
                Ok(n) => Node::Number(n),
                Err(_) => Node::String(s),
            }),
            Token::Atom(s) => match KEYWORDS.get(s.as_str()) {
                Some(Keyword::Def) => self.parse_def(),
                Some(Keyword::If) => self.parse_if(),
                Some(Keyword::List) => {
                    self.expect_open("list")?;
                    Ok(Node::Sequence(self.parse_paren_content("list")?))
                }
                Some(Keyword::Data) => {
                    self.expect_open("data")?;
                    Ok(Node::DataBlock(self.parse_paren_content("data")?))
                }
                None if self.lexer.peek_char() == Some('(') => self.parse_call(s),
                None => parse_atom(s),
            },
        }
    }

    /// Expressions up to the matching `)`; the `(` is already consumed.
    fn parse_paren_content(&mut self, context: &str) -> Result<Vec<Node>, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.next(context)? {
                Token::Close => return Ok(items),
                token => items.push(self.parse_expression(token)?),
            }
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Node, ParseError> {
        self.expect_open("call")?;
        let mut items = vec![Node::Symbol(name)];
        items.extend(self.parse_paren_content("call arguments")?);
        Ok(Node::Call(items))
    }

    fn parse_def(&mut self) -> Result<Node, ParseError> {
        let name = match self.next("def")? {
            Token::Atom(name) => name,
            other => parse_error!("expected a name after def, found `{}`", other),
        };
        let definition = match self.next("def")? {
            Token::Atom(ref a) if a == ARGS => {
                self.expect_open("args")?;
                let params = self.parse_params()?;
                let body = self.parse_next("function body")?;
                Definition::function(name, params, body)
            }
            token => Definition::variable(name, self.parse_expression(token)?),
        };
        Ok(Node::Definition(Rc::new(definition)))
    }

    fn parse_params(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();
        loop {
            match self.next("parameter list")? {
                Token::Close => return Ok(params),
                Token::Atom(name) => params.push(name),
                other => parse_error!("expected a parameter name, found `{}`", other),
            }
        }
    }

    fn parse_if(&mut self) -> Result<Node, ParseError> {
        // `if(c t e)` encloses its branches; `if c t e` does not.
        let enclosed = self.lexer.next_is_adjacent_open();
        if enclosed {
            self.expect_open("if")?;
        }
        let condition = self.parse_next("if condition")?;
        let then_branch = self.parse_next("if then-branch")?;
        let else_branch = self.parse_next("if else-branch")?;
        if enclosed {
            match self.next("if")? {
                Token::Close => (),
                other => parse_error!("expected ')' to close if, found `{}`", other),
            }
        }
        Ok(Node::Conditional(Box::new(Conditional {
            condition,
            then_branch,
            else_branch,
        })))
    }
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn parse_atom(s: String) -> Result<Node, ParseError> {
    match s.parse::<i64>() {
        Ok(n) => Ok(Node::Number(n)),
        Err(_) if looks_numeric(&s) => parse_error!("integer literal out of range: {}", s),
        Err(_) => Ok(Node::Symbol(s)),
    }
}
