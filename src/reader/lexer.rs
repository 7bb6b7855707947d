use std::fmt;

use crate::parse_error;
use crate::reader::ParseError;

pub const COMMENT: char = ';';

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open,
    Close,
    Str(String),
    Atom(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Str(ref s) => write!(f, "\"{}\"", s),
            Token::Atom(ref s) => write!(f, "{}", s),
        }
    }
}

fn is_separator(c: char) -> bool { matches!(c, ' ' | '\t' | '\r' | '\n' | ',') }

fn is_paren(c: char) -> bool { c == '(' || c == ')' }

/// Cursor over one line of source text.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    max_len: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, max_len: usize) -> Lexer<'a> { Lexer { src, pos: 0, max_len } }

    fn rest(&self) -> &'a str { &self.src[self.pos..] }

    /// Byte offset of the first character after any separators and comments.
    fn skip_from(&self, mut pos: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() {
            match bytes[pos] as char {
                c if is_separator(c) => pos += 1,
                COMMENT => {
                    while pos < bytes.len() && bytes[pos] != b'\n' {
                        pos += 1;
                    }
                }
                _ => break,
            }
        }
        pos
    }

    /// Next significant character, without consuming anything.
    pub fn peek_char(&self) -> Option<char> { self.src[self.skip_from(self.pos)..].chars().next() }

    /// True when `(` is the very next character, with no separator before it.
    pub fn next_is_adjacent_open(&self) -> bool { self.rest().starts_with('(') }

    /// `Ok(None)` marks the end of the line.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.pos = self.skip_from(self.pos);
        let mut chars = self.rest().chars();
        let token = match chars.next() {
            None => return Ok(None),
            Some('"') => {
                let body: String = chars.take_while(|&c| c != '"').collect();
                let closed = self.rest()[1 + body.len()..].starts_with('"');
                self.pos += 1 + body.len() + usize::from(closed);
                self.check_len(&body)?;
                Token::Str(body)
            }
            Some('(') => {
                self.pos += 1;
                Token::Open
            }
            Some(')') => {
                self.pos += 1;
                Token::Close
            }
            Some(_) => {
                let atom: String = self.rest().chars().take_while(|&c| !is_separator(c) && !is_paren(c)).collect();
                self.pos += atom.len();
                self.check_len(&atom)?;
                Token::Atom(atom)
            }
        };
        Ok(Some(token))
    }

    fn check_len(&self, text: &str) -> Result<(), ParseError> {
        let len = text.chars().count();
        if len > self.max_len {
            parse_error!("token too long ({} characters, limit is {})", len, self.max_len)
        }
        Ok(())
    }
}

/// Tokenize a whole line.
#[cfg(test)]
pub fn tokenize(src: &str, max_len: usize) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(src, max_len);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
