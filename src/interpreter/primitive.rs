use std::io::Write;

use phf::phf_map;

use crate::error_value;
use crate::interpreter::error::DIVISION_BY_ZERO;
use crate::interpreter::node::Node;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Primitive {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    Eq,
    First,
    Rest,
    Cons,
    Write,
}

pub static PRIMITIVES: phf::Map<&'static str, Primitive> = phf_map! {
    "+" => Primitive::Add,
    "-" => Primitive::Sub,
    "*" => Primitive::Mul,
    "/" => Primitive::Div,
    "<" => Primitive::Less,
    ">" => Primitive::Greater,
    "eq?" => Primitive::Eq,
    "first" => Primitive::First,
    "rest" => Primitive::Rest,
    "cons" => Primitive::Cons,
    "write" => Primitive::Write,
};

pub fn get_primitive_names() -> impl Iterator<Item = &'static str> { PRIMITIVES.keys().copied() }

/// Apply the primitive called `name` to already evaluated arguments.
///
/// `out` receives whatever `write` prints.
pub fn primitive(name: &str, args: &[Node], out: &mut dyn Write) -> Node {
    let Some(&op) = PRIMITIVES.get(name) else { error_value!("Unknown primitive operator '{}'", name) };
    match op {
        Primitive::Add | Primitive::Sub | Primitive::Mul | Primitive::Div => arithmetic(op, name, args),
        Primitive::Less | Primitive::Greater | Primitive::Eq => comparison(op, name, args),
        Primitive::First => match args {
            [Node::Sequence(items)] => match items.first() {
                Some(head) => head.clone(),
                None => Node::error("'first' called on empty list"),
            },
            [other] => Node::error(format!("Type error: 'first' expects a list, got {}", other.kind())),
            _ => arity_error(name, 1, args.len()),
        },
        Primitive::Rest => match args {
            [Node::Sequence(items)] => match items.split_first() {
                Some((_, tail)) => Node::Sequence(tail.to_vec()),
                None => Node::error("'rest' called on empty list"),
            },
            [other] => Node::error(format!("Type error: 'rest' expects a list, got {}", other.kind())),
            _ => arity_error(name, 1, args.len()),
        },
        Primitive::Cons => match args {
            [head, Node::Sequence(tail)] => {
                let mut items = Vec::with_capacity(tail.len() + 1);
                items.push(head.clone());
                items.extend(tail.iter().cloned());
                Node::Sequence(items)
            }
            [_, other] => Node::error(format!("Type error: 'cons' second argument must be a list, got {}", other.kind())),
            _ => arity_error(name, 2, args.len()),
        },
        Primitive::Write => match args {
            [value] => match writeln!(out, "{}", value) {
                Ok(()) => Node::Boolean(true),
                Err(e) => Node::error(format!("'write' failed: {}", e)),
            },
            _ => arity_error(name, 1, args.len()),
        },
    }
}

fn arity_error(name: &str, expected: usize, got: usize) -> Node {
    Node::error(format!(
        "Arity mismatch: '{}' expects {} argument{}, got {}",
        name,
        expected,
        if expected == 1 { "" } else { "s" },
        got
    ))
}

fn numbers(name: &str, args: &[Node]) -> Result<(i64, i64), Node> {
    match args {
        [a, b] => match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(Node::error(format!(
                "Type error: '{}' expects numbers, got {} and {}",
                name,
                a.kind(),
                b.kind()
            ))),
        },
        _ => Err(arity_error(name, 2, args.len())),
    }
}

fn arithmetic(op: Primitive, name: &str, args: &[Node]) -> Node {
    let (a, b) = match numbers(name, args) {
        Ok(pair) => pair,
        Err(e) => return e,
    };
    match op {
        Primitive::Add => Node::Number(a.wrapping_add(b)),
        Primitive::Sub => Node::Number(a.wrapping_sub(b)),
        Primitive::Mul => Node::Number(a.wrapping_mul(b)),
        Primitive::Div if b == 0 => Node::error(DIVISION_BY_ZERO),
        Primitive::Div => Node::Number(a.wrapping_div(b)),
        _ => unreachable!("not an arithmetic primitive: {:?}", op),
    }
}

fn comparison(op: Primitive, name: &str, args: &[Node]) -> Node {
    let (a, b) = match numbers(name, args) {
        Ok(pair) => pair,
        Err(e) => return e,
    };
    match op {
        Primitive::Less => Node::Boolean(a < b),
        Primitive::Greater => Node::Boolean(a > b),
        Primitive::Eq => Node::Boolean(a == b),
        _ => unreachable!("not a comparison primitive: {:?}", op),
    }
}
