use std::fmt;

use crate::interpreter::node::Node;
use crate::interpreter::stack::ensure_sufficient_stack;

fn write_items(f: &mut fmt::Formatter, tag: &str, items: &[Node]) -> fmt::Result {
    write!(f, "{}(", tag)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { ensure_sufficient_stack(|| self.render_into(f)) }
}

impl Node {
    fn render_into(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Node::Number(n) => write!(f, "{}", n),
            Node::Boolean(b) => write!(f, "{}", b),
            Node::Symbol(ref name) | Node::PrimitiveOperator(ref name) => write!(f, "{}", name),
            Node::String(ref s) => write!(f, "\"{}\"", s),
            Node::Error(ref message) => write!(f, "Error: {}", message),
            Node::Sequence(ref items) => write_items(f, "list", items),
            Node::Call(ref items) => write_items(f, "func_call", items),
            Node::DataBlock(ref items) => write_items(f, "data", items),
            Node::ParamList(ref names) => write!(f, "args({})", names.join(" ")),
            Node::Conditional(ref c) => write!(f, "if({} {} {})", c.condition, c.then_branch, c.else_branch),
            Node::Definition(ref d) => match d.param_list() {
                Some(params) => write!(f, "def({} {} {})", d.name, params, d.body),
                None => write!(f, "def({} {})", d.name, d.body),
            },
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self) }
}

/// Display text for a possibly absent node.
pub fn render(node: Option<&Node>) -> String {
    match node {
        Some(node) => node.to_string(),
        None => "nil".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_line;

    fn parsed(src: &str) -> String { render(parse_line(src, 256).unwrap().as_ref()) }

    #[test]
    fn test_leaves() {
        assert_eq!(render(Some(&Node::Number(-12))), "-12");
        assert_eq!(render(Some(&Node::Boolean(true))), "true");
        assert_eq!(render(Some(&Node::Boolean(false))), "false");
        assert_eq!(render(Some(&Node::Symbol("x".into()))), "x");
        assert_eq!(render(Some(&Node::PrimitiveOperator("+".into()))), "+");
        assert_eq!(render(Some(&Node::String("a b".into()))), "\"a b\"");
        assert_eq!(render(Some(&Node::error("Division by zero"))), "Error: Division by zero");
    }

    #[test]
    fn test_nil() {
        assert_eq!(render(None), "nil");
        assert_eq!(parsed("; comment"), "nil");
    }

    #[test]
    fn test_compound() {
        assert_eq!(parsed("list(1 list(2 3) \"s\")"), "list(1 list(2 3) \"s\")");
        assert_eq!(parsed("data(a 1)"), "data(a 1)");
        assert_eq!(parsed("+(1 2)"), "func_call(+ 1 2)");
        assert_eq!(parsed("list()"), "list()");
    }

    #[test]
    fn test_definitions_and_conditionals() {
        assert_eq!(parsed("def sq args(x) *(x x)"), "def(sq args(x) func_call(* x x))");
        assert_eq!(parsed("def y 3"), "def(y 3)");
        assert_eq!(parsed("if a 1 2"), "if(a 1 2)");
    }
}
