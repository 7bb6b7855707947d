use std::mem;
use std::rc::Rc;

use serde::{Deserialize, Serialize, Serializer};

use crate::interpreter::stack::ensure_sufficient_stack;

/// Parsed syntax and runtime values share this one type.
///
/// Trees can nest as deep as the input line allows, so cloning, serializing
/// and dropping never lean on the native stack alone.
#[derive(PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Node {
    Definition(Rc<Definition>),
    ParamList(Vec<String>),

    Sequence(#[serde(serialize_with = "serialize_nested")] Vec<Node>),
    DataBlock(#[serde(serialize_with = "serialize_nested")] Vec<Node>),
    Call(#[serde(serialize_with = "serialize_nested")] Vec<Node>),

    Conditional(Box<Conditional>),

    Symbol(String),
    Number(i64),
    PrimitiveOperator(String),
    Boolean(bool),
    String(String),

    Error(String),
}

/// `def`: a function when `params` is present, otherwise a variable whose
/// `body` is the value expression.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub params: Option<Vec<String>>,
    #[serde(serialize_with = "serialize_nested")]
    pub body: Node,
}

#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Conditional {
    #[serde(serialize_with = "serialize_nested")]
    pub condition: Node,
    #[serde(serialize_with = "serialize_nested")]
    pub then_branch: Node,
    #[serde(serialize_with = "serialize_nested")]
    pub else_branch: Node,
}

fn serialize_nested<T: Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    ensure_sufficient_stack(|| value.serialize(serializer))
}

impl Definition {
    pub fn function(name: String, params: Vec<String>, body: Node) -> Definition {
        Definition {
            name,
            params: Some(params),
            body,
        }
    }

    pub fn variable(name: String, value: Node) -> Definition {
        Definition {
            name,
            params: None,
            body: value,
        }
    }

    pub fn is_function(&self) -> bool { self.params.is_some() }

    pub fn arity(&self) -> Option<usize> { self.params.as_ref().map(Vec::len) }

    pub fn param_list(&self) -> Option<Node> { self.params.clone().map(Node::ParamList) }
}

impl Node {
    pub fn error(message: impl Into<String>) -> Node { Node::Error(message.into()) }

    pub fn is_error(&self) -> bool { matches!(self, Node::Error(_)) }

    pub fn kind(&self) -> &'static str {
        match *self {
            Node::Definition(ref d) if d.is_function() => "function",
            Node::Definition(_) => "definition",
            Node::ParamList(_) => "parameter list",
            Node::Sequence(_) => "list",
            Node::DataBlock(_) => "data block",
            Node::Call(_) => "call",
            Node::Conditional(_) => "conditional",
            Node::Symbol(_) => "symbol",
            Node::Number(_) => "number",
            Node::PrimitiveOperator(_) => "primitive",
            Node::Boolean(_) => "boolean",
            Node::String(_) => "string",
            Node::Error(_) => "error",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match *self {
            Node::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> { serde_json::to_string(self) }

    /// Move direct children into `pending`, leaving `self` shallow.
    fn take_children(&mut self, pending: &mut Vec<Node>) {
        match *self {
            Node::Sequence(ref mut items) | Node::DataBlock(ref mut items) | Node::Call(ref mut items) => pending.append(items),
            Node::Conditional(ref mut c) => {
                let c = &mut **c;
                for branch in [&mut c.condition, &mut c.then_branch, &mut c.else_branch] {
                    if branch.has_children() {
                        pending.push(mem::replace(branch, Node::Boolean(false)));
                    }
                }
            }
            // Shared definitions are released by their last owner.
            Node::Definition(ref mut d) => {
                if let Some(d) = Rc::get_mut(d) {
                    if d.body.has_children() {
                        pending.push(mem::replace(&mut d.body, Node::Boolean(false)));
                    }
                }
            }
            _ => (),
        }
    }

    fn has_children(&self) -> bool {
        match *self {
            Node::Sequence(ref items) | Node::DataBlock(ref items) | Node::Call(ref items) => !items.is_empty(),
            Node::Conditional(_) | Node::Definition(_) => true,
            _ => false,
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Node {
        ensure_sufficient_stack(|| match *self {
            Node::Definition(ref d) => Node::Definition(Rc::clone(d)),
            Node::ParamList(ref names) => Node::ParamList(names.clone()),
            Node::Sequence(ref items) => Node::Sequence(items.clone()),
            Node::DataBlock(ref items) => Node::DataBlock(items.clone()),
            Node::Call(ref items) => Node::Call(items.clone()),
            Node::Conditional(ref c) => Node::Conditional(c.clone()),
            Node::Symbol(ref name) => Node::Symbol(name.clone()),
            Node::Number(n) => Node::Number(n),
            Node::PrimitiveOperator(ref name) => Node::PrimitiveOperator(name.clone()),
            Node::Boolean(b) => Node::Boolean(b),
            Node::String(ref s) => Node::String(s.clone()),
            Node::Error(ref message) => Node::Error(message.clone()),
        })
    }
}

// Flatten before dropping; the derived drop glue would recurse once per nesting level.
impl Drop for Node {
    fn drop(&mut self) {
        if !self.has_children() {
            return;
        }
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_line;

    #[test]
    fn test_definition_shapes() {
        let f = Definition::function("f".into(), vec!["a".into(), "b".into()], Node::Symbol("a".into()));
        assert!(f.is_function());
        assert_eq!(f.arity(), Some(2));
        assert_eq!(f.param_list(), Some(Node::ParamList(vec!["a".into(), "b".into()])));

        let v = Definition::variable("x".into(), Node::Number(1));
        assert!(!v.is_function());
        assert_eq!(v.arity(), None);
    }

    #[test]
    fn test_json_tagging() {
        assert_eq!(Node::Number(3).to_json().unwrap(), r#"{"type":"Number","value":3}"#);
    }

    #[test]
    fn test_json_restores_parsed_tree() {
        let node = parse_line("def fact args(n) if eq?(n 0) 1 *(n fact(-(n 1)))", 256).unwrap().unwrap();
        let json = node.to_json().unwrap();
        assert_eq!(serde_json::from_str::<Node>(&json).unwrap(), node);
    }

    #[test]
    fn test_deep_tree_clones_serializes_and_drops() {
        let depth = 100_000;
        let mut node = Node::Number(0);
        for _ in 0..depth {
            node = Node::Sequence(vec![node]);
        }
        let copy = node.clone();
        let json = copy.to_json().unwrap();
        assert!(json.starts_with(r#"{"type":"Sequence","value":[{"type":"Sequence""#));
        drop(copy);
        drop(node);
    }

    #[test]
    fn test_drop_keeps_shared_definition_body() {
        let definition = Rc::new(Definition::variable("x".into(), Node::Sequence(vec![Node::Number(1)])));
        drop(Node::Definition(Rc::clone(&definition)));
        assert_eq!(definition.body, Node::Sequence(vec![Node::Number(1)]));
    }
}
