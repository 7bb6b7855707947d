use std::fmt;
use std::rc::Rc;

use crate::interpreter::node::Node;
use crate::interpreter::primitive::get_primitive_names;

struct Binding {
    name: String,
    value: Node,
    next: Option<Rc<Binding>>,
}

/// Persistent chain of bindings, newest first.
///
/// Cloning is a pointer copy; `define` and `extend` only prepend, so a clone
/// taken before a call never sees the call's bindings.
#[derive(Clone, Default)]
pub struct Env {
    head: Option<Rc<Binding>>,
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|(name, _)| name).collect();
        write!(f, "<Env {}>", names.join(" "))
    }
}

impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Env {
    pub fn new() -> Env { Env::default() }

    /// Primitive operators plus `true` and `false`.
    pub fn new_root() -> Env {
        let mut env = Env::new();
        for name in get_primitive_names() {
            env.define(name.to_string(), Node::PrimitiveOperator(name.to_string()));
        }
        env.define("true".into(), Node::Boolean(true));
        env.define("false".into(), Node::Boolean(false));
        env
    }

    /// Shadow any earlier binding of `name` in this handle.
    pub fn define(&mut self, name: String, value: Node) { *self = self.extend(name, value); }

    /// A new chain with one more binding; `self` is untouched.
    pub fn extend(&self, name: String, value: Node) -> Env {
        Env {
            head: Some(Rc::new(Binding {
                name,
                value,
                next: self.head.clone(),
            })),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> { self.iter().find(|(n, _)| *n == name).map(|(_, value)| value) }

    pub fn iter(&self) -> EnvIter<'_> { EnvIter(self.head.as_deref()) }
}

// Unlink iteratively; a long session builds chains deep enough to overflow a recursive drop.
impl Drop for Env {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut binding) => next = binding.next.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct EnvIter<'a>(Option<&'a Binding>);

impl<'a> Iterator for EnvIter<'a> {
    type Item = (&'a str, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let binding = self.0?;
        self.0 = binding.next.as_deref();
        Some((binding.name.as_str(), &binding.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_bindings() {
        let env = Env::new_root();
        assert_eq!(env.get("+"), Some(&Node::PrimitiveOperator("+".into())));
        assert_eq!(env.get("write"), Some(&Node::PrimitiveOperator("write".into())));
        assert_eq!(env.get("true"), Some(&Node::Boolean(true)));
        assert_eq!(env.get("false"), Some(&Node::Boolean(false)));
        assert_eq!(env.get("nope"), None);
    }

    #[test]
    fn test_newest_binding_wins() {
        let mut env = Env::new();
        env.define("x".into(), Node::Number(1));
        env.define("x".into(), Node::Number(2));
        assert_eq!(env.get("x"), Some(&Node::Number(2)));
        assert_eq!(env.iter().count(), 2);
    }

    #[test]
    fn test_extend_leaves_parent_untouched() {
        let mut env = Env::new();
        env.define("x".into(), Node::Number(1));
        let child = env.extend("x".into(), Node::Number(10)).extend("y".into(), Node::Number(20));
        assert_eq!(child.get("x"), Some(&Node::Number(10)));
        assert_eq!(child.get("y"), Some(&Node::Number(20)));
        assert_eq!(env.get("x"), Some(&Node::Number(1)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_clone_shares_chain() {
        let mut env = Env::new();
        env.define("x".into(), Node::Number(1));
        let saved = env.clone();
        assert_eq!(saved, env);
        env.define("y".into(), Node::Number(2));
        assert_ne!(saved, env);
        assert_eq!(saved.get("y"), None);
    }

    #[test]
    fn test_long_chain_drop() {
        let mut env = Env::new();
        for i in 0..200_000 {
            env.define(format!("v{}", i), Node::Number(i));
        }
        assert_eq!(env.get("v0"), Some(&Node::Number(0)));
        drop(env);
    }
}
