use std::io::Write;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::interpreter::env::Env;
use crate::interpreter::error::{NOT_BOOLEAN_CONDITION, NOT_CALLABLE, NOT_EVALUABLE, RECURSION_LIMIT, UNDEFINED_SYMBOL};
use crate::interpreter::node::{Definition, Node};
use crate::interpreter::primitive::primitive;
use crate::interpreter::stack::ensure_sufficient_stack;
use crate::{error_value, propagate};

/// Tree-walking evaluator for one top-level expression.
///
/// Errors are ordinary `Node::Error` values: every place that combines
/// sub-results returns the first error it sees, left to right.
pub struct Evaluator<'a> {
    out: &'a mut dyn Write,
    max_depth: usize,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(out: &'a mut dyn Write, max_depth: usize) -> Evaluator<'a> { Evaluator { out, max_depth, depth: 0 } }

    /// `env` is the caller's handle: a `def` evaluated here rebinds it.
    pub fn eval(&mut self, node: &Node, env: &mut Env) -> Node { ensure_sufficient_stack(|| self.eval_node(node, env)) }

    fn eval_node(&mut self, node: &Node, env: &mut Env) -> Node {
        trace!("eval / {}", node);
        match *node {
            Node::Number(_) | Node::Boolean(_) | Node::String(_) | Node::PrimitiveOperator(_) | Node::Error(_) | Node::DataBlock(_) => node.clone(),

            Node::Symbol(ref name) => match env.get(name) {
                Some(value) => value.clone(),
                None => error_value!("{} '{}'", UNDEFINED_SYMBOL, name),
            },

            // A group headed by a name is a call; anything else is literal data.
            Node::Sequence(ref items) => match items.first() {
                Some(Node::Symbol(_)) | Some(Node::PrimitiveOperator(_)) => self.eval_call(items, env),
                _ => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(propagate!(self.eval(item, env)));
                    }
                    Node::Sequence(values)
                }
            },

            Node::Call(ref items) => self.eval_call(items, env),

            Node::Definition(ref d) => self.eval_definition(d, env),

            Node::Conditional(ref c) => match propagate!(self.eval(&c.condition, env)) {
                Node::Boolean(true) => self.eval(&c.then_branch, env),
                Node::Boolean(false) => self.eval(&c.else_branch, env),
                _ => Node::error(NOT_BOOLEAN_CONDITION),
            },

            Node::ParamList(_) => Node::error(NOT_EVALUABLE),
        }
    }

    fn eval_call(&mut self, items: &[Node], env: &mut Env) -> Node {
        let Some((head, rest)) = items.split_first() else { return Node::Sequence(Vec::new()) };
        let op = propagate!(self.eval(head, env));
        let mut args = Vec::with_capacity(rest.len());
        for arg in rest {
            args.push(propagate!(self.eval(arg, env)));
        }
        match op {
            Node::PrimitiveOperator(ref name) => primitive(name, &args, &mut *self.out),
            Node::Definition(ref d) if d.is_function() => self.apply(d, args, env),
            _ => Node::error(NOT_CALLABLE),
        }
    }

    /// Call a user function. The body runs in an extension of the caller's
    /// environment (dynamic scope), holding the function itself and its arguments.
    fn apply(&mut self, function: &Rc<Definition>, args: Vec<Node>, env: &Env) -> Node {
        let params = function.params.as_deref().unwrap_or_default();
        let arity = function.arity().unwrap_or_default();
        if arity != args.len() {
            error_value!(
                "Arity mismatch: '{}' expects {} argument{}, got {}",
                function.name,
                arity,
                if arity == 1 { "" } else { "s" },
                args.len()
            )
        }
        if self.depth >= self.max_depth {
            error_value!("{} ({})", RECURSION_LIMIT, self.max_depth)
        }

        let mut local = env.extend(function.name.clone(), Node::Definition(function.clone()));
        for (name, value) in params.iter().zip(args) {
            local.define(name.clone(), value);
        }

        self.depth += 1;
        let result = self.eval(&function.body, &mut local);
        self.depth -= 1;
        result
    }

    fn eval_definition(&mut self, definition: &Rc<Definition>, env: &mut Env) -> Node {
        if definition.is_function() {
            debug!("def / function {} {:?}", definition.name, definition.params);
            env.define(definition.name.clone(), Node::Definition(definition.clone()));
            return Node::Boolean(true);
        }
        // Bound even when it is an error, so later lookups report the original failure.
        let value = self.eval(&definition.body, env);
        debug!("def / {} = {}", definition.name, value);
        env.define(definition.name.clone(), value.clone());
        value
    }
}
