/// Return a formatted `Node::Error` from the enclosing function.
#[macro_export]
macro_rules! error_value {
    ($($arg:tt)*) => (
        return $crate::interpreter::node::Node::Error(format!($($arg)*))
    )
}

/// Evaluate to the node, or return it from the enclosing function if it is an error.
#[macro_export]
macro_rules! propagate {
    ($node:expr) => {
        match $node {
            node @ $crate::interpreter::node::Node::Error(_) => return node,
            node => node,
        }
    };
}

pub const UNDEFINED_SYMBOL: &str = "Undefined symbol";
pub const NOT_CALLABLE: &str = "Cannot apply a non-function or undefined operator";
pub const NOT_BOOLEAN_CONDITION: &str = "'if' condition must be a boolean";
pub const NOT_EVALUABLE: &str = "Cannot evaluate expression of this type";
pub const DIVISION_BY_ZERO: &str = "Division by zero";
pub const RECURSION_LIMIT: &str = "Recursion depth limit exceeded";
