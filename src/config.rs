pub const DEFAULT_MAX_DEPTH: usize = 10_000;
pub const DEFAULT_MAX_TOKEN_LEN: usize = 256;

/// Limits and switches for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Nested user-function calls allowed before evaluation reports an error.
    pub max_depth: usize,
    /// Longest atom or string, in characters.
    pub max_token_len: usize,
    /// Print each parsed line as JSON before evaluating it.
    pub dump_ast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
            dump_ast: false,
        }
    }
}
