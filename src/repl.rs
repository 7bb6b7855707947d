use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, Reedline, Signal};
use tracing::{info, warn};

use crate::interpreter::Interpreter;
use crate::reader::lexer::{Lexer, Token};

pub const BANNER: &str = "ListScript ready.";
pub const PROMPT: &str = "-> ";
pub const FAREWELL: &str = "Bye!";
pub const QUIT: &str = "bye";

/// Where session input comes from, one line per call.
pub trait LineSource {
    /// `Ok(None)` once the source is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Whether the source displays `prompt` itself.
    fn shows_prompt(&self) -> bool { false }
}

/// Plain buffered lines: files, pipes, tests.
pub struct Lines<R> {
    reader: R,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Lines<R> { Lines { reader } }
}

impl<R: BufRead> LineSource for Lines<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

struct ListPrompt<'a>(&'a str);

impl Prompt for ListPrompt<'_> {
    fn render_prompt_left(&self) -> Cow<'_, str> { Cow::Borrowed(self.0) }

    fn render_prompt_right(&self) -> Cow<'_, str> { Cow::Borrowed("") }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> { Cow::Borrowed("") }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> { Cow::Borrowed("") }

    fn render_prompt_history_search_indicator(&self, history_search: PromptHistorySearch) -> Cow<'_, str> {
        Cow::Owned(format!("(search: {}) ", history_search.term))
    }
}

/// Interactive line editor with in-memory history. Ctrl-C discards the line
/// being edited; Ctrl-D ends the session.
pub struct Editor {
    editor: Reedline,
}

impl Editor {
    pub fn new() -> Editor { Editor { editor: Reedline::create() } }
}

impl Default for Editor {
    fn default() -> Self { Editor::new() }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            match entered(self.editor.read_line(&ListPrompt(prompt))?) {
                Entered::Line(line) => return Ok(Some(line)),
                Entered::Cancelled => continue,
                Entered::Closed => return Ok(None),
            }
        }
    }

    fn shows_prompt(&self) -> bool { true }
}

#[derive(Debug, PartialEq)]
enum Entered {
    Line(String),
    Cancelled,
    Closed,
}

fn entered(signal: Signal) -> Entered {
    match signal {
        Signal::Success(line) => Entered::Line(line),
        Signal::CtrlC => Entered::Cancelled,
        _ => Entered::Closed,
    }
}

fn is_quit(line: &str, max_token_len: usize) -> bool {
    matches!(Lexer::new(line, max_token_len).next_token(), Ok(Some(Token::Atom(ref a))) if a == QUIT)
}

/// Handle one line; `false` once the session should end.
pub fn step<W: Write>(interpreter: &mut Interpreter<W>, line: &str) -> io::Result<bool> {
    let config = interpreter.config().clone();
    if is_quit(line, config.max_token_len) {
        writeln!(interpreter.output_mut(), "{}", FAREWELL)?;
        return Ok(false);
    }
    let node = match interpreter.parse(line) {
        Ok(Some(node)) => node,
        Ok(None) => return Ok(true),
        Err(e) => {
            warn!("{}", e);
            writeln!(interpreter.output_mut(), "{}", e)?;
            return Ok(true);
        }
    };
    if config.dump_ast {
        writeln!(interpreter.output_mut(), "ast: {}", node.to_json()?)?;
    }
    let result = interpreter.evaluate(&node);
    writeln!(interpreter.output_mut(), "{}", result)?;
    Ok(true)
}

/// Banner, then prompt/read/evaluate/print until `bye` or the end of `source`.
pub fn run<S: LineSource, W: Write>(source: &mut S, interpreter: &mut Interpreter<W>) -> io::Result<()> {
    writeln!(interpreter.output_mut(), "{}", BANNER)?;
    loop {
        if !source.shows_prompt() {
            write!(interpreter.output_mut(), "{}", PROMPT)?;
        }
        interpreter.output_mut().flush()?;
        let Some(line) = source.read_line(PROMPT)? else {
            info!("input exhausted, ending session");
            break;
        };
        if !step(interpreter, &line)? {
            info!("session closed by {}", QUIT);
            break;
        }
    }
    interpreter.output_mut().flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;

    fn session_with(input: &str, config: Config) -> String {
        let mut source = Lines::new(Cursor::new(input.as_bytes()));
        let mut interpreter = Interpreter::new(Vec::<u8>::new(), config);
        run(&mut source, &mut interpreter).unwrap();
        String::from_utf8(interpreter.into_output()).unwrap()
    }

    fn session(input: &str) -> String { session_with(input, Config::default()) }

    #[test]
    fn test_banner_prompt_and_result() {
        assert_eq!(session("+(1 2)\n"), "ListScript ready.\n-> 3\n-> ");
    }

    #[test]
    fn test_empty_input_ends_silently() {
        assert_eq!(session(""), "ListScript ready.\n-> ");
    }

    #[test]
    fn test_bye() {
        assert_eq!(session("bye\n+(1 2)\n"), "ListScript ready.\n-> Bye!\n");
        assert_eq!(session("  bye ; done\n"), "ListScript ready.\n-> Bye!\n");
    }

    #[test]
    fn test_quoted_bye_is_not_quit() {
        assert_eq!(session("\"bye\"\n"), "ListScript ready.\n-> \"bye\"\n-> ");
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        assert_eq!(session("\n; note\n7\n"), "ListScript ready.\n-> -> -> 7\n-> ");
    }

    #[test]
    fn test_errors_are_printed_and_session_continues() {
        let out = session("nope\n/(1 0)\nif true 1\n5\n");
        assert_eq!(
            out,
            "ListScript ready.\n-> Error: Undefined symbol 'nope'\n-> Error: Division by zero\n-> Parse error: unexpected end of input in if else-branch\n-> 5\n-> "
        );
    }

    #[test]
    fn test_definitions_persist_across_lines() {
        let out = session("def sq args(x) *(x x)\ndef y sq(4)\n+(y 1)\n");
        assert_eq!(out, "ListScript ready.\n-> true\n-> 16\n-> 17\n-> ");
    }

    #[test]
    fn test_write_output_precedes_result() {
        assert_eq!(session("write(list(1 \"a\"))\n"), "ListScript ready.\n-> list(1 \"a\")\ntrue\n-> ");
    }

    #[test]
    fn test_dump_ast() {
        let config = Config {
            dump_ast: true,
            ..Config::default()
        };
        let out = session_with("42\n", config);
        assert_eq!(out, "ListScript ready.\n-> ast: {\"type\":\"Number\",\"value\":42}\n42\n-> ");
    }

    #[test]
    fn test_ctrl_c_keeps_editing() {
        assert_eq!(entered(Signal::Success("1".into())), Entered::Line("1".into()));
        assert_eq!(entered(Signal::CtrlC), Entered::Cancelled);
        assert_eq!(entered(Signal::CtrlD), Entered::Closed);
    }

    #[test]
    fn test_deeply_nested_line_does_not_end_session() {
        let depth = 200_000;
        let input = format!("{}{}\n+(1 2)\n", "(".repeat(depth), ")".repeat(depth));
        let out = session_with(&input, Config::default());
        assert!(out.starts_with("ListScript ready.\n-> list(list("));
        assert!(out.ends_with(")\n-> 3\n-> "));
    }

    #[test]
    fn test_deep_ast_dump() {
        let config = Config {
            dump_ast: true,
            ..Config::default()
        };
        let depth = 50_000;
        let input = format!("{}{}\n", "(".repeat(depth), ")".repeat(depth));
        let out = session_with(&input, config);
        assert!(out.starts_with("ListScript ready.\n-> ast: {\"type\":\"Sequence\""));
        assert!(out.ends_with(")\n-> "));
    }

    #[test]
    fn test_token_limit_from_config() {
        let config = Config {
            max_token_len: 4,
            ..Config::default()
        };
        let out = session_with("abcdef\n", config);
        assert_eq!(out, "ListScript ready.\n-> Parse error: token too long (6 characters, limit is 4)\n-> ");
    }
}
