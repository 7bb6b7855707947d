use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use listscript::config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKEN_LEN};
use listscript::repl::{self, Editor, Lines};
use listscript::{Config, Interpreter};

#[derive(Parser, Debug)]
#[command(name = "listscript", version, about = "Line-at-a-time interpreter for the ListScript list language")]
struct Cli {
    /// Run the lines of this file instead of an interactive session
    script: Option<PathBuf>,

    /// Nested user-function calls allowed before evaluation reports an error
    #[arg(long, env = "LISTSCRIPT_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Longest atom or string literal, in characters
    #[arg(long, env = "LISTSCRIPT_MAX_TOKEN_LEN", default_value_t = DEFAULT_MAX_TOKEN_LEN)]
    max_token_len: usize,

    /// Print each parsed line as JSON before evaluating it
    #[arg(long, env = "LISTSCRIPT_DUMP_AST")]
    dump_ast: bool,

    /// Read stdin line by line without the line editor
    #[arg(long)]
    plain: bool,

    /// Log filter, e.g. `debug` or `listscript::interpreter=trace`
    #[arg(long, env = "LISTSCRIPT_LOG", default_value = "warn")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "LISTSCRIPT_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            max_depth: self.max_depth,
            max_token_len: self.max_token_len,
            dump_ast: self.dump_ast,
        }
    }
}

fn init_logging(cli: &Cli) -> io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_timer(ChronoLocal::rfc_3339());
    match cli.log_file {
        Some(ref path) => {
            let file = File::options().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_ansi(false).with_writer(writer).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(io::stderr).init();
            Ok(None)
        }
    }
}

fn run(cli: &Cli) -> io::Result<()> {
    let mut interpreter = Interpreter::new(io::stdout(), cli.config());
    info!("starting session with {:?}", interpreter.config());
    match cli.script {
        Some(ref path) => repl::run(&mut Lines::new(BufReader::new(File::open(path)?)), &mut interpreter),
        None if cli.plain || !io::stdin().is_terminal() => repl::run(&mut Lines::new(io::stdin().lock()), &mut interpreter),
        None => repl::run(&mut Editor::new(), &mut interpreter),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("listscript: cannot open log file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("session failed: {}", e);
            eprintln!("listscript: {}", e);
            ExitCode::FAILURE
        }
    }
}
