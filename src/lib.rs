pub mod cli;
mod error;
mod exec;
mod parse;
mod scan;
mod span;
mod utils;

pub use error::{excerpt, Error, ErrorKind, TraceFrame, Traceback};
pub use exec::{
    Env, ExecError, Fault, Frame, FrameId, Interpreter, Num, Number, Scope, ScopeId,
    PROGRAM_FRAME,
};
pub use parse::{expr, ParseError, Parser, DEFAULT_MAX_DEPTH};
pub use scan::{Keyword, Lexeme, ScanError, ScanErrorKind, Scanner, Token};
pub use span::{Position, Source, Span, Spanned};

use std::sync::Arc;

use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How deeply expressions may nest before parsing fails.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// An interpreter whose variables survive from one run to the next.
#[derive(Debug, Default)]
pub struct Session {
    intp: Interpreter,
    config: Config,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            intp: Interpreter::default(),
            config,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Scans, parses and evaluates `text`, reporting positions under `label`.
    pub fn run(&mut self, label: &str, text: &str) -> Result<Number, Error> {
        self.run_source(Source::new(label, text))
    }

    #[instrument(level = "debug", skip_all, fields(label = source.label()))]
    pub fn run_source(&mut self, source: Arc<Source>) -> Result<Number, Error> {
        let lexemes = Scanner::starting_at(source.text(), source.start())
            .scan()
            .map_err(|e| Error::scan(source.clone(), e))?;

        let expr = Parser::new(&lexemes)
            .with_max_depth(self.config.max_depth)
            .parse()
            .map_err(|e| Error::parse(source.clone(), e))?;

        let value = self
            .intp
            .eval(&expr)
            .map_err(|e| Error::exec(source.clone(), e))?;

        debug!(%value, "evaluated");
        Ok(value)
    }

    pub fn get(&self, name: &str) -> Option<&Number> {
        self.intp.get(name)
    }

    pub fn set(&mut self, name: &str, value: Number) {
        self.intp.set(name, value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Number> {
        self.intp.remove(name)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.intp
    }
}

/// Evaluates `text` in a fresh session.
pub fn run(label: &str, text: &str) -> Result<Number, Error> {
    Session::new().run(label, text)
}
