mod repl;

use std::fs;
use std::process::exit;

use anyhow::Context;
use clap::Parser;
use rbasic::cli::{init_tracing, Cli};
use rbasic::{Session, Source};
use repl::Repl;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Some(script) = &cli.script {
        let code =
            fs::read_to_string(script).with_context(|| format!("script `{}`", script.display()))?;
        let label = script.display().to_string();

        let mut session = Session::with_config(cli.config());
        for (n, line) in code.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match session.run_source(Source::with_first_line(label.as_str(), line, n)) {
                Ok(value) => println!("{value}"),
                Err(e) => {
                    repl::report(&e, cli.pretty);
                    exit(1);
                }
            }
        }
    } else {
        repl(Repl::new(Session::with_config(cli.config()), cli.pretty))?;
    }

    Ok(())
}

fn repl(mut state: Repl) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("basic > ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(&line)?;
                state.rep(&line);
            }
            Err(ReadlineError::Eof) => return Ok(()),
            Err(ReadlineError::Interrupted) => {
                eprintln!("user exit");
                exit(1);
            }
            Err(e) => return Err(e),
        }
    }
}
