use std::io;

use rbasic::{Error, Session};

const STDIN: &str = "<stdin>";

#[derive(Debug)]
pub struct Repl {
    session: Session,
    pretty: bool,
}

impl Repl {
    pub fn new(session: Session, pretty: bool) -> Self {
        Self { session, pretty }
    }

    pub fn rep(&mut self, input: &str) {
        match self.session.run(STDIN, input) {
            Ok(value) => println!("{value}"),
            Err(e) => report(&e, self.pretty),
        }
    }
}

pub fn report(e: &Error, pretty: bool) {
    if pretty && e.write_pretty(io::stderr(), true).is_ok() {
        return;
    }
    eprintln!("{e}");
}
