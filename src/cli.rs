use std::path::PathBuf;

use clap::Parser;

use crate::{Config, DEFAULT_MAX_DEPTH};

#[derive(Debug, Parser)]
#[command(name = "basic", version, about = "Evaluate BASIC-style expressions")]
pub struct Cli {
    /// Execute a script, one expression per line
    pub script: Option<PathBuf>,

    /// Deepest expression nesting accepted by the parser
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Render errors as annotated reports
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            max_depth: self.max_depth,
        }
    }
}

/// Installs a stderr subscriber, but only when `RUST_LOG` is set.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["basic"]);
        assert!(cli.script.is_none());
        assert!(!cli.pretty);
        assert_eq!(cli.config(), Config::default());
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from(["basic", "--max-depth", "16", "--pretty", "prog.bas"]);
        assert_eq!(cli.script, Some(PathBuf::from("prog.bas")));
        assert!(cli.pretty);
        assert_eq!(cli.config().max_depth, 16);
    }
}
