//! Command-line and environment configuration

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use numina::{Calculator, SymbolicDelegate, SympyDelegate, Unavailable};

use crate::DEFAULT_BODY_LIMIT;

/// Port the browser extension posts to
pub const DEFAULT_PORT: u16 = 8765;

#[derive(Parser, Debug)]
#[command(name = "numina-server")]
#[command(about = "Local math evaluation service")]
#[command(after_help = "\
EXAMPLES:
    # Serve on 127.0.0.1:8765 with the SymPy sidecar on its default port
    numina-server

    # Numeric evaluation only
    numina-server serve --no-symbolic

    # Interactive session that prints timing after every line
    numina-server repl --metrics
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Host to bind to
    #[arg(long, global = true, env = "NUMINA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, global = true, env = "NUMINA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the SymPy sidecar
    #[arg(long, global = true, env = "NUMINA_SYMPY_URL", default_value = SympyDelegate::DEFAULT_URL)]
    pub sympy_url: String,

    /// Bound on one symbolic delegate call, in milliseconds
    #[arg(long, global = true, env = "NUMINA_DELEGATE_TIMEOUT_MS", default_value_t = 5000)]
    pub delegate_timeout_ms: u64,

    /// Largest accepted request body, in bytes
    #[arg(long, global = true, env = "NUMINA_MAX_BODY_BYTES", default_value_t = DEFAULT_BODY_LIMIT)]
    pub max_body_bytes: usize,

    /// Disable symbolic evaluation; symbolic forms report "not implemented"
    #[arg(long, global = true, env = "NUMINA_NO_SYMBOLIC")]
    pub no_symbolic: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP evaluation service (default)
    Serve,
    /// Evaluate lines from stdin, keeping `Ans` between them
    Repl {
        /// Print the metrics report after each result
        #[arg(long)]
        metrics: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn delegate_timeout(&self) -> Duration {
        Duration::from_millis(self.delegate_timeout_ms)
    }

    /// Calculator wired to the configured delegate
    pub fn calculator(&self) -> Calculator {
        let delegate: Arc<dyn SymbolicDelegate> = if self.no_symbolic {
            Arc::new(Unavailable)
        } else {
            Arc::new(SympyDelegate::new(self.sympy_url.as_str()))
        };
        Calculator::new(delegate).with_delegate_timeout(self.delegate_timeout())
    }
}
