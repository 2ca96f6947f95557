#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod model;
mod protocol;
mod services;

use config::Config;
use services::environment::Environment;
use services::store::{FileStore, KeyValueStore, MemoryStore};
use services::workspace::Workspace;

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_store(config: &Config) -> Box<dyn KeyValueStore> {
    if !config.interactive {
        return Box::new(MemoryStore::new());
    }

    match FileStore::open(&config.state_file) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::error!(
                path = %config.state_file.display(),
                "Failed to open state store, this session will not be saved: {e}"
            );
            Box::new(MemoryStore::new())
        }
    }
}

fn main() {
    let config = Config::from_env();
    init_logging(&config.log_filter);

    let env = if config.interactive {
        Environment::interactive(config.prefers_dark)
    } else {
        Environment::headless()
    };

    let workspace = Workspace::new(open_store(&config), env);
    let mut session = protocol::Session::new(workspace);

    tracing::info!(interactive = config.interactive, "batchdiff-core ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = protocol::guarded(|| session.handle(&line));

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
