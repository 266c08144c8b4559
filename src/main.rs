#![windows_subsystem = "windows"]
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use translate_core::protocol::{self, outbox, Session};
use translate_core::{logging, ConfigOverrides, CoreConfig};

#[derive(Parser, Debug)]
#[command(
    name = "translate-core",
    version,
    about = "Translation assistant core speaking JSON lines on stdin/stdout"
)]
struct Cli {
    /// Directory holding history.json (default: $XDG_DATA_HOME/translate-core)
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Directory holding settings.json (default: $XDG_CONFIG_HOME/translate-core)
    #[arg(long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Translation server base URL (overrides settings.json)
    #[arg(short = 's', long = "server-url")]
    server_url: Option<String>,

    /// API key sent with translate requests (overrides settings.json)
    #[arg(short = 'k', long = "api-key")]
    api_key: Option<String>,

    /// Debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = CoreConfig::from_env(ConfigOverrides {
        data_dir: cli.data_dir,
        config_dir: cli.config_dir,
        server_url: cli.server_url,
        api_key: cli.api_key,
    });

    let (tx, rx) = outbox::channel();
    thread::Builder::new()
        .name("outbox-writer".into())
        .spawn(move || outbox::run_writer(rx, io::stdout()))
        .context("failed to start output writer")?;

    let mut session = Session::new(config, tx).context("failed to start session")?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| session.handle(&line)));

        if result.is_err() {
            let _ = session
                .outbox()
                .send(outbox::Outgoing::Line(protocol::internal_error()));
        }
    }

    // Workers still in flight are abandoned; only already-queued replies are written.
    outbox::flush(session.outbox());
    Ok(())
}
