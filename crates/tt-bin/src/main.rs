//! tweet-text entrypoint.
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tweet_text::{Cli, run};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = configure_logging();
    install_panic_hook();

    info!(
        target: "cli",
        command = cli.command.name(),
        legacy = cli.legacy,
        config_override = cli.config.is_some(),
        "startup"
    );
    let output = run(&cli, &mut std::io::stdin().lock())?;
    println!("{output}");
    Ok(())
}

/// Logs go to stderr through a non-blocking writer so stdout stays clean
/// JSON/HTML. Filtered by `RUST_LOG`.
fn configure_logging() -> Option<WorkerGuard> {
    let (nb_writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "cli.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}
