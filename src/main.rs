//! `keepsake` command-line entry point.

use clap::Parser;

use keepsake::cli::args::Cli;
use keepsake::cli::commands;
use keepsake::error::ExitCode;
use keepsake::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::USAGE_ERROR
            } else {
                ExitCode::SUCCESS
            };
            std::process::exit(code);
        }
    };

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    // A second signal forces exit while the first drains gracefully.
    tokio::spawn(async {
        #[cfg(unix)]
        {
            let Ok(mut sigterm) =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            else {
                tracing::warn!("failed to register SIGTERM handler");
                return;
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
                _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            let _ = tokio::signal::ctrl_c().await;
            std::process::exit(ExitCode::INTERRUPTED);
        }
    });

    match commands::dispatch(cli).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
