//! Entry point for the pre-render command.

use std::io::Write;
use std::process::ExitCode;

use site_l10n::cli::{
    self,
    Args,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let args = match Args::parse(pico_args::Arguments::from_env()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            let _ = std::io::stdout().write_all(cli::USAGE.as_bytes());
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            tracing::error!("{e}");
            let _ = std::io::stderr().write_all(cli::USAGE.as_bytes());
            return ExitCode::from(2);
        }
    };

    match cli::run(&args).await {
        Ok(summary) => {
            tracing::info!(init = ?summary.init, locale = ?summary.final_locale, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
