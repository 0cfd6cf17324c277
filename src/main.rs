use std::{io, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use relay_mailer::Mailer;
use tracing_subscriber::EnvFilter;

/// Send a plaintext email through the SMTP relay configured by the
/// SMTP_SERVER, SMTP_PORT, SMTP_USERNAME, SMTP_PASSWORD and SMTP_TLS
/// environment variables
#[derive(Parser, Debug)]
#[command(name = "relay-mailer", version)]
struct Cli {
    /// Recipient address
    to_email: String,

    #[arg(allow_hyphen_values = true)]
    subject: String,

    /// Plaintext body
    #[arg(allow_hyphen_values = true)]
    body: String,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // usage errors go to stderr with exit code 1, help and version to stdout
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // before the subscriber, so RUST_LOG may come from .env too
    dotenvy::dotenv().ok();

    // stderr must start with the failure line, so stay quiet unless asked
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = Mailer::from_env().and_then(|mailer| {
        tracing::debug!(config = ?mailer.config(), "configuration loaded");
        mailer.send(&cli.to_email, &cli.subject, &cli.body)
    });

    match result {
        Ok(sent) => {
            println!("{sent}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
