//! A line-based greeter: asks for a user and password on stdin and logs
//! in through greetd. Handy for poking at a broker from a spare VT.
//!
//! The password is read in the clear. Use it for testing only.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;
use waycrate::prelude::*;
use waycrate::SessionError;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("stdin closed")]
    StdinClosed,
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Greeter(#[from] GreeterError),
}

#[derive(Parser, Debug)]
#[command(name = "console-greeter", about = "Log in through greetd from a terminal")]
struct Cli {
    /// Session command, split on single spaces.
    #[arg(long, env = "WAYCRATE_CMD", default_value = "sway")]
    cmd: String,

    /// Extra session environment, `KEY=VALUE`. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Log in as this user instead of asking.
    #[arg(long)]
    user: Option<String>,

    /// Environment variable holding the broker socket path.
    #[arg(long, default_value = waycrate::SOCKET_ENV)]
    socket_env: String,

    /// How many wrong passwords to allow before giving up.
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Power off instead of exiting when all attempts fail.
    #[arg(long)]
    power_off_on_failure: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("console-greeter: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), DemoError> {
    let config = GreeterConfig::default()
        .command(cli.cmd)
        .env(cli.env)
        .socket_env(cli.socket_env);

    let mut greeter = Greeter::connect(config, NoLock).await;
    if greeter.status() == LoginStatus::ConnectionUnavailable {
        let message = greeter.snapshot().error_message.unwrap_or_default();
        eprintln!("{message}");
        return Ok(());
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    let username = match cli.user {
        Some(user) => user,
        None => {
            let remembered = greeter.snapshot().username;
            let answer = prompt(&mut stdin, &format!("login [{remembered}]: ")).await?;
            if answer.is_empty() { remembered } else { answer }
        }
    };
    greeter.set_username(username);

    for attempt in 1..=cli.attempts {
        let password = prompt(&mut stdin, "password: ").await?;
        match greeter.login(&password).await {
            Ok(LoginStatus::LoginSucceeded) => {
                tracing::info!(user = %greeter.snapshot().username, "session started");
                if let Err(e) = greeter.remember_user() {
                    tracing::warn!(error = %e, "could not save last user");
                }
                greeter.unlock()?;
                return Ok(());
            }
            Ok(status) => {
                tracing::warn!(%status, "login did not complete");
                return Ok(());
            }
            Err(GreeterError::Session(
                e @ (SessionError::MissingCredential | SessionError::BrokerError { .. }),
            )) => {
                eprintln!("{e} ({attempt}/{})", cli.attempts);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if cli.power_off_on_failure {
        if let Err(e) = waycrate::power::power_off().await {
            tracing::warn!(error = %e, "Cannot PowerOff");
        }
    }
    Ok(())
}

async fn prompt(stdin: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<String, DemoError> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    let line = stdin.next_line().await?.ok_or(DemoError::StdinClosed)?;
    Ok(line.trim_end().to_owned())
}
