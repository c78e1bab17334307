//! Parley terminal client.
//!
//! Connects to a translation chat server, sends each typed line for
//! translation, and reports server health as it changes.
//!
//! Run against a local server:
//!   cargo run -p parley-cli -- --lang fr
//!   cargo run -p parley-cli -- --host chat.example.com --secure --room lobby

mod config;
mod terminal;

use clap::Parser;
use parley_client::{ChatClient, ClientCommand, HttpProbe, WebSocketTransport};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::Args;
use crate::terminal::{HELP, Input, TerminalNotifier, TerminalView, parse_input};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("parley=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve()?;

    tracing::info!(
        "Joining {} (translating into {})",
        config.endpoint,
        config.target_lang
    );
    println!("{HELP}");

    let (commands, commands_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_stdin(commands.clone()));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = commands.send(ClientCommand::Quit);
        }
    });

    let mut client = ChatClient::new(
        &config,
        WebSocketTransport::new(),
        HttpProbe::new(config.endpoint.status_url()),
        TerminalView,
        Box::new(TerminalNotifier),
    );
    client.run(commands_rx).await;

    Ok(())
}

async fn read_stdin(commands: mpsc::UnboundedSender<ClientCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Reading input failed: {}", e);
                break;
            }
        };

        match parse_input(&line) {
            Input::Command(command) => {
                if commands.send(command).is_err() {
                    return;
                }
            }
            Input::Help => println!("{HELP}"),
            Input::Invalid(reason) => println!("{reason}"),
        }
    }

    // End of input leaves the chat.
    let _ = commands.send(ClientCommand::Quit);
}
