mod cli;

use chat_client::{
    ConnectionStatus, ConversationController, ErrorInfo, FileStore, HttpRelayClient,
    KeyValueStore, RelayApi, Turn,
};
use cli::{CliError, CliOptions, ReplCommand};
use shared::config::{ClientConfig, load_dotenv};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            print_usage();
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "chat_client=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load client config");
            std::process::exit(1);
        }
    };
    if let Some(api_url) = options.api_url {
        config.relay_api_url = api_url;
    }
    if let Some(store_path) = options.store_path {
        config.store_path = store_path;
    }

    let relay = match HttpRelayClient::new(&config.relay_api_url) {
        Ok(relay) => relay,
        Err(err) => {
            error!(error = %err, "failed to build relay client");
            std::process::exit(1);
        }
    };
    info!(
        relay = relay.base_url(),
        store = %config.store_path.display(),
        "starting chat client"
    );

    let controller = ConversationController::new(relay, FileStore::new(config.store_path.clone()));
    if let Err(err) = run_repl(controller).await {
        error!(error = %err, "terminal session failed");
        std::process::exit(1);
    }
}

async fn run_repl<R, S>(mut controller: ConversationController<R, S>) -> std::io::Result<()>
where
    R: RelayApi,
    S: KeyValueStore,
{
    let state = controller.load();
    if !state.storage_available {
        println!("! Local storage is unavailable; this conversation will not be saved.");
    }
    for turn in &state.turns {
        print_turn(turn);
    }

    let status = controller.check_connection().await;
    println!("[{}]", status.label());
    if status == ConnectionStatus::Disconnected {
        println!("! The relay is unreachable. Start it and restart this client.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => print_commands(),
            ReplCommand::Unknown(command) => println!("Unknown command: {command}"),
            ReplCommand::Session => {
                let info = controller.storage_info();
                println!(
                    "session {} (storage {}, saved conversation: {})",
                    info.session_id,
                    if info.available { "available" } else { "unavailable" },
                    if info.has_conversation { "yes" } else { "no" }
                );
            }
            ReplCommand::Clear => match controller.clear_conversation() {
                Ok(()) => println!("Conversation cleared."),
                Err(err) => print_error(&err),
            },
            ReplCommand::Retry => {
                report(controller.retry_last_message().await, "Nothing to retry.")
            }
            ReplCommand::Send(message) => {
                let outcome = controller.send_message(&message).await;
                if controller.state().connection == ConnectionStatus::Disconnected {
                    report(outcome, "Not connected to the relay.");
                } else {
                    report(outcome, "");
                }
            }
        }
    }

    Ok(())
}

fn report(outcome: Result<Option<Turn>, ErrorInfo>, skipped: &str) {
    match outcome {
        Ok(Some(reply)) => print_turn(&reply),
        Ok(None) if !skipped.is_empty() => println!("{skipped}"),
        Ok(None) => {}
        Err(err) => print_error(&err),
    }
}

fn print_turn(turn: &Turn) {
    println!(
        "[{}] {}: {}",
        turn.timestamp.format("%H:%M"),
        turn.role.as_str(),
        turn.content
    );
}

fn print_error(err: &ErrorInfo) {
    if err.retryable {
        println!("! {} (type /retry to try again)", err.message);
    } else {
        println!("! {}", err.message);
    }
}

async fn prompt() -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await
}

fn print_commands() {
    println!(
        "Commands:\n\
         /retry    Resend the last message\n\
         /clear    Start a new conversation\n\
         /session  Show session and storage details\n\
         /quit     Leave the chat"
    );
}

fn print_usage() {
    eprintln!(
        "Usage: scoper-chat [--api-url URL] [--store PATH]\n\
         \n\
         Options:\n\
         - --api-url URL  Relay base URL (default: RELAY_API_URL or http://localhost:8787)\n\
         - --store PATH   Conversation store file (default: CHAT_STORE_PATH or .scoper-chat/store.json)\n\
         - --help         Show this help text"
    );
}
