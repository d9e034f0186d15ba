//! Command-line interface parsing and handling.
//!
//! Without a subcommand the interactive UI starts. The remaining subcommands
//! are one-shot: they talk to the backend (or the config file), print, and
//! exit with status 1 on failure.

pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ratatui::crossterm::terminal;
use tracing::debug;

use crate::api::client::ChatApi;
use crate::api::{ChatBackend, Message};
use crate::cli::say::run_say;
use crate::core::config::data::SERVER_ENV_VAR;
use crate::core::config::Config;
use crate::core::controller::{ChatController, ControllerOptions};
use crate::ui::chat_loop::run_chat;
use crate::ui::markdown::{render_transcript, MessageRenderConfig};
use crate::ui::state::UiState;
use crate::ui::theme::Theme;
use crate::utils::logging::{self, LogTarget};
use crate::utils::time::short_timestamp;
use crate::utils::url::parse_server_url;

const FALLBACK_PRINT_WIDTH: usize = 80;

#[derive(Parser, Debug)]
#[command(name = "chatline")]
#[command(version)]
#[command(about = "A full-screen terminal client for a session-based chat backend")]
#[command(
    long_about = "chatline talks to a chat server over HTTP: list conversations, open one, \
and exchange messages in a full-screen terminal UI with markdown rendering.\n\n\
Server selection (first match wins):\n\
  --server URL        Command-line flag\n\
  CHATLINE_SERVER     Environment variable\n\
  server              Key in the config file (see 'chatline config')\n\n\
Controls:\n\
  Enter               Send the message (Shift+Enter or Alt+Enter for a new line)\n\
  Tab                 Switch focus between the chat list and the composer\n\
  Up/Down, Enter      Move through and open chats in the list\n\
  Ctrl+N              Create a new chat\n\
  Ctrl+R              Reload the chat list\n\
  PgUp/PgDn, Mouse    Scroll the transcript\n\
  Ctrl+C, Ctrl+Q      Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat server origin, e.g. http://127.0.0.1:8080
    #[arg(short = 's', long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List chats, most recent first
    List,
    /// Create a chat; an empty title gets a timestamped one
    New {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Print the transcript of a chat
    History {
        /// Session identifier, as shown by `chatline list`
        session_id: String,
    },
    /// Send a message and print the reply
    Say {
        /// Session identifier, as shown by `chatline list`
        session_id: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    /// Check whether the server is reachable
    Health,
    /// Set a configuration value
    Set {
        key: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset { key: String },
    /// Show the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

/// Print `❌ <err>` and exit non-zero. One-shot commands funnel failures here.
fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("❌ {err}");
    process::exit(1);
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.unwrap_or(Commands::Chat);
    let interactive = command == Commands::Chat;
    logging::init(LogTarget::for_mode(args.log.as_deref(), interactive))?;

    let mut config = Config::load().unwrap_or_else(|e| fail(e));

    match command {
        Commands::Set { key, value } => {
            let message = config
                .set_value(&key, &value.join(" "))
                .unwrap_or_else(|e| fail(e));
            config.save().unwrap_or_else(|e| fail(e));
            println!("{message}");
            Ok(())
        }
        Commands::Unset { key } => {
            let message = config.unset_value(&key).unwrap_or_else(|e| fail(e));
            config.save().unwrap_or_else(|e| fail(e));
            println!("{message}");
            Ok(())
        }
        Commands::Config => {
            config.print_all();
            Ok(())
        }
        Commands::Chat => {
            let api = build_api(&config, args.server.as_deref())?;
            let server_label = api.server().to_string();
            let controller = Arc::new(ChatController::with_options(
                Arc::new(api),
                ControllerOptions {
                    discard_stale_responses: config.discard_stale(),
                },
            ));
            let ui_state = UiState::new(
                Theme::from_name(config.theme_or_default()),
                config.markdown_enabled(),
                config.syntax_enabled(),
                server_label,
            );
            run_chat(controller, config.health_interval(), ui_state).await
        }
        one_shot => {
            let api = build_api(&config, args.server.as_deref()).unwrap_or_else(|e| fail(e));
            run_one_shot(one_shot, api, &config).await;
            Ok(())
        }
    }
}

fn build_api(config: &Config, cli_server: Option<&str>) -> Result<ChatApi, Box<dyn Error>> {
    let env_server = std::env::var(SERVER_ENV_VAR).ok();
    let server = config.resolve_server(cli_server, env_server.as_deref());
    debug!(%server, "resolved server");
    let url = parse_server_url(&server)?;
    Ok(ChatApi::new(url, config.request_timeout())?)
}

async fn run_one_shot(command: Commands, api: ChatApi, config: &Config) {
    match command {
        Commands::List => {
            let chats = api.list_chats().await.unwrap_or_else(|e| fail(e));
            if chats.is_empty() {
                println!("No chats yet. Create one with `chatline new [TITLE]`.");
            }
            for chat in chats {
                println!(
                    "{}  {}  ({})",
                    chat.session_id,
                    chat.title,
                    short_timestamp(&chat.updated_at)
                );
            }
        }
        Commands::New { title } => {
            let controller = ChatController::new(Arc::new(api));
            let chat = controller
                .create_chat(&title.join(" "))
                .await
                .unwrap_or_else(|e| fail(e));
            println!("✅ Created chat '{}' ({})", chat.title, chat.session_id);
        }
        Commands::History { session_id } => {
            let messages = api
                .get_history(&session_id)
                .await
                .unwrap_or_else(|e| fail(e));
            if messages.is_empty() {
                println!("No messages yet.");
            }
            print_messages(&messages, config);
        }
        Commands::Say {
            session_id,
            message,
        } => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                fail("Message is empty");
            }
            let reply = run_say(&api, &session_id, message.trim())
                .await
                .unwrap_or_else(|e| fail(e));
            print_messages(&reply, config);
        }
        Commands::Health => {
            let server = api.server().to_string();
            if api.health_check().await {
                println!("🟢 online: {server}");
            } else {
                println!("🔴 offline: {server}");
                process::exit(1);
            }
        }
        Commands::Chat | Commands::Set { .. } | Commands::Unset { .. } | Commands::Config => {}
    }
}

fn print_messages(messages: &[Message], config: &Config) {
    let width = terminal::size()
        .ok()
        .map(|(w, _)| w as usize)
        .filter(|w| *w > 0)
        .unwrap_or(FALLBACK_PRINT_WIDTH);
    let lines = render_transcript(
        messages,
        &Theme::from_name(config.theme_or_default()),
        MessageRenderConfig::new(config.markdown_enabled(), false, width),
    );
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests;
