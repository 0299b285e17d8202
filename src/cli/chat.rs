//! Interactive chat loop
//!
//! A line-oriented REPL over stdin: plain lines are sent as chat messages,
//! slash commands operate on the conversation store and the request
//! lifecycle. While a request is in flight the loop keeps reading input so
//! `/stop` can cancel it.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::core::config::Config;
use crate::core::constants::CREDENTIAL_ENV;
use crate::core::conversation::ConversationStore;
use crate::core::message::Message;
use crate::core::request::{ResponseManager, SendOptions};
use crate::core::session::SessionContext;
use crate::utils::logging::LoggingState;

enum Flow {
    Continue,
    Quit,
}

pub async fn run_chat(
    model: Option<String>,
    log_file: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut session = SessionContext::resolve(model, log_file, config)?;

    eprintln!("🚀 Starting Repartee - Terminal Chat");
    eprintln!("📡 Using model: {}", session.model);
    eprintln!("🌐 API endpoint: {}", session.base_url);
    if session.api_key.is_none() {
        eprintln!("⚠️  {CREDENTIAL_ENV} is not set; sending will fail until it is.");
    }
    eprintln!("💡 Type a message and press Enter; /help lists commands");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let manager = ResponseManager::from_session(&session);
    let mut store = ConversationStore::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            match handle_command(&line, &mut store, &manager, &mut session.logging) {
                Flow::Quit => break,
                Flow::Continue => {}
            }
        } else {
            store.set_input(line);
            handle_send(&mut store, &manager, &mut lines, &session.logging).await?;
        }
    }

    Ok(())
}

fn prompt() -> Result<(), Box<dyn Error>> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

/// Append the pending input as a user message, send the flattened
/// transcript, and append the reply (or a placeholder) to the same
/// conversation.
async fn handle_send(
    store: &mut ConversationStore,
    manager: &ResponseManager,
    lines: &mut Lines<BufReader<Stdin>>,
    logging: &LoggingState,
) -> Result<(), Box<dyn Error>> {
    let text = store.take_input();
    if text.trim().is_empty() {
        return Ok(());
    }

    // Pin the target conversation: the reply lands here even if the user
    // browses elsewhere while waiting.
    let conversation_id = store.active_id().to_string();

    let user_message = Message::user(text);
    log_line(logging, &user_message.transcript_line());
    store.append_message(&conversation_id, user_message);

    let transcript = store.transcript();
    let send = manager.send(&transcript, SendOptions::default());
    tokio::pin!(send);

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            line = lines.next_line() => {
                match line? {
                    Some(input) if input.trim() == "/stop" => manager.abort(),
                    Some(_) => {
                        eprintln!("⏳ A request is in flight; /stop cancels it.");
                    }
                    // stdin closed while waiting
                    None => manager.abort(),
                }
            }
        }
    };

    let reply = match result {
        Ok(Some(text)) => Message::assistant(text),
        Ok(None) => Message::assistant("(no response)"),
        Err(err) => {
            eprintln!("❌ {err}");
            Message::assistant("Error: no response")
        }
    };

    println!("{}", reply.transcript_line());
    log_line(logging, &reply.transcript_line());
    store.append_message(&conversation_id, reply);
    Ok(())
}

fn handle_command(
    line: &str,
    store: &mut ConversationStore,
    manager: &ResponseManager,
    logging: &mut LoggingState,
) -> Flow {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().map(str::trim).unwrap_or("");

    match command {
        "/new" => {
            let title = store.new_chat().title.clone();
            println!("📄 {title}");
        }
        "/list" => {
            for (index, conversation) in store.conversations().iter().enumerate() {
                let marker = if conversation.id == store.active_id() {
                    "▸"
                } else {
                    " "
                };
                println!(
                    "{} {:>2}. {} ({} message{})",
                    marker,
                    index + 1,
                    conversation.title,
                    conversation.messages.len(),
                    if conversation.messages.len() == 1 { "" } else { "s" },
                );
            }
            let count = store.conversations().len();
            println!(
                "{count} conversation{}",
                if count == 1 { "" } else { "s" }
            );
        }
        "/switch" => match conversation_id_at(store, argument) {
            Some(id) => {
                store.select_conversation(&id);
                println!("📄 {}", store.active().title);
            }
            None => eprintln!("❌ Usage: /switch <number> (see /list)"),
        },
        "/delete" => {
            let id = if argument.is_empty() {
                Some(store.active_id().to_string())
            } else {
                conversation_id_at(store, argument)
            };
            match id {
                Some(id) => {
                    store.delete_conversation(&id);
                    println!("🗑️  Deleted; now on: {}", store.active().title);
                }
                None => eprintln!("❌ Usage: /delete [number] (see /list)"),
            }
        }
        "/stop" => {
            if manager.is_loading() {
                manager.abort();
                println!("🛑 Request cancelled");
            } else {
                println!("No request in flight");
            }
        }
        "/reset" => {
            manager.reset();
            println!("🔄 Request state cleared");
        }
        "/log" => {
            let outcome = if argument.is_empty() {
                logging.toggle()
            } else {
                logging.set_log_file(argument.to_string())
            };
            match outcome {
                Ok(status) => println!("📝 {status}"),
                Err(err) => eprintln!("❌ {err}"),
            }
        }
        "/help" => {
            println!("Commands:");
            println!("  /new              Start a new conversation");
            println!("  /list             List conversations");
            println!("  /switch <n>       Switch to conversation n");
            println!("  /delete [n]       Delete conversation n (default: active)");
            println!("  /stop             Cancel the in-flight request");
            println!("  /reset            Clear recorded request state");
            println!("  /log [file]       Enable or pause transcript logging");
            println!("  /quit             Exit");
            println!("Transcript log: {}", logging.status_line());
        }
        "/quit" | "/exit" => return Flow::Quit,
        _ => eprintln!("❌ Unknown command: {command} (try /help)"),
    }

    Flow::Continue
}

/// Resolve a 1-based `/list` index to a conversation id.
fn conversation_id_at(store: &ConversationStore, argument: &str) -> Option<String> {
    let index: usize = argument.parse().ok()?;
    store
        .conversations()
        .get(index.checked_sub(1)?)
        .map(|c| c.id.clone())
}

fn log_line(logging: &LoggingState, line: &str) {
    if let Err(err) = logging.log_message(line) {
        eprintln!("Failed to log message: {err}");
    }
}
