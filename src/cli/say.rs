//! TUI-less "say" command

use std::error::Error;

use crate::core::config::Config;
use crate::core::request::{RequestError, ResponseManager, SendOptions};
use crate::core::session::SessionContext;

pub async fn run_say(
    prompt: Vec<String>,
    model: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.is_empty() {
        eprintln!("Usage: repartee say <prompt>");
        std::process::exit(1);
    }

    let session = SessionContext::resolve(model, None, config)?;
    let manager = ResponseManager::from_session(&session);

    match manager
        .send(&format!("User: {prompt}"), SendOptions::default())
        .await
    {
        Ok(Some(text)) => {
            println!("{text}");
            Ok(())
        }
        Ok(None) => {
            println!("(no response)");
            Ok(())
        }
        Err(err @ RequestError::MissingCredential) => {
            eprintln!("❌ {err}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(1);
        }
    }
}
