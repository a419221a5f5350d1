//! Terminal front end for the reservation dialogue.
//!
//! Drives the same engine the webhook uses, under a fixed sender id, so
//! a full booking can be walked through without a messaging provider.

use mesabot_config::Config;
use mesabot_conversation::ConversationEngine;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use super::build_engine;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Config file override
    pub config_path: Option<PathBuf>,
    /// Sender id the dialogue is keyed by
    pub sender: String,
    /// Single message to send (non-interactive mode). The store lives only
    /// for this run, so a one-shot message always meets a sender with no session.
    pub message: Option<String>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load(input.config_path.as_deref())?;
        let (engine, _store) = build_engine(&config);

        info!("Chatting as {}", input.sender);

        if let Some(msg) = input.message {
            println!("{}", engine.handle(&input.sender, &msg).await);
            return Ok(());
        }

        run_interactive(&engine, &input.sender).await
    }
}

async fn run_interactive(engine: &ConversationEngine, sender: &str) -> anyhow::Result<()> {
    println!("=== {} ===", engine.config().restaurant_name);
    println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

    let mut turns = 0usize;
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            // EOF
            println!();
            break;
        }
        let line = line.trim();

        if matches!(line, "exit" | "quit" | "q") {
            break;
        }

        if line.is_empty() {
            continue;
        }

        let result = engine.process_turn(sender, line).await;
        turns += 1;
        println!("\n{}\n", result.reply);

        if let Some(outcome) = result.reservation {
            debug!("Reservation outcome: {outcome:?}");
        }
    }

    println!("\nSession ended. Total turns: {turns}");
    Ok(())
}
