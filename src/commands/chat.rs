//! Interactive terminal chat command handler

use crate::commands::build_components;
use crate::config::Config;
use crate::error::Result;
use crate::session::MessageContent;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Starts an interactive chat session in the terminal
///
/// One in-process session; turns run one at a time, matching the chat
/// endpoint's per-session serialization.
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `session_id` - Session id the terminal converses under
pub async fn run_chat(config: Config, session_id: String) -> Result<()> {
    let (orchestrator, sessions) = build_components(&config)?;
    let session = sessions.get_or_create(&session_id).await;

    println!(
        "{}",
        "Voyagent travel assistant. Ask about flights, hotels, or transfers."
            .cyan()
    );
    println!("{}", "Type 'exit' or press Ctrl-D to leave.\n".cyan());

    let mut rl = DefaultEditor::new()
        .map_err(|e| crate::error::VoyagentError::Session(format!("readline init: {}", e)))?;

    loop {
        match rl.readline(&"you> ".bold().to_string()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                    break;
                }
                let _ = rl.add_history_entry(trimmed);

                let mut session = session.lock().await;
                let reply = orchestrator.handle_turn(&mut session, trimmed).await?;
                print_reply(&reply.content);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("readline error: {}", e);
                break;
            }
        }
    }

    println!("{}", "Safe travels!".cyan());
    Ok(())
}

fn print_reply(content: &MessageContent) {
    match content {
        MessageContent::Text(text) => println!("{}\n", text.green()),
        MessageContent::Structured(value) => {
            if let Some(prompt) = value["prompt"].as_str() {
                println!("{}", prompt.green());
            }
            if let Some(results) = value["results"].as_array() {
                for entry in results {
                    let option = entry["option"].as_u64().unwrap_or_default();
                    let summary = entry["summary"].as_str().unwrap_or_default();
                    println!("  {}. {}", option, summary.green());
                }
                println!();
            } else {
                // Fall back to pretty JSON for shapes the renderer
                // does not know
                println!(
                    "{}\n",
                    serde_json::to_string_pretty(value)
                        .unwrap_or_else(|_| value.to_string())
                        .green()
                );
            }
        }
    }
}
