//! Green AI chat client.
//!
//! Single-turn exchanges with the backend assistant, rendered as an
//! append-only transcript. One request is outstanding at a time — the
//! loop is synchronous, so the prompt only returns once the previous
//! exchange has settled. A transient "Thinking..." line stands in for
//! the reply and is erased when the outcome arrives.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::notify;

/// Who a transcript line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    /// Supplementary grid-carbon line attached to an answer.
    Info,
    Error,
}

/// One transcript entry. Entries are appended, never edited or removed.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Canned prompt templates, loadable with `/prompt N`.
pub const PROMPT_TEMPLATES: &[&str] = &[
    "When is the best time today to run my training job in this region?",
    "How can I reduce the carbon footprint of my workload?",
    "Compare the current grid carbon of Mumbai (IN-WE) and Stockholm (SE-SE4).",
];

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

/// Send one question and return the transcript entries it produced.
///
/// Success yields the answer, optionally followed by an info line with
/// the grid reading the backend attached. Any failure — transport,
/// malformed payload, or a server-side `{error}` — yields a single
/// error entry; the transcript never loses prior messages.
pub fn exchange(client: &ApiClient, question: &str) -> Vec<ChatMessage> {
    match client.ask(question) {
        Ok(reply) => {
            let mut messages = vec![ChatMessage::new(ChatRole::Assistant, reply.answer)];
            if let Some(carbon) = reply.carbon {
                messages.push(ChatMessage::new(
                    ChatRole::Info,
                    format!(
                        "Current grid carbon: {:.1} gCO2/kWh ({})",
                        carbon.carbon_intensity, carbon.region
                    ),
                ));
            }
            messages
        }
        Err(e) => vec![ChatMessage::new(ChatRole::Error, format!("{e:#}"))],
    }
}

/// Render one transcript entry for the terminal.
pub fn render_message(message: &ChatMessage) -> String {
    match message.role {
        ChatRole::User => format!("{} {}", "You:".bold(), message.text),
        ChatRole::Assistant => format!("{} {}", "Green AI:".bold().green(), message.text),
        ChatRole::Info => format!("  {}", message.text.dimmed().italic()),
        ChatRole::Error => format!(
            "{} {}",
            "Green AI:".bold().green(),
            format!("Error: {}", message.text).red()
        ),
    }
}

// ---------------------------------------------------------------------------
// gridwatch chat
// ---------------------------------------------------------------------------

/// `gridwatch chat [QUESTION]` — one-shot with an argument, interactive
/// transcript loop without.
pub fn run(client: &ApiClient, question: Option<String>) -> Result<()> {
    match question {
        Some(q) => {
            submit(client, &mut Vec::new(), &q);
            Ok(())
        }
        None => run_interactive(client),
    }
}

fn run_interactive(client: &ApiClient) -> Result<()> {
    println!("{}", "Green AI Chat".bold().cyan());
    println!("{}", "=".repeat(40));
    println!(
        "  {}",
        "Ask about carbon-aware scheduling. /prompts lists templates, /quit exits.".dimmed()
    );
    println!();

    let mut transcript: Vec<ChatMessage> = Vec::new();
    let stdin = io::stdin();

    loop {
        print!("{} ", ">".bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        match input {
            "" => {
                notify::error("Please enter a message");
                continue;
            }
            "/quit" | "/exit" => break,
            "/prompts" => {
                for (i, template) in PROMPT_TEMPLATES.iter().enumerate() {
                    println!("  {} {}", format!("{}.", i + 1).bold(), template);
                }
                continue;
            }
            _ => {}
        }

        if let Some(index) = input.strip_prefix("/prompt ") {
            match index.trim().parse::<usize>() {
                Ok(n) if (1..=PROMPT_TEMPLATES.len()).contains(&n) => {
                    notify::success("Prompt template loaded");
                    submit(client, &mut transcript, PROMPT_TEMPLATES[n - 1]);
                }
                _ => notify::error(&format!(
                    "Unknown template; pick 1..{}",
                    PROMPT_TEMPLATES.len()
                )),
            }
            continue;
        }

        submit(client, &mut transcript, input);
    }

    Ok(())
}

/// Append the user message, show the thinking line, run the exchange,
/// and print whatever it produced.
fn submit(client: &ApiClient, transcript: &mut Vec<ChatMessage>, question: &str) {
    let user = ChatMessage::new(ChatRole::User, question);
    println!("{}", render_message(&user));
    transcript.push(user);

    // Transient placeholder, erased once the outcome lands.
    println!("{} {}", "Green AI:".bold().green(), "Thinking...".dimmed());
    let _ = io::stdout().flush();
    let produced = exchange(client, question);
    print!("\x1b[1A\x1b[2K");

    for message in produced {
        println!("{}", render_message(&message));
        transcript.push(message);
    }
    println!();
}
