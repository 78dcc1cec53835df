//! Terminal chat front-end for the campus assistant.
//!
//! Run with: `cargo run --bin campus-chat`
//!
//! Talks to a running `campus-relay`. Input stays open while replies are
//! pending. Commands:
//! - any text: send it to the assistant
//! - `/quick`: list quick replies, `/quick N`: send quick reply N
//! - `/reset`: clear the conversation (the session id is kept)
//! - `/quit`: exit

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use campus_assistant::config::ChatConfig;
use campus_assistant::conversation::{
    ConversationClient, DisplayStyle, FileIdentityStore, HttpRelayTransport, QUICK_REPLIES, Role,
    SubmitOutcome, Turn, quick_reply,
};

type Client = ConversationClient<HttpRelayTransport, FileIdentityStore>;

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Say(&'a str),
    Quick(usize),
    ListQuick,
    Reset,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/quit" | "/exit" => Self::Quit,
            "/reset" => Self::Reset,
            "/quick" => Self::ListQuick,
            _ => match trimmed.strip_prefix("/quick ") {
                Some(rest) => rest.trim().parse().map_or(Self::Unknown(trimmed), Self::Quick),
                None if trimmed.starts_with('/') => Self::Unknown(trimmed),
                None => Self::Say(line),
            },
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn prompt() {
    print!("  > ");
    let _ = std::io::stdout().flush();
}

fn print_banner(client: &Client) {
    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║     UTM Campus Assistance Chatbot         ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!("  Relay: {}", client.transport().relay_url());
    if let Some(sender) = client.sender() {
        println!("  Session: {sender}");
    }
    print_count(client);
    println!("  Type a message, /quick for suggestions, /reset, /quit");
    println!();
}

fn print_quick_replies() {
    println!("  Quick replies:");
    for (index, label) in QUICK_REPLIES.iter().enumerate() {
        println!("    {}. {label}", index + 1);
    }
}

fn print_turn(turn: &Turn) {
    let time = turn.created_at().with_timezone(&Local).format("%H:%M");
    match turn.role() {
        Role::User => println!("  Student · {time}  [{}]", turn.text()),
        Role::Assistant => {
            println!("  UTM Assistant · {time}");
            match turn.display_style() {
                DisplayStyle::Long => {
                    for line in turn.text().lines() {
                        println!("  │ {line}");
                    }
                }
                DisplayStyle::Short | DisplayStyle::Chip => println!("  ( {} )", turn.text()),
            }
        }
    }
}

fn count_label(client: &Client) -> String {
    format!("  ── {} messages ──", client.state().len())
}

fn print_count(client: &Client) {
    println!("{}", count_label(client));
}

/// Print the turns appended since `seen` and return the new count.
fn render_new(client: &Client, seen: usize) -> usize {
    let fresh = client.state().since(seen);
    if !fresh.is_empty() {
        for turn in fresh {
            print_turn(turn);
        }
        print_count(client);
    }
    client.state().len()
}

/// Show the user's turn at once and start the relay call in the background.
fn send(
    client: &mut Client,
    in_flight: &mut JoinSet<SubmitOutcome>,
    text: &str,
    seen: usize,
) -> usize {
    let Some(pending) = client.begin_submit(text) else {
        return seen;
    };
    in_flight.spawn(pending.dispatch_owned(client.transport().clone()));
    render_new(client, seen)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ChatConfig::from_env().context("reading chat configuration")?;
    let transport =
        HttpRelayTransport::new(config.relay_url.clone()).context("building HTTP client")?;
    let store = FileIdentityStore::new(&config.identity_file);
    let identity_path = store.path().display().to_string();

    let mut client = ConversationClient::new(transport, store);
    if let Some(greeting) = config.greeting.clone() {
        client = client.with_greeting(greeting);
    }
    if let Err(e) = client.initialize_sender_identity() {
        eprintln!("  Warning: session id unavailable from {identity_path} ({e}); messages will fail");
    }

    print_banner(&client);
    let mut seen = render_new(&client, 0);

    // Replies land in the order the relay answers, not the order sent.
    let mut in_flight: JoinSet<SubmitOutcome> = JoinSet::new();
    let mut input_open = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line.context("reading stdin")? else {
                    input_open = false;
                    continue;
                };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Reset => {
                        client.reset_conversation();
                        seen = 0;
                        println!("  (conversation cleared)");
                        print_count(&client);
                    }
                    Command::ListQuick => print_quick_replies(),
                    Command::Quick(position) => match quick_reply(position) {
                        Some(label) => seen = send(&mut client, &mut in_flight, label, seen),
                        None => println!("  No quick reply #{position}"),
                    },
                    Command::Say(text) => seen = send(&mut client, &mut in_flight, text, seen),
                    Command::Unknown(command) => println!("  Unknown command: {command}"),
                }
                prompt();
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                let outcome = joined.unwrap_or_else(|e| {
                    tracing::warn!("Submission task failed: {e}");
                    SubmitOutcome::Failed
                });
                client.complete_submit(outcome);
                seen = render_new(&client, seen);
                prompt();
            }
            else => break,
        }
    }

    println!();
    Ok(())
}
