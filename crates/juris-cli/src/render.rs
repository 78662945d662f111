//! Terminal rendering of sessions and messages.

use colored::Colorize;
use juris_core::session::{ConversationState, Message, Sender, Session};
use juris_core::timestamp::Timestamp;

pub fn session_list(state: &ConversationState) {
    if state.sessions().is_empty() {
        println!("{}", "No sessions. Upload a document with /upload <path>.".bright_black());
        return;
    }

    let now = Timestamp::now();
    for (index, session) in state.sessions().iter().enumerate() {
        let id = session.id();
        let marker = if state.active_id() == Some(&id) { "*" } else { " " };
        let kind = if session.is_pending() { " (pending)" } else { "" };
        let busy = if state.is_in_flight(&id) { " ..." } else { "" };

        println!(
            "{} {:>2}. {}{} {}{}",
            marker.bright_green(),
            index + 1,
            session.title.bold(),
            kind.yellow(),
            format!(
                "[{} msgs, {}]",
                session.message_count,
                session.timestamp.relative_to(now)
            )
            .bright_black(),
            busy.bright_yellow()
        );
        println!("       {}", preview(&session.last_message_preview).bright_black());
    }
}

pub fn history(session: &Session) {
    println!("{}", format!("=== {} ===", session.title).bright_magenta().bold());
    if session.messages.is_empty() {
        println!("{}", session.last_message_preview.bright_black());
    }
    for message in &session.messages {
        self::message(message);
    }
}

pub fn message(message: &Message) {
    match message.sender {
        Sender::User => {
            let who = message.sender_initials.as_deref().unwrap_or("you");
            println!("{}", format!("[{}] {}", who, message.content).green());
        }
        Sender::Agent => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
            println!();
        }
    }
}

/// Formats an agent reply for printing above the live prompt.
pub fn format_reply(title: &str, text: &str) -> String {
    let mut out = format!("{}\n", format!("[{}]", title).bright_magenta());
    for line in text.lines() {
        out.push_str(&format!("{}\n", line.bright_blue()));
    }
    out.push('\n');
    out
}

pub fn info(text: &str) {
    println!("{}", format_info(text));
}

pub fn format_info(text: &str) -> String {
    text.bright_black().to_string()
}

pub fn warn(text: &str) {
    println!("{}", format_warn(text));
}

pub fn format_warn(text: &str) -> String {
    text.yellow().to_string()
}

pub fn error(text: &str) {
    eprintln!("{}", text.red());
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > 60 {
        format!("{}...", first_line.chars().take(57).collect::<String>())
    } else {
        first_line.to_string()
    }
}
