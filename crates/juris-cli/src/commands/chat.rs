//! Interactive chat REPL.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, ExternalPrinter, Helper};
use tokio::sync::mpsc;

use juris_application::{ConversationUseCase, SendOutcome};
use juris_core::document::DocumentUpload;
use juris_core::session::{ExchangeRejection, ReplyDelivery, SessionId};

use super::sessions::report_sync_failure;
use crate::app::App;
use crate::render;

const COMMANDS: &[(&str, &str)] = &[
    ("/sessions", "list sessions"),
    ("/switch", "<n> switch to session n"),
    ("/new", "start a session before uploading"),
    ("/upload", "<path> upload a PDF"),
    ("/delete", "delete the active session's document"),
    ("/history", "show the active session"),
    ("/sync", "refresh from the document directory"),
    ("/whoami", "show the signed-in user"),
    ("/help", "show commands"),
    ("/quit", "exit"),
];

/// Rustyline helper providing slash-command completion, highlighting and hints.
#[derive(Clone)]
struct ChatHelper {
    commands: Vec<String>,
}

impl ChatHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(c, _)| c.to_string()).collect(),
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ChatHelper {}

type ChatEditor = Editor<ChatHelper, DefaultHistory>;

pub async fn run(app: &App) -> Result<()> {
    let profile = match app.auth.profile().await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            render::warn("Not signed in. Run `juris login --token <token>` first.");
            return Ok(());
        }
        Err(e) => {
            render::error(&format!("Stored sign-in is unusable ({e}). Run `juris login` again."));
            return Ok(());
        }
    };

    let conversation = app.conversation.clone();
    conversation.load_cached().await?;
    if let Err(e) = conversation.reconcile().await {
        report_sync_failure(&e);
        if e.is_auth_failure() {
            return Ok(());
        }
    }

    let mut rl: ChatEditor = Editor::new()?;
    rl.set_helper(Some(ChatHelper::new()));

    let mut external = match rl.create_external_printer() {
        Ok(external) => Some(external),
        Err(e) => {
            tracing::warn!("[Chat] No external printer, replies may overwrite the prompt: {}", e);
            None
        }
    };

    // Replies arrive on a background task so the prompt stays usable while
    // an answer is pending.
    let (reply_tx, mut reply_rx) = mpsc::channel::<SendOutcome>(32);
    let printer_conversation = conversation.clone();
    let printer = tokio::spawn(async move {
        while let Some(outcome) = reply_rx.recv().await {
            let Some(text) = describe_outcome(&printer_conversation, outcome).await else {
                continue;
            };
            match external.as_mut() {
                Some(external) => {
                    if let Err(e) = external.print(text.clone()) {
                        tracing::warn!("[Chat] External printer failed: {}", e);
                        print!("{text}");
                    }
                }
                None => print!("{text}"),
            }
        }
    });

    println!("{}", "=== JURIS ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Signed in as {} | {}", profile.name, app.config.api_base_url).bright_black()
    );
    println!("{}", "Type a question, /help for commands, or /quit to exit.".bright_black());
    println!();
    render::session_list(&conversation.snapshot().await);

    loop {
        let prompt = match conversation.active_session().await {
            Some(session) => format!("{}> ", session.title),
            None => ">> ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(&line) {
                    tracing::warn!("[Chat] Failed to record history: {}", e);
                }

                if let Some(command) = trimmed.strip_prefix('/') {
                    if !handle_command(app, &conversation, &mut rl, command).await {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    continue;
                }

                let Some(active) = conversation.active_session().await else {
                    render::warn("No active session. Upload a document with /upload <path>.");
                    continue;
                };
                if active.is_pending() {
                    render::warn("This session has no document yet. Upload one with /upload <path>.");
                    continue;
                }

                let tx = reply_tx.clone();
                let worker = conversation.clone();
                let session_id = active.id();
                let text = trimmed.to_string();
                render::info(&format!("asking {}...", active.title));
                tokio::spawn(async move {
                    let outcome = worker.send_message(&session_id, &text).await;
                    if let Err(e) = tx.send(outcome).await {
                        tracing::warn!("[Chat] Reply for {} dropped: {}", session_id, e);
                    }
                });
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                render::error(&format!("Error: {:?}", err));
                break;
            }
        }
    }

    if conversation.any_in_flight().await {
        render::info("Waiting for pending answers...");
    }
    drop(reply_tx);
    if let Err(e) = printer.await {
        tracing::warn!("[Chat] Reply printer ended abnormally: {}", e);
    }

    Ok(())
}

/// Runs one slash command. Returns `false` when the REPL should exit.
async fn handle_command(
    app: &App,
    conversation: &Arc<ConversationUseCase>,
    rl: &mut ChatEditor,
    command: &str,
) -> bool {
    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return false,
        "help" => {
            for (cmd, help) in COMMANDS {
                println!("  {} {}", cmd.bright_cyan(), help.bright_black());
            }
        }
        "sessions" => render::session_list(&conversation.snapshot().await),
        "history" => match conversation.active_session().await {
            Some(session) => render::history(&session),
            None => render::info("No active session."),
        },
        "switch" => switch(conversation, arg).await,
        "new" => match conversation.create_pending_session().await {
            Ok(created) => {
                tracing::debug!(
                    "[Chat] Binding requested for {}",
                    created.binding_requested.session_id
                );
                render::info("New session started. Upload its document with /upload <path>.");
            }
            Err(e) => render::error(&format!("Could not create session: {e}")),
        },
        "upload" => upload(conversation, arg).await,
        "delete" => delete(conversation, rl).await,
        "sync" => match conversation.reconcile().await {
            Ok(_) => render::session_list(&conversation.snapshot().await),
            Err(e) => report_sync_failure(&e),
        },
        "whoami" => match app.auth.profile().await {
            Ok(Some(profile)) => println!("{} <{}>", profile.name, profile.email),
            Ok(None) => render::info("Not signed in."),
            Err(e) => render::error(&e.to_string()),
        },
        other => render::warn(&format!("Unknown command /{other}. Try /help.")),
    }
    true
}

async fn switch(conversation: &ConversationUseCase, arg: &str) {
    let sessions = conversation.sessions().await;
    let target = match arg.parse::<usize>() {
        Ok(n) if n >= 1 && n <= sessions.len() => sessions[n - 1].id(),
        Ok(_) => {
            render::warn(&format!("Pick a number between 1 and {}.", sessions.len()));
            return;
        }
        Err(_) => SessionId::from_raw(arg),
    };

    match conversation.set_active_session(&target).await {
        Ok(()) => {
            if let Some(session) = conversation.active_session().await {
                render::history(&session);
            }
        }
        Err(e) if e.is_not_found() => render::warn(&format!("No session '{arg}'.")),
        Err(e) => render::error(&format!("Could not switch: {e}")),
    }
}

async fn upload(conversation: &ConversationUseCase, arg: &str) {
    if arg.is_empty() {
        render::warn("Usage: /upload <path>");
        return;
    }

    let path = Path::new(arg);
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => {
            render::warn(&format!("'{arg}' is not a file."));
            return;
        }
    };
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            render::error(&format!("Could not read {arg}: {e}"));
            return;
        }
    };

    match conversation.upload_document(DocumentUpload::new(file_name, bytes)).await {
        Ok(outcome) => {
            render::info(&outcome.message);
            match outcome.sync {
                Ok(_) => render::session_list(&conversation.snapshot().await),
                Err(e) => report_sync_failure(&e),
            }
        }
        Err(e) => render::error(&e.to_string()),
    }
}

async fn delete(conversation: &ConversationUseCase, rl: &mut ChatEditor) {
    let Some(active) = conversation.active_session().await else {
        render::info("No active session.");
        return;
    };
    if active.is_pending() {
        render::warn("This session has no document to delete.");
        return;
    }

    let answer = rl.readline(&deletion_prompt(&active.title));
    if !is_confirmed(answer) {
        render::info("Deletion cancelled.");
        return;
    }

    match conversation.delete_session(&active.title).await {
        Ok(outcome) => {
            render::info(&format!(
                "Deleted {} ({} sessions removed).",
                active.title,
                outcome.removed.len()
            ));
            if let Err(e) = outcome.sync {
                report_sync_failure(&e);
            }
        }
        Err(e) => render::error(&e.to_string()),
    }
}

fn deletion_prompt(title: &str) -> String {
    format!("Delete {}? [y/N] ", title)
}

/// Only an explicit `y` confirms; Ctrl-C, Ctrl-D and anything else decline.
fn is_confirmed(answer: rustyline::Result<String>) -> bool {
    matches!(answer, Ok(text) if text.trim().eq_ignore_ascii_case("y"))
}

/// Renders a finished exchange, or `None` when there is nothing to show.
async fn describe_outcome(conversation: &ConversationUseCase, outcome: SendOutcome) -> Option<String> {
    let text = match outcome {
        SendOutcome::Completed {
            session_id,
            reply,
            delivery: ReplyDelivery::Delivered,
            ..
        } => {
            let title = conversation
                .snapshot()
                .await
                .session(&session_id)
                .map(|s| s.title.clone())
                .unwrap_or_else(|| session_id.to_string());
            render::format_reply(&title, &reply)
        }
        SendOutcome::Completed {
            session_id,
            delivery: ReplyDelivery::SessionGone,
            ..
        } => format!(
            "{}\n",
            render::format_info(&format!("Answer for deleted session {session_id} discarded."))
        ),
        SendOutcome::Rejected(ExchangeRejection::AlreadyInFlight) => format!(
            "{}\n",
            render::format_warn("Still waiting for the previous answer in this session.")
        ),
        SendOutcome::Rejected(ExchangeRejection::UnknownSession) => {
            format!("{}\n", render::format_warn("That session no longer exists."))
        }
        SendOutcome::Rejected(ExchangeRejection::EmptyInput) => return None,
    };
    Some(text)
}
