use anyhow::Result;
use clap::{Parser, Subcommand};
use juris_infrastructure::JurisPaths;

mod app;
mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "juris")]
#[command(about = "JURIS - ask questions about your policy documents", long_about = None)]
struct Cli {
    /// API base URL (overrides config.toml and JURIS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep sessions in memory only; nothing is written to sessions.toml
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Store a bearer token issued by the sign-in page
    Login {
        /// Token to store; prompted for when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// List cached sessions
    Sessions,
    /// Reconcile sessions with the remote document directory
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_paths = JurisPaths::new(None)?;
    let _log_guard = logging::init(&default_paths.logs_dir())?;

    let app = app::App::build(app::Options {
        api_url: cli.api_url,
        ephemeral: cli.ephemeral,
    })?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(&app).await?,
        Commands::Login { token } => commands::auth::login(&app, token).await?,
        Commands::Logout => commands::auth::logout(&app).await?,
        Commands::Sessions => commands::sessions::list(&app).await?,
        Commands::Sync => commands::sessions::sync(&app).await?,
    }

    Ok(())
}
