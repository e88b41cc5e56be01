//! Cartwright CLI: operator access to the tools and the store.
//!
//! Commands:
//! - `init`    : Write the default config
//! - `tools`   : List tool definitions
//! - `call`    : Dispatch one tool call for a user
//! - `show`    : Print a user's stored record
//! - `history` : Print a user's persisted transcript

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cartwright",
    about = "Cartwright: stateful tool orchestration for a shopping assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// List the tools a model may call
    Tools {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dispatch one tool call through a real session
    Call {
        /// Tool name, e.g. add_to_cart
        name: String,

        /// Tool input as a JSON object
        #[arg(short, long, default_value = "{}")]
        input: String,

        /// User id (defaults to session.default_user)
        #[arg(short, long, env = "CARTWRIGHT_USER")]
        user: Option<String>,
    },

    /// Print a user's cart, preferences and transcript
    Show {
        #[arg(short, long, env = "CARTWRIGHT_USER")]
        user: Option<String>,
    },

    /// Print a user's persisted conversation
    History {
        #[arg(short, long, env = "CARTWRIGHT_USER")]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Tools { json } => commands::tools::list(json)?,
        Commands::Call { name, input, user } => commands::tools::call(&name, &input, user).await?,
        Commands::Show { user } => commands::inspect::show(user).await?,
        Commands::History { user } => commands::inspect::history(user).await?,
    }

    Ok(())
}
