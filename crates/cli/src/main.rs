//! WebMCP CLI - discover and invoke commerce operations from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List operations (names, or full descriptors as JSON)
//! webmcp tools
//! webmcp tools --json
//!
//! # Show one operation's input schema
//! webmcp describe add_to_cart
//!
//! # Invoke against a running server, or a local catalog file
//! webmcp invoke search_products --args '{"query": "mug"}' --server http://localhost:3000
//! webmcp invoke add_to_cart --args '{"product_id": 10}' --catalog catalog.yaml --yes
//!
//! # Interactive session (one cart for the whole session)
//! webmcp shell --catalog catalog.yaml
//!
//! # Validate a catalog file
//! webmcp catalog check catalog.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `WEBMCP_SERVER_URL` - Server used when neither `--server` nor `--catalog` is given
//!   (default: `http://localhost:3000`)

#![cfg_attr(not(test), forbid(unsafe_code))]
// Commands report to the terminal.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "webmcp")]
#[command(author, version, about = "WebMCP commerce tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available operations
    Tools {
        /// Print full descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one operation's description and input schema
    Describe {
        /// Operation name
        name: String,
    },
    /// Invoke one operation and print its result
    Invoke {
        /// Operation name
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,

        #[command(flatten)]
        backend: BackendArgs,

        /// Approve confirmations without asking
        #[arg(short, long)]
        yes: bool,

        /// Print the result envelope as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive shell: `<operation> [json]`, `tools`, `quit`
    Shell {
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Catalog file tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

/// Where operations get their catalog and cart.
#[derive(Args)]
#[group(multiple = false)]
struct BackendArgs {
    /// Base URL of a running server
    #[arg(long)]
    server: Option<String>,

    /// Serve from a local catalog file instead of a server
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Parse and validate a catalog file
    Check {
        /// Catalog file (YAML or JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "webmcp_cli=warn,webmcp_tools=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Tools { json } => commands::tools::list(json)?,
        Commands::Describe { name } => commands::tools::describe(&name)?,
        Commands::Invoke {
            name,
            args,
            backend,
            yes,
            json,
        } => {
            let backend = commands::Backend::from_args(backend.server, backend.catalog);
            commands::invoke::run(&name, &args, &backend, yes, json).await?;
        }
        Commands::Shell { backend } => {
            let backend = commands::Backend::from_args(backend.server, backend.catalog);
            commands::shell::run(&backend).await?;
        }
        Commands::Catalog { action } => match action {
            CatalogAction::Check { file } => commands::catalog::check(&file)?,
        },
    }
    Ok(())
}
