use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use taskline::{
    Config, Database, Profile, TaskManager,
    cli::{self, Cli, Commands},
    rest, utils,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    // Parse CLI arguments
    let args = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if args.dev { Profile::Dev } else { Profile::Prod };

    match args.command {
        Commands::Serve { port } => {
            let config = Config::load_with_profile(profile)?;

            let db_path = utils::expand_path(&config.database_path);
            let db = Database::new(db_path.to_str().ok_or_else(|| {
                color_eyre::eyre::eyre!("Database path contains invalid UTF-8")
            })?)?;

            let mut addr = config.server_addr()?;
            if let Some(port) = port {
                addr.set_port(port);
            }

            let state = Arc::new(rest::AppState::new(db));
            rest::serve(addr, state).await?;
        }
        Commands::List { filter } => {
            let mut manager = TaskManager::new(args.url);
            cli::handle_list(filter, &mut manager).await?;
        }
        Commands::Add {
            description,
            important,
            private,
            deadline,
            project,
        } => {
            let manager = TaskManager::new(args.url);
            cli::handle_add(description, important, private, deadline, project, &manager).await?;
        }
        Commands::Update {
            id,
            description,
            important,
            private,
            deadline,
            project,
        } => {
            let manager = TaskManager::new(args.url);
            cli::handle_update(id, description, important, private, deadline, project, &manager)
                .await?;
        }
        Commands::Delete { id } => {
            let manager = TaskManager::new(args.url);
            cli::handle_delete(id, &manager).await?;
        }
    }

    Ok(())
}
