pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "techblog-api")]
#[command(about = "Tech blog REST API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overriding PORT")]
        port: Option<u16>,

        #[arg(long, help = "Apply pending migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        migrate: false,
    });

    let port_override = match &command {
        Commands::Serve { port: Some(port), .. } => Some(port.to_string()),
        _ => None,
    };
    let config = AppConfig::from_lookup(|name| match name {
        "PORT" if port_override.is_some() => port_override.clone(),
        _ => std::env::var(name).ok(),
    })?;
    tracing::info!("Starting techblog-api in {:?} mode", config.environment);

    match command {
        Commands::Serve { migrate, .. } => commands::serve::handle(config, migrate).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
