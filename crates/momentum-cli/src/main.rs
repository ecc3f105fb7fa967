mod config;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use momentum_core::Engine;
use momentum_core::clock::SystemClock;
use momentum_core::generator::GeminiGenerator;
use momentum_core::token;
use momentum_db::pool;

use config::MomentumConfig;
use serve_cmd::AppState;

#[derive(Parser)]
#[command(name = "momentum", about = "Goal roadmaps and daily schedules")]
struct Cli {
    /// Database URL (overrides MOMENTUM_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a momentum config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/momentum")]
        db_url: String,
        /// Generator API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the momentum database (requires config file or env vars)
    DbInit,
    /// Run the HTTP API
    Serve {
        /// Address to bind (defaults to server.bind in the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (defaults to server.port in the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Issue a bearer token for a user (a new user ID when omitted)
    Token {
        /// User ID to bind into the token
        user_id: Option<String>,
    },
}

/// Execute the `momentum init` command: write the config file.
fn cmd_init(db_url: &str, api_key: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let token_secret = config::generate_token_secret();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        auth: config::AuthSection {
            token_secret: token_secret.clone(),
        },
        generator: config::GeneratorSection {
            api_key: api_key.unwrap_or_default().to_string(),
            ..config::GeneratorSection::default()
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  auth.token_secret = {}...{}", &token_secret[..8], &token_secret[56..]);
    println!("  generator.model = {}", cfg.generator.model);
    if api_key.is_none() {
        println!("  generator.api_key is empty; set GEMINI_API_KEY before `momentum serve`.");
    }
    println!();
    println!("Next: run `momentum db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `momentum db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = MomentumConfig::resolve(cli_db_url)?;

    println!("Initializing momentum database...");

    let db_name = resolved.db_config.database_name().unwrap_or("?").to_owned();
    if pool::ensure_database_exists(&resolved.db_config).await? {
        println!("  created database {db_name}");
    } else {
        println!("  database {db_name} already exists");
    }

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let result = pool::run_migrations(&db_pool).await;
    let counts = match result {
        Ok(()) => pool::table_counts(&db_pool).await,
        Err(e) => Err(e),
    };
    db_pool.close().await;

    println!("Database ready. Tables:");
    for (table, count) in &counts? {
        println!("  {table}: {count} rows");
    }

    println!("momentum db-init complete.");
    Ok(())
}

/// Execute the `momentum serve` command.
async fn cmd_serve(
    cli_db_url: Option<&str>,
    bind: Option<&str>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let resolved = MomentumConfig::resolve(cli_db_url)?;
    let generator = GeminiGenerator::new(resolved.generator_config)
        .context("failed to configure content generator")?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let state = AppState {
        engine: Engine::new(db_pool.clone(), Arc::new(generator), Arc::new(SystemClock)),
        tokens: resolved.token_config,
    };

    let bind = bind.unwrap_or(&resolved.bind);
    let port = port.unwrap_or(resolved.port);
    let result = serve_cmd::run_serve(state, bind, port).await;
    db_pool.close().await;
    result
}

/// Execute the `momentum token` command.
fn cmd_token(cli_db_url: Option<&str>, user_id: Option<&str>) -> anyhow::Result<()> {
    let resolved = MomentumConfig::resolve(cli_db_url)?;
    let user_id = match user_id {
        Some(raw) => Uuid::parse_str(raw).with_context(|| format!("invalid user ID: {raw}"))?,
        None => Uuid::new_v4(),
    };

    println!("user_id = {user_id}");
    println!("{}", token::generate_token(&resolved.token_config, user_id));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cli_db_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Init {
            db_url,
            api_key,
            force,
        } => cmd_init(&db_url, api_key.as_deref(), force)?,
        Commands::DbInit => cmd_db_init(cli_db_url).await?,
        Commands::Serve { bind, port } => cmd_serve(cli_db_url, bind.as_deref(), port).await?,
        Commands::Token { user_id } => cmd_token(cli_db_url, user_id.as_deref())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn serve_flags_are_optional() {
        let cli = Cli::try_parse_from(["momentum", "serve"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                bind: None,
                port: None
            }
        ));

        let cli = Cli::try_parse_from(["momentum", "serve", "--bind", "0.0.0.0", "--port", "8080"])
            .unwrap();
        match cli.command {
            Commands::Serve { bind, port } => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn database_url_is_global() {
        let cli = Cli::try_parse_from([
            "momentum",
            "db-init",
            "--database-url",
            "postgresql://elsewhere:5432/momentum",
        ])
        .unwrap();
        assert_eq!(
            cli.database_url.as_deref(),
            Some("postgresql://elsewhere:5432/momentum")
        );
        assert!(matches!(cli.command, Commands::DbInit));
    }

    #[test]
    fn init_defaults_to_local_database() {
        let cli = Cli::try_parse_from(["momentum", "init"]).unwrap();
        match cli.command {
            Commands::Init {
                db_url,
                api_key,
                force,
            } => {
                assert_eq!(db_url, "postgresql://localhost:5432/momentum");
                assert!(api_key.is_none());
                assert!(!force);
            }
            _ => panic!("expected init command"),
        }
    }
}
