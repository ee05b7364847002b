use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use tg_linkbot::config;
use tg_linkbot::db;
use tg_linkbot::handlers::AppContext;
use tg_linkbot::reply::{ReplyTemplates, TelegramReplier};
use tg_linkbot::server;

#[derive(Debug, Parser)]
#[command(author, version, about = "Telegram webhook that saves links sent to the bot")]
struct Args {
    /// Path to YAML config file (defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print an example YAML config and exit
    #[arg(long)]
    print_config_example: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let loaded_dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    match loaded_dotenv {
        Ok(path) => debug!(path = ?path, "loaded dotenv file"),
        Err(e) if e.not_found() => debug!("no dotenv file found"),
        Err(e) => return Err(e).context("failed to load dotenv file"),
    }

    let args = Args::parse();
    if args.print_config_example {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(args.config.as_deref()).context("invalid configuration")?;

    let pool = db::init_pool(&cfg.database.url).await?;
    db::run_migrations(&pool).await?;
    db::ping(&pool).await?;
    let stored = db::count_links(&pool).await?;
    info!(stored, "connected to database");

    let replier = TelegramReplier::from_token(&cfg.telegram.bot_token);
    replier
        .identify()
        .await
        .context("failed to authorize telegram bot")?;

    let ctx = AppContext::new(
        pool,
        Arc::new(replier),
        ReplyTemplates::from(cfg.replies.clone()),
    );

    info!(port = cfg.server.port, "starting server");
    server::serve(ctx, cfg.server.port).await
}
