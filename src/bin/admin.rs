//! CLI administration tool for snaplink.
//!
//! Inspects and edits links, client quotas, and the redirect counter directly
//! in Redis, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a link and its remaining lifetime
//! cargo run --bin admin -- link show Ab3dE9
//!
//! # Delete a link before it expires
//! cargo run --bin admin -- link delete Ab3dE9
//!
//! # Inspect or reset a client's quota window
//! cargo run --bin admin -- quota show 203.0.113.7
//! cargo run --bin admin -- quota reset 203.0.113.7 -y
//!
//! # Redirect counter
//! cargo run --bin admin -- counter show
//!
//! # Check store connection
//! cargo run --bin admin -- store check
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`/`REDIS_DB` (required)
//! - `DOMAIN`, `API_QUOTA`, `RATE_LIMIT_WINDOW_SECONDS`, `STORE_TIMEOUT_MS`

use snaplink::application::services::{LinkRegistry, RateLimiter};
use snaplink::config::{Config, mask_connection_string};
use snaplink::infrastructure::store::{KeyValueStore, RedisStore};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::sync::Arc;
use std::time::Instant;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or delete short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Inspect or reset client quotas
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },

    /// Redirect counter
    Counter {
        #[command(subcommand)]
        action: CounterAction,
    },

    /// Store operations
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show a link's target and expiry
    Show {
        /// Short identifier (prompted if omitted)
        id: Option<String>,
    },

    /// Delete a link
    Delete {
        /// Short identifier (prompted if omitted)
        id: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum QuotaAction {
    /// Show a client's remaining quota
    Show {
        /// Client address
        client: String,
    },

    /// Close a client's window so the quota starts over
    Reset {
        /// Client address
        client: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CounterAction {
    /// Show the number of redirects served
    Show,

    /// Reset the counter to zero
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Check store connection
    Check,
}

/// Services the commands operate on.
struct Admin {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    registry: LinkRegistry,
    rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let redis_url = config
        .redis_url
        .clone()
        .context("REDIS_URL or REDIS_HOST must be set")?;

    let store: Arc<dyn KeyValueStore> = Arc::new(
        RedisStore::connect(&redis_url, config.store_timeout())
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to Redis at {}",
                    mask_connection_string(&redis_url)
                )
            })?,
    );

    let admin = Admin {
        registry: LinkRegistry::new(store.clone()),
        rate_limiter: RateLimiter::new(store.clone(), config.api_quota, config.rate_limit_window()),
        store,
        config,
    };

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &admin).await?,
        Commands::Quota { action } => handle_quota_action(action, &admin).await?,
        Commands::Counter { action } => handle_counter_action(action, &admin).await?,
        Commands::Store { action } => handle_store_action(action, &admin, &redis_url).await?,
    }

    Ok(())
}

/// Returns `id`, or asks for it interactively.
fn id_or_prompt(id: Option<String>) -> Result<String> {
    match id {
        Some(id) => Ok(id),
        None => Ok(Input::new().with_prompt("Short id").interact_text()?),
    }
}

/// Asks for confirmation unless `skip` is set. Returns true to proceed.
fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
    }
    Ok(confirmed)
}

async fn handle_link_action(action: LinkAction, admin: &Admin) -> Result<()> {
    match action {
        LinkAction::Show { id } => {
            let id = id_or_prompt(id)?;
            show_link(admin, &id).await?;
        }
        LinkAction::Delete { id, yes } => {
            let id = id_or_prompt(id)?;
            delete_link(admin, &id, yes).await?;
        }
    }

    Ok(())
}

/// Prints a link's target, full short URL, and expiry.
///
/// # Output Format
///
/// ```text
/// 🔗 Link Ab3dE9
///
///   Short URL:  s.example.com/Ab3dE9
///   Target:     https://example.com/a/b
///   Expires:    2024-01-16 10:30 UTC (in 23h 59m)
/// ```
async fn show_link(admin: &Admin, id: &str) -> Result<()> {
    println!("{} {}", "🔗 Link".bright_blue().bold(), id.cyan());
    println!();

    let link = admin
        .registry
        .find(id)
        .await
        .map_err(|e| anyhow::anyhow!("Store error: {}", e))?;

    let Some(link) = link else {
        println!("{}", "  Not found or expired".yellow());
        return Ok(());
    };

    let left = link.expires_at - Utc::now();
    println!(
        "  Short URL:  {}/{}",
        admin.config.domain.trim_end_matches('/'),
        link.id.bright_white()
    );
    println!("  Target:     {}", link.target_url.cyan());
    println!(
        "  Expires:    {} {}",
        link.expires_at.format("%Y-%m-%d %H:%M UTC"),
        format!("(in {}h {}m)", left.num_hours(), left.num_minutes() % 60).bright_black()
    );
    println!();

    Ok(())
}

async fn delete_link(admin: &Admin, id: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = admin
        .registry
        .find(id)
        .await
        .map_err(|e| anyhow::anyhow!("Store error: {}", e))?
        .context("Link not found or already expired")?;

    println!("  Id:     {}", link.id.cyan());
    println!("  Target: {}", link.target_url.bright_black());
    println!();

    if !confirm("Delete this link?", skip_confirm)? {
        return Ok(());
    }

    let deleted = admin
        .registry
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    if deleted {
        println!("{}", "✅ Link deleted".green().bold());
    } else {
        println!("{}", "⚠️  Link expired before it could be deleted".yellow());
    }
    println!();

    Ok(())
}

async fn handle_quota_action(action: QuotaAction, admin: &Admin) -> Result<()> {
    match action {
        QuotaAction::Show { client } => show_quota(admin, &client).await,
        QuotaAction::Reset { client, yes } => reset_quota(admin, &client, yes).await,
    }
}

async fn show_quota(admin: &Admin, client: &str) -> Result<()> {
    println!("{} {}", "🚦 Quota for".bright_blue().bold(), client.cyan());
    println!();

    let record = admin
        .rate_limiter
        .snapshot(client)
        .await
        .map_err(|e| anyhow::anyhow!("Store error: {}", e))?;

    let quota = admin.rate_limiter.quota();
    match record {
        None => {
            println!(
                "  No open window ({} of {} requests available)",
                quota.to_string().green(),
                quota
            );
        }
        Some(record) => {
            let remaining = if record.is_exhausted() {
                record.remaining.max(0).to_string().red()
            } else {
                record.remaining.to_string().green()
            };
            println!("  Remaining:  {} of {}", remaining, quota);
            if let Some(resets_at) = record.window_expires_at {
                println!("  Resets at:  {}", resets_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
    }
    println!();

    Ok(())
}

async fn reset_quota(admin: &Admin, client: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔄 Reset Quota".bright_blue().bold());
    println!();

    if !confirm(&format!("Reset quota window for {}?", client), skip_confirm)? {
        return Ok(());
    }

    let closed = admin
        .rate_limiter
        .reset(client)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to reset quota: {}", e))?;

    if closed {
        println!("{}", "✅ Quota window closed".green().bold());
    } else {
        println!("{}", "⚠️  No open window for this client".yellow());
    }
    println!();

    Ok(())
}

async fn handle_counter_action(action: CounterAction, admin: &Admin) -> Result<()> {
    match action {
        CounterAction::Show => {
            let count = admin
                .registry
                .redirect_count()
                .await
                .map_err(|e| anyhow::anyhow!("Store error: {}", e))?;

            println!("{}", "📊 Redirects".bright_blue().bold());
            println!();
            println!("  Total: {}", count.to_string().bright_white().bold());
            println!();
        }
        CounterAction::Reset { yes } => {
            if !confirm("Reset the redirect counter to zero?", yes)? {
                return Ok(());
            }

            admin
                .registry
                .reset_redirect_count()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to reset counter: {}", e))?;

            println!("{}", "✅ Counter reset".green().bold());
        }
    }

    Ok(())
}

/// Verifies the store answers PING and reports the round trip.
async fn handle_store_action(action: StoreAction, admin: &Admin, redis_url: &str) -> Result<()> {
    match action {
        StoreAction::Check => {
            println!("{}", "🔍 Checking store connection...".bright_blue());

            let started = Instant::now();
            let reachable = admin.store.ping().await;
            let elapsed = started.elapsed();

            println!("  Redis: {}", mask_connection_string(redis_url).bright_black());
            if reachable {
                println!(
                    "{} ({} ms)",
                    "✅ Store connection OK".green().bold(),
                    elapsed.as_millis()
                );
            } else {
                anyhow::bail!("Store did not answer PING");
            }
        }
    }

    Ok(())
}
