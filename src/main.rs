use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use colorname::assets::ListLoader;
use colorname::error::MatchError;
use colorname::models::{BatchItem, EngineConfig};
use colorname::services::MatchingEngine;

#[derive(Parser)]
#[command(name = "colorname")]
#[command(about = "Colorname - name colors after their nearest entry in a color list")]
struct Cli {
    /// Engine config file (YAML). Falls back to COLORNAME_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Name one or more colors
    Match {
        /// Hex colors, e.g. "#1a2b3c" or "abc"
        #[arg(required = true)]
        colors: Vec<String>,

        /// Color list to match against
        #[arg(short, long, default_value = "basic")]
        list: String,

        /// Never hand out the same name twice
        #[arg(short, long)]
        unique: bool,

        /// Print JSON, including derived color representations
        #[arg(long)]
        json: bool,
    },
    /// Show the nearest names of a single color
    Nearest {
        /// Hex color
        color: String,

        /// Color list to search
        #[arg(short, long, default_value = "basic")]
        list: String,

        /// Number of names to show
        #[arg(short, default_value_t = 5)]
        k: usize,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// List available color lists
    Lists,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colorname=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_file = cli
        .config
        .or_else(|| std::env::var("COLORNAME_CONFIG").ok().map(PathBuf::from));
    let config = EngineConfig::load(config_file.as_deref());
    let loader = ListLoader::from_env();

    match cli.command {
        Some(Commands::Match {
            colors,
            list,
            unique,
            json,
        }) => run_match_command(config, &loader, &colors, &list, unique, json).await,
        Some(Commands::Nearest {
            color,
            list,
            k,
            json,
        }) => run_nearest_command(config, &loader, &color, &list, k, json).await,
        Some(Commands::Lists) => {
            run_lists_command(&config, &loader);
            Ok(())
        }
        None => {
            run_status_command(&config, &loader, config_file);
            Ok(())
        }
    }
}

/// Build an engine holding just the requested list
async fn engine_for(
    config: EngineConfig,
    loader: &ListLoader,
    list: &str,
) -> anyhow::Result<MatchingEngine> {
    let entries = loader.read_list(list)?;
    let engine = MatchingEngine::new(config);
    engine.register_list(list, entries).await?;
    Ok(engine)
}

/// Match colors and print one line (or JSON object) per color
async fn run_match_command(
    config: EngineConfig,
    loader: &ListLoader,
    colors: &[String],
    list: &str,
    unique: bool,
    as_json: bool,
) -> anyhow::Result<()> {
    let engine = engine_for(config, loader, list).await?;

    let (batch, exhausted) = match engine.match_batch(colors, list, unique).await {
        Ok(batch) => (batch, false),
        Err(MatchError::Exhaustion(batch)) => (batch, true),
        Err(e) => return Err(e.into()),
    };

    if as_json {
        let items: Vec<_> = batch
            .items
            .iter()
            .map(|item| {
                let color = item
                    .matched
                    .as_ref()
                    .map(|m| engine.hydrate(&m.entry));
                json!({
                    "hex": item.hex,
                    "match": item.matched,
                    "color": color,
                    "error": item.error,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "list": batch.list,
                "unique": batch.unique,
                "items": items,
            }))?
        );
    } else {
        for item in &batch.items {
            print_item(item);
        }
    }

    if exhausted {
        anyhow::bail!(
            "Color list {list} ran out of names: {} of {} colors matched",
            batch.matched_count(),
            batch.items.len()
        );
    }
    Ok(())
}

fn print_item(item: &BatchItem) {
    match (&item.matched, &item.error) {
        (Some(m), _) => println!(
            "{:<10} {:<24} {}  (distance {:.2})",
            item.hex, m.entry.name, m.entry.hex, m.distance
        ),
        (None, Some(e)) => println!("{:<10} error: {e}", item.hex),
        (None, None) => println!("{:<10} -", item.hex),
    }
}

/// Print the k nearest names of a color
async fn run_nearest_command(
    config: EngineConfig,
    loader: &ListLoader,
    color: &str,
    list: &str,
    k: usize,
    as_json: bool,
) -> anyhow::Result<()> {
    let engine = engine_for(config, loader, list).await?;
    let found = engine.nearest(color, list, k).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    for (rank, m) in found.iter().enumerate() {
        println!(
            "{:>2}. {:<24} {}  (distance {:.2})",
            rank + 1,
            m.entry.name,
            m.entry.hex,
            m.distance
        );
    }
    Ok(())
}

/// Print available lists with their size and metric
fn run_lists_command(config: &EngineConfig, loader: &ListLoader) {
    for id in loader.list_ids() {
        match loader.read_list(&id) {
            Ok(entries) => println!(
                "  {id:<16} {:>5} colors  ({})",
                entries.len(),
                config.metric_for(&id)
            ),
            Err(e) => println!("  {id:<16} error: {e}"),
        }
    }
}

/// Display status and configuration information
fn run_status_command(config: &EngineConfig, loader: &ListLoader, config_file: Option<PathBuf>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let lists_dir = std::env::var("LISTS_DIR").ok();

    println!("Colorname v{VERSION}");
    println!("Nearest color-name matching\n");

    println!("Environment Variables:");
    println!(
        "  COLORNAME_CONFIG = {}",
        std::env::var("COLORNAME_CONFIG")
            .as_deref()
            .unwrap_or("(not set)")
    );
    println!(
        "  LISTS_DIR        = {}",
        lists_dir.as_deref().unwrap_or("(not set)")
    );

    println!("\nConfiguration:");
    let config_source = match config_file {
        Some(path) if path.exists() => path.display().to_string(),
        Some(_) => "defaults (file not found)".to_string(),
        None => "defaults".to_string(),
    };
    println!("  Source:          {config_source}");
    println!("  Default metric:  {}", config.default_metric);
    println!(
        "  Caches:          {} hydrated, {} matches",
        config.hydration_cache_capacity, config.match_cache_capacity
    );
    println!("  Eager build:     {}", config.eager_build);

    let ids = loader.list_ids();
    let embedded = ListLoader::list_embedded().len();
    println!("\nColor Lists ({} available, {embedded} embedded):", ids.len());
    for id in ids {
        println!("  {id}");
    }

    println!("\nRun 'colorname match <HEX>...' to name colors.");
}
