use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cinerank::catalog::{MovieManager, MovieRecord, NOT_AVAILABLE};
use cinerank::config::{default_config_path, Config};
use cinerank::util::truncate_to_width;

const TITLE_COLUMN_WIDTH: usize = 48;

#[derive(Parser, Debug)]
#[command(name = "cinerank", about = "Ranked movie chart with cached details")]
struct Args {
    /// Config file (default: ~/.config/cinerank/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Movie cache file (overrides `data_file` from the config)
    #[arg(long, value_name = "FILE", global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the ranked chart
    List {
        /// Number of entries to show
        #[arg(long, short)]
        limit: Option<u32>,

        /// Scrape the chart again even if it is cached
        #[arg(long)]
        refresh: bool,
    },
    /// Fetch and show details for one rank
    Show {
        rank: u32,
    },
    /// Fetch details for every cached rank, or those up to --max-rank
    FetchAll {
        #[arg(long)]
        max_rank: Option<u32>,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => match default_config_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn print_record(record: &MovieRecord) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    println!("#{} {}", record.rank, record.title);
    println!("  Year:      {}", field(&record.year));
    println!("  Director:  {}", field(&record.director));
    println!("  Rating:    {}", field(&record.rating));
    println!("  Genres:    {}", record.genre_label());
    println!("  Link:      {}", field(&record.url));
    println!("  Poster:    {}", field(&record.poster_url));
    println!();
    println!("{}", field(&record.storyline));
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let data_file = args
        .data_file
        .clone()
        .unwrap_or_else(|| config.data_file.clone());
    let default_limit = config.default_limit;

    let mut manager = MovieManager::new(config).context("Failed to create HTTP client")?;
    manager.load_from_file(&data_file);

    match args.command {
        Command::List { limit, refresh } => {
            let limit = limit.unwrap_or(default_limit);
            let movies = manager
                .discover(limit, refresh)
                .await
                .context("Failed to load the chart")?;
            for record in movies.values() {
                let marker = if record.details_fetched { '*' } else { ' ' };
                println!(
                    "{:>4}{} {}",
                    record.rank,
                    marker,
                    truncate_to_width(&record.title, TITLE_COLUMN_WIDTH)
                );
            }
        }
        Command::Show { rank } => {
            let result = manager.get_by_rank(rank).await;
            // Whatever was discovered along the way is worth keeping
            manager.save_to_file(&data_file);
            let record = result.with_context(|| format!("Failed to get movie #{rank}"))?;
            print_record(&record);
            return Ok(());
        }
        Command::FetchAll { max_rank } => {
            let movies = manager
                .hydrate_all(max_rank)
                .await
                .context("Failed to load the chart")?;
            let hydrated = movies.values().filter(|m| m.details_fetched).count();
            println!("{hydrated}/{} movies have details", movies.len());
        }
    }

    if !manager.save_to_file(&data_file) {
        eprintln!("Warning: could not save {}", data_file.display());
    }
    Ok(())
}
