use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use vitrine::{
    category::CategoryScraper,
    config::{Category, Config, PageCount},
    dataset::{RawTable, clean_raw, load_category, summarize},
    extractor::ListingTable,
    fetcher::HttpFetcher,
};

const ENV_LOG_FORMAT: &str = "VITRINE_LOG_FORMAT";

#[derive(Parser)]
#[command(name = "vitrine", about = "Scrape and clean CoinAfrique category listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported categories with their URLs and raw export paths
    Categories,
    /// Scrape category pages and output the normalized listings
    Scrape {
        /// Category label or slug (e.g. "chaussures-homme")
        category: Category,
        /// Number of pages to walk, clamped to 1..=100
        #[arg(short, long, default_value_t = 2)]
        pages: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the raw web-scraper export of a category as loaded
    Raw {
        /// Category label or slug
        category: Category,
        /// Read this file instead of the configured export
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Clean the raw web-scraper export of a category
    Clean {
        /// Category label or slug
        category: Category,
        /// Read this file instead of the configured export
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Headline figures of the cleaned export: counts, mean price, price bands, top addresses
    Summary {
        /// Category label or slug
        category: Category,
        /// Read this file instead of the configured export
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::Categories => {
            for category in Category::ALL {
                println!(
                    "{:<20} {:<20} {}  ({})",
                    category.label(),
                    category.slug(),
                    config.category_url(category),
                    config.raw_file(category).display()
                );
            }
            Ok(())
        }
        Commands::Scrape {
            category,
            pages,
            output,
        } => {
            let page_count = PageCount::clamped(pages);
            if page_count.get() != pages {
                warn!(requested = pages, using = page_count.get(), "page count clamped");
            }

            let fetcher = HttpFetcher::new(&config).context("failed to build HTTP client")?;
            let scraper = CategoryScraper::new(&config, fetcher)?;
            let outcome = scraper.scrape_category(category, page_count).await;

            info!(
                category = %category,
                records = outcome.table.len(),
                pages_failed = outcome.stats.pages_failed,
                "scrape finished"
            );
            write_table(&outcome.table, &output)
        }
        Commands::Raw {
            category,
            input,
            output,
        } => {
            let raw = load_raw(&config, category, input.as_deref())?;
            let mut writer = open_output(&output)?;
            match output.format {
                Format::Csv => raw.write_csv(&mut writer)?,
                Format::Json => {
                    serde_json::to_writer_pretty(&mut writer, &raw.to_json_rows())?;
                    writeln!(writer)?;
                }
            }
            writer.flush()?;
            Ok(())
        }
        Commands::Clean {
            category,
            input,
            output,
        } => {
            let raw = load_raw(&config, category, input.as_deref())?;
            let table = clean_raw(&raw)
                .with_context(|| format!("failed to clean raw export for {category}"))?;
            write_table(&table, &output)
        }
        Commands::Summary {
            category,
            input,
            json,
        } => {
            let raw = load_raw(&config, category, input.as_deref())?;
            let table = clean_raw(&raw)
                .with_context(|| format!("failed to clean raw export for {category}"))?;
            let summary = summarize(&table);

            let mut stdout = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut stdout, &summary)?;
                writeln!(stdout)?;
            } else {
                write!(stdout, "{summary}")?;
            }
            Ok(())
        }
    }
}

/// The configured export for `category`, or `input` when given.
fn load_raw(config: &Config, category: Category, input: Option<&Path>) -> Result<RawTable> {
    let raw = match input {
        Some(path) => RawTable::from_path(path),
        None => load_category(config, category),
    }
    .with_context(|| format!("failed to load raw export for {category}"))?;

    info!(category = %category, rows = raw.len(), columns = raw.headers().len(), "raw export loaded");
    Ok(raw)
}

fn open_output(output: &OutputArgs) -> Result<Box<dyn Write>> {
    Ok(match &output.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let json = std::env::var(ENV_LOG_FORMAT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // stdout carries the table; logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn write_table(table: &ListingTable, output: &OutputArgs) -> Result<()> {
    let mut writer = open_output(output)?;

    match output.format {
        Format::Csv => table.write_csv(&mut writer)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, &table.to_json_rows())?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    if let Some(path) = &output.out {
        info!(rows = table.len(), path = %path.display(), "table written");
    }
    Ok(())
}
