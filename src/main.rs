use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use coinafrique_scraper::cleaning::{
    normalize_with_report, normalize_with_settings, CleaningReport, NormalizedListing,
};
use coinafrique_scraper::stats::{price_histogram, render_markdown, summarize, MAX_HISTOGRAM_BINS};
use coinafrique_scraper::table::{save_records, ListingTable};
use coinafrique_scraper::{runner, Category, Extractor, HttpFetcher, RunReport, Settings};

#[derive(Parser)]
#[command(name = "coinafrique_scraper", about = "CoinAfrique category scraper and price summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the categories that can be scraped
    Categories,
    /// Scrape category pages into a raw CSV
    Scrape {
        /// Category slug or label (e.g. vetements-homme)
        #[arg(short, long)]
        category: String,
        /// Number of pages to scrape (1-10)
        #[arg(short, long, default_value = "1")]
        pages: u32,
        /// Raw CSV output
        #[arg(short, long, default_value = "data/coinafrique_raw.csv")]
        out: PathBuf,
        /// Also write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Clean a raw CSV: numeric prices, outliers and empty fields removed
    Clean {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = "data/coinafrique_clean.csv")]
        out: PathBuf,
        /// Override the configured price ceiling
        #[arg(long)]
        ceiling: Option<f64>,
    },
    /// Price analysis of a raw or cleaned CSV
    Summary {
        #[arg(short, long)]
        input: PathBuf,
        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
        /// Histogram bins (1-200)
        #[arg(long, default_value = "20", value_parser = bins_parser())]
        bins: u16,
        /// Locations to list
        #[arg(long, default_value = "10")]
        top: usize,
        #[arg(long)]
        ceiling: Option<f64>,
    },
    /// Show the first rows of a CSV
    Preview {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },
    /// Scrape, clean and summarize in one go
    Run {
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value = "1")]
        pages: u32,
        /// Directory for the raw and cleaned CSVs
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
        #[arg(long, default_value = "20", value_parser = bins_parser())]
        bins: u16,
    },
}

fn bins_parser() -> clap::builder::RangedI64ValueParser<u16> {
    clap::value_parser!(u16).range(1..=MAX_HISTOGRAM_BINS as i64)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    info!(?settings, "settings loaded");

    match cli.command {
        Commands::Categories => {
            for c in Category::ALL {
                println!("{:<20} {:<20} {}", c.slug(), c.label(), c.base_url(&settings.site_url));
            }
        }
        Commands::Scrape {
            category,
            pages,
            out,
            report,
        } => {
            let category: Category = category.parse()?;
            let (table, run_report) = scrape(&settings, category, pages)?;
            print_run_report(&run_report);
            write_raw(&table, &out)?;
            if let Some(path) = report {
                ensure_parent(&path)?;
                std::fs::write(&path, serde_json::to_string_pretty(&run_report)?)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Run report written to {:?}", path);
            }
        }
        Commands::Clean {
            input,
            out,
            ceiling,
        } => {
            let table = load(&input)?;
            let (rows, report) = clean(&settings, &table, ceiling);
            print_cleaning_report(&report);
            write_clean(&rows, &out)?;
        }
        Commands::Summary {
            input,
            json,
            bins,
            top,
            ceiling,
        } => {
            // Normalizing is idempotent, so a cleaned file goes through unchanged.
            let table = load(&input)?;
            let (rows, _) = clean(&settings, &table, ceiling);
            let view = summarize(&rows);
            if json {
                let histogram = price_histogram(&rows, bins.into());
                let out = serde_json::json!({ "summary": view, "histogram": histogram });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", render_markdown(&view, &price_histogram(&rows, bins.into()), top));
            }
        }
        Commands::Preview { input, limit } => {
            let table = load(&input)?;
            print_preview(&table, limit);
        }
        Commands::Run {
            category,
            pages,
            out_dir,
            bins,
        } => {
            let category: Category = category.parse()?;
            let (table, run_report) = scrape(&settings, category, pages)?;
            print_run_report(&run_report);
            write_raw(&table, &out_dir.join(format!("{}_raw.csv", category.slug())))?;

            let (rows, report) = clean(&settings, &table, None);
            print_cleaning_report(&report);
            write_clean(&rows, &out_dir.join(format!("{}_clean.csv", category.slug())))?;

            println!();
            println!("{}", render_markdown(&summarize(&rows), &price_histogram(&rows, bins.into()), 10));
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn scrape(settings: &Settings, category: Category, pages: u32) -> Result<(ListingTable, RunReport)> {
    let fetcher = HttpFetcher::from_settings(settings)?;
    let extractor = Extractor::from_settings(settings)?;

    println!("Scraping {} page(s) of {}...", pages, category.label());
    let pb = ProgressBar::new(pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages ({percent}%)")?
            .progress_chars("=> "),
    );

    let result = runner::run(&fetcher, &extractor, category, pages, settings, |p| {
        pb.set_position(p.page as u64)
    });
    pb.finish_and_clear();
    Ok(result?)
}

fn clean(
    settings: &Settings,
    table: &ListingTable,
    ceiling: Option<f64>,
) -> (Vec<NormalizedListing>, CleaningReport) {
    match ceiling {
        Some(ceiling) => normalize_with_report(table, ceiling, &settings.currency_token),
        None => normalize_with_settings(table, settings),
    }
}

fn load(path: &Path) -> Result<ListingTable> {
    ListingTable::load(path).with_context(|| format!("Failed to read {:?}", path))
}

fn write_raw(table: &ListingTable, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    table
        .save(path)
        .with_context(|| format!("Failed to write {:?}", path))?;
    println!("Saved {} raw listings to {:?}", table.len(), path);
    Ok(())
}

fn write_clean(rows: &[NormalizedListing], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    save_records(path, rows).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Saved {} cleaned listings to {:?}", rows.len(), path);
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    Ok(())
}

fn print_run_report(r: &RunReport) {
    println!(
        "Scraped {} pages ({} failed, {} empty): {} listings, {} blocks skipped.",
        r.pages_attempted, r.pages_failed, r.pages_empty, r.listings_extracted, r.blocks_skipped
    );
    for f in &r.failures {
        println!("  page {}: {}", f.page, f.error);
    }
}

fn print_cleaning_report(r: &CleaningReport) {
    println!(
        "Cleaned {} rows: kept {}, dropped {} (price {}, ceiling {}, empty field {}).",
        r.input_rows,
        r.kept,
        r.dropped(),
        r.dropped_unparsable_price,
        r.dropped_over_ceiling,
        r.dropped_missing_field
    );
}

fn print_preview(table: &ListingTable, limit: usize) {
    println!(
        "{:>3} | {:<32} | {:>14} | {:<24} | {:<30}",
        "#", "Titre", "Prix", "Adresse", "Image"
    );
    println!("{}", "-".repeat(115));
    for (i, r) in table.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<32} | {:>14} | {:<24} | {:<30}",
            i + 1,
            truncate(&r.title, 32),
            truncate(&r.price_text, 14),
            truncate(&r.location, 24),
            truncate(&r.image_url, 30)
        );
    }
    println!("\n{} rows total", table.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
