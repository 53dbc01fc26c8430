//! # Prodmatch CLI (`pmx`)
//!
//! The `pmx` binary analyzes product descriptions against the ERP
//! catalog and reports structured link-or-register decisions.
//!
//! ## Usage
//!
//! ```bash
//! pmx --config ./config/pmx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pmx analyze "<desc>"` | Analyze one description and print the decision outcome |
//! | `pmx batch <items.json>` | Analyze a JSON array of invoice items sequentially |
//! | `pmx search "<query>"` | Run the hybrid search only (no decision policy) |
//! | `pmx groups` | List catalog groups bucketed by identifier |
//! | `pmx units` | List catalog units of measure |
//!
//! ## Examples
//!
//! ```bash
//! # Decide link-vs-register for one invoice line
//! pmx analyze "CERA ACRILICA RENKO 5L" --supplier-code FORN-001
//!
//! # Register automatically when no confident match exists
//! pmx analyze "LONA PLASTICA PRETA 4X100M" --auto-register
//!
//! # Deterministic ranking only, skipping the AI stage
//! pmx search "CIMENTO CP II 50KG" --limit 10 --no-ai
//! ```
//!
//! Credentials come from the environment: `ERP_PASSWORD` for the catalog
//! API, `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` for the AI providers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use prodmatch::config::{load_config, Config};
use prodmatch::erp::ErpClient;
use prodmatch::providers::create_provider;
use prodmatch_core::analyzer::ProductAnalyzer;
use prodmatch_core::catalog::CatalogApi;
use prodmatch_core::models::BatchItem;
use prodmatch_core::search::HybridMatcher;

/// Prodmatch CLI — hybrid product matching and classification for ERP
/// catalogs.
#[derive(Parser)]
#[command(
    name = "pmx",
    about = "Hybrid product matching and classification for ERP catalogs",
    version,
    long_about = "Prodmatch matches free-text product descriptions against an ERP catalog \
    using a deterministic fuzzy pre-filter plus optional AI re-ranking, and decides per item \
    whether to link it to an existing record or register a new one (classifying category \
    group and unit of measure automatically)."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pmx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one product description and print the decision outcome.
    Analyze {
        /// Free-text product description (e.g. an invoice line).
        description: String,

        /// Supplier's code for the item, stored as the alternate code on
        /// registration.
        #[arg(long)]
        supplier_code: Option<String>,

        /// Extra free-text context forwarded to the AI stage.
        #[arg(long)]
        context: Option<String>,

        /// Execute the registration when the decision requires one.
        #[arg(long)]
        auto_register: bool,

        /// Skip the AI stage; deterministic pre-filter scores only.
        #[arg(long)]
        no_ai: bool,
    },

    /// Analyze a batch of items from a JSON file.
    ///
    /// The file holds an array of objects:
    /// `[{"descricao": "...", "codigo_fornecedor": "..."}]`.
    Batch {
        /// Path to the JSON items file.
        file: PathBuf,

        /// Execute registrations when decisions require them.
        #[arg(long)]
        auto_register: bool,
    },

    /// Run the hybrid search and print the ranked candidates.
    Search {
        /// Search query.
        query: String,

        /// Maximum results to return.
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Extra free-text context forwarded to the AI stage.
        #[arg(long)]
        context: Option<String>,

        /// Skip the AI stage; deterministic pre-filter scores only.
        #[arg(long)]
        no_ai: bool,
    },

    /// List catalog groups bucketed by identifier (base category).
    Groups,

    /// List catalog units of measure.
    Units,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Analyze {
            description,
            supplier_code,
            context,
            auto_register,
            no_ai,
        } => {
            let analyzer = build_analyzer(&config, no_ai)?;
            let outcome = analyzer
                .analyze(
                    &description,
                    supplier_code.as_deref(),
                    context.as_deref(),
                    auto_register,
                )
                .await;
            println!("{}", outcome.to_json());
        }

        Commands::Batch {
            file,
            auto_register,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read items file: {}", file.display()))?;
            let items: Vec<BatchItem> =
                serde_json::from_str(&content).context("Items file must be a JSON array")?;

            let analyzer = build_analyzer(&config, false)?;
            let report = analyzer.analyze_batch(&items, auto_register).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Search {
            query,
            limit,
            context,
            no_ai,
        } => {
            let client = ErpClient::new(&config.api)?;
            let provider = if no_ai {
                None
            } else {
                create_provider(&config.ai)?
            };

            let products = client.fetch_products().await?;
            let matcher = HybridMatcher::with_weights(
                products,
                config.ai.weight_prefilter,
                config.ai.weight_ai,
            );

            let result = matcher
                .search(
                    provider.as_deref(),
                    &query,
                    limit,
                    provider.is_some(),
                    context.as_deref(),
                )
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Groups => {
            let client = ErpClient::new(&config.api)?;
            let groups = client.fetch_groups().await?;
            print_groups(&groups);
        }

        Commands::Units => {
            let client = ErpClient::new(&config.api)?;
            let units = client.fetch_units().await?;
            println!("Total units: {}\n", units.len());
            for unit in &units {
                println!("  {:>6}  {}", unit.code, unit.description);
            }
        }
    }

    Ok(())
}

fn build_analyzer(config: &Config, no_ai: bool) -> Result<ProductAnalyzer<ErpClient>> {
    let client = ErpClient::new(&config.api)?;
    let provider = if no_ai {
        None
    } else {
        create_provider(&config.ai)?
    };

    Ok(ProductAnalyzer::with_weights(
        client,
        provider,
        config.ai.weight_prefilter,
        config.ai.weight_ai,
    )
    .with_limit(config.matching.limit))
}

fn print_groups(groups: &[prodmatch_core::models::Group]) {
    println!("Total groups: {}\n", groups.len());

    let mut by_identifier: BTreeMap<&str, Vec<&prodmatch_core::models::Group>> = BTreeMap::new();
    for group in groups {
        by_identifier.entry(group.identifier.as_str()).or_default().push(group);
    }

    println!("Groups by identifier (base category)");
    println!("{}", "=".repeat(60));

    for (identifier, bucket) in by_identifier {
        println!("\nIdentifier: {identifier}");
        println!("{}", "-".repeat(40));
        for group in &bucket {
            println!("  {:>5}  {}", group.code, group.description);
        }
    }
}
