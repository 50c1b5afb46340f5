//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the launch bundler.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::jito::JitoBundleClient;
use crate::adapters::pump_portal::PumpPortalClient;
use crate::adapters::solana::{load_mint, save_mint, SolanaClient};
use crate::adapters::wallet_store::{CachedBalances, JsonWalletStore};
use crate::application::{
    BundleSubmitter, ExitOrchestrator, LaunchOrchestrator, ProgressReporter, RunFailure,
    VanityConfig, VanitySearch,
};
use crate::config::{load_config, Config, DEFAULT_CONFIG_PATH};
use crate::domain::{
    lamports_to_sol, AmountPolicy, FeedPayload, GroupPlanner, LaunchStrategy, MintIdentity,
    TokenPayload,
};
use crate::ports::{BalanceSourcePort, WalletStorePort};

/// Launch Bundler - bundled token launch and exit for Solana
#[derive(Parser, Debug)]
#[command(
    name = "launch-bundler",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Bundled token launch and exit orchestration for Solana",
    long_about = "Launch Bundler creates a token from a creator wallet and buys in from \
                  backing wallets through Jito bundles, sells out the same way, and \
                  searches for vanity mint addresses."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for a mint keypair whose address ends with a suffix
    Vanity(VanityCmd),

    /// Create the token and buy in from every backing wallet
    Launch(LaunchCmd),

    /// Sell out of a launched token from every wallet
    Exit(ExitCmd),

    /// Check wallet balances against the configured buy range
    Balances(BalancesCmd),
}

/// Vanity mint search
#[derive(Parser, Debug)]
pub struct VanityCmd {
    /// Address suffix (case-sensitive, base58 characters only)
    #[arg(short, long, value_name = "SUFFIX")]
    pub suffix: String,

    /// Save the keypair as a Solana CLI keypair file
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Token launch
#[derive(Parser, Debug)]
pub struct LaunchCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Mint keypair file (from `vanity --out`)
    #[arg(long, value_name = "FILE", conflicts_with = "suffix")]
    pub mint_keypair: Option<PathBuf>,

    /// Search for a vanity mint before launching
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Token name
    #[arg(long, value_name = "NAME", conflicts_with = "metadata")]
    pub name: Option<String>,

    /// Token symbol
    #[arg(long, value_name = "SYMBOL", conflicts_with = "metadata")]
    pub symbol: Option<String>,

    /// Metadata URI (overrides the feed's URI with --metadata)
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,

    /// Launch feed payload (JSON) to take metadata from
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// How the feed payload maps to metadata: mountain, random
    #[arg(long, value_name = "STRATEGY", default_value = "mountain")]
    pub strategy: LaunchStrategy,

    /// Override minimum buy in SOL
    #[arg(long, value_name = "SOL")]
    pub min: Option<Decimal>,

    /// Override maximum buy in SOL
    #[arg(long, value_name = "SOL")]
    pub max: Option<Decimal>,
}

/// Sell out
#[derive(Parser, Debug)]
pub struct ExitCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Mint address of the launched token
    #[arg(long, value_name = "ADDRESS")]
    pub mint: Pubkey,

    /// Share of holdings to sell, 1-100
    #[arg(long, value_name = "PERCENT")]
    pub percent: Option<u8>,
}

/// Balance preflight only
#[derive(Parser, Debug)]
pub struct BalancesCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    match app.command {
        Command::Vanity(cmd) => vanity_command(cmd).await,
        Command::Launch(cmd) => launch_command(cmd).await,
        Command::Exit(cmd) => exit_command(cmd).await,
        Command::Balances(cmd) => balances_command(cmd).await,
    }
}

/// Handle vanity command
async fn vanity_command(cmd: VanityCmd) -> Result<()> {
    let (vanity, interval) = if cmd.config.exists() {
        let config = load_config(&cmd.config).context("Failed to load configuration")?;
        (config.vanity_config(), config.progress_interval())
    } else {
        tracing::warn!("Config {} not found, using vanity defaults", cmd.config.display());
        (VanityConfig::default(), std::time::Duration::from_secs(1))
    };

    let mint = find_vanity_mint(&cmd.suffix, vanity, interval).await?;

    if let Some(ref out) = cmd.out {
        save_mint(out, &mint).with_context(|| format!("Failed to save keypair to {}", out.display()))?;
        println!("  Saved: {}", out.display());
    }
    Ok(())
}

/// Run a vanity search, stopping on Ctrl+C
async fn find_vanity_mint(
    suffix: &str,
    config: VanityConfig,
    interval: std::time::Duration,
) -> Result<MintIdentity> {
    let search = Arc::new(VanitySearch::new(config));

    let stopper = Arc::clone(&search);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            stopper.stop();
        }
    });

    let mut reporter = ProgressReporter::new(interval);
    let result = search
        .search(suffix, |progress| {
            reporter.record(progress);
        })
        .await;
    ctrl_c.abort();

    let found = result.context("Vanity search failed")?;
    println!("✓ Found vanity address");
    println!("  Address:  {}", found.mint.address());
    println!("  Attempts: {} (winning worker)", found.attempts);
    println!("  Workers:  {}", found.workers);
    println!("  Elapsed:  {:.1}s", found.elapsed.as_secs_f64());
    Ok(found.mint)
}

/// Handle launch command
async fn launch_command(cmd: LaunchCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let token = resolve_token(&cmd)?;

    let mint = match (&cmd.mint_keypair, &cmd.suffix) {
        (Some(path), _) => load_mint(path)
            .with_context(|| format!("Failed to load mint keypair from {}", path.display()))?,
        (None, Some(suffix)) => {
            find_vanity_mint(suffix, config.vanity_config(), config.progress_interval()).await?
        }
        (None, None) => {
            tracing::warn!("No mint keypair or suffix given, using a random mint");
            MintIdentity::new(solana_sdk::signature::Keypair::new())
        }
    };

    let policy = match (cmd.min, cmd.max) {
        (None, None) => config.amount_policy()?,
        (min, max) => AmountPolicy::uniform(
            min.unwrap_or(config.trade.min_buy_sol),
            max.unwrap_or(config.trade.max_buy_sol),
        )?,
    };

    let orchestrator = build_launch(&config, policy)?;
    match orchestrator.run(&mint, &token).await {
        Ok(report) => {
            println!("✓ Launch complete");
            println!("  Mint:      {}", report.mint);
            println!("  Wallets:   {}", report.wallets);
            println!("  Total SOL: {}", report.total_sol);
            println!("  Duration:  {}s", (report.finished_at - report.started_at).num_seconds());
            for receipt in &report.receipts {
                println!("  Group {} bundle {}", receipt.group, receipt.bundle_id);
                for link in receipt.explorer_links() {
                    println!("    {}", link);
                }
            }
            Ok(())
        }
        Err(failure) => Err(report_failure(failure)),
    }
}

/// Token payload from flags or a feed file
fn resolve_token(cmd: &LaunchCmd) -> Result<TokenPayload> {
    if let Some(ref path) = cmd.metadata {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata from {}", path.display()))?;
        let feed: FeedPayload =
            serde_json::from_str(&contents).context("Failed to parse launch feed payload")?;
        let metadata = cmd.strategy.map(&feed);
        tracing::info!(strategy = %cmd.strategy, name = %metadata.name, symbol = %metadata.symbol, "Mapped feed metadata");
        return metadata
            .into_payload(cmd.uri.clone())
            .context("Feed payload has no metadata URI; pass --uri");
    }

    match (&cmd.name, &cmd.symbol, &cmd.uri) {
        (Some(name), Some(symbol), Some(uri)) => Ok(TokenPayload {
            name: name.clone(),
            symbol: symbol.clone(),
            uri: uri.clone(),
        }),
        _ => bail!("Pass --name, --symbol and --uri, or --metadata FILE"),
    }
}

/// Handle exit command
async fn exit_command(cmd: ExitCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let (store, balances) = build_sources(&config);
    let orchestrator = ExitOrchestrator::new(store, balances, build_submitter(&config)?)
        .with_planner(GroupPlanner::new(config.planner_config())?)
        .with_builder(config.bundle_builder()?)
        .with_preflight(config.preflight()?)
        .with_percent(cmd.percent.unwrap_or(config.trade.sell_percent))?;

    match orchestrator.run(&cmd.mint).await {
        Ok(report) => {
            println!("✓ Exit complete");
            println!("  Mint:    {}", report.mint);
            println!("  Wallets: {}", report.wallets);
            println!("  Sold:    {}% of holdings", report.percent);
            for receipt in &report.receipts {
                println!("  Group {} bundle {}", receipt.group, receipt.bundle_id);
            }
            Ok(())
        }
        Err(failure) => Err(report_failure(failure)),
    }
}

/// Handle balances command
async fn balances_command(cmd: BalancesCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let orchestrator = build_launch(&config, config.amount_policy()?)?;

    let results = orchestrator
        .check_balances()
        .await
        .context("Balance check failed")?;

    println!("{:<46} {:>14} {:>14}  STATUS", "WALLET", "BALANCE", "REQUIRED");
    for result in &results {
        println!(
            "{:<46} {:>14} {:>14}  {}",
            result.address,
            lamports_to_sol(result.current_lamports),
            lamports_to_sol(result.required_lamports),
            if result.sufficient { "ok" } else { "SHORT" }
        );
    }

    let short = results.iter().filter(|r| !r.sufficient).count();
    if short > 0 {
        bail!("{} of {} wallets are short", short, results.len());
    }
    println!("\n✓ All {} wallets funded", results.len());
    Ok(())
}

fn build_sources(config: &Config) -> (Arc<dyn WalletStorePort>, Arc<dyn BalanceSourcePort>) {
    let store_path = config.wallets.get_store_path();
    tracing::info!("Wallet store: {}", store_path.display());
    let store: Arc<dyn WalletStorePort> = Arc::new(JsonWalletStore::new(store_path));

    let balances: Arc<dyn BalanceSourcePort> = if config.balance.use_cached_balances {
        tracing::warn!("Using cached balances from the wallet store");
        Arc::new(CachedBalances::new(Arc::clone(&store)))
    } else {
        let client = SolanaClient::new(config.endpoints.get_rpc_url());
        tracing::info!(rpc = %client.url(), "Reading balances over RPC");
        Arc::new(client)
    };
    (store, balances)
}

fn build_submitter(config: &Config) -> Result<BundleSubmitter> {
    let compiler = PumpPortalClient::with_url(config.endpoints.compiler_url.clone())
        .context("Failed to create compiler client")?;
    let relay = JitoBundleClient::with_config(config.jito_config()?)
        .context("Failed to create relay client")?;

    Ok(BundleSubmitter::new(Arc::new(compiler), Arc::new(relay))
        .with_inter_group_delay(config.inter_group_delay()))
}

fn build_launch(config: &Config, policy: AmountPolicy) -> Result<LaunchOrchestrator> {
    let (store, balances) = build_sources(config);
    Ok(LaunchOrchestrator::new(store, balances, build_submitter(config)?, policy)
        .with_planner(GroupPlanner::new(config.planner_config())?)
        .with_builder(config.bundle_builder()?)
        .with_preflight(config.preflight()?))
}

/// Print what was already submitted before surfacing the error
fn report_failure(failure: RunFailure) -> anyhow::Error {
    if failure.is_partial() {
        eprintln!("✗ Run stopped after {} accepted group(s); these are NOT rolled back:", failure.completed.len());
        for receipt in &failure.completed {
            eprintln!("  Group {} bundle {}", receipt.group, receipt.bundle_id);
            for link in receipt.explorer_links() {
                eprintln!("    {}", link);
            }
        }
    }
    anyhow::Error::new(failure)
}
