use clap::{Parser, Subcommand};
use eyre::{eyre, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use neura_swap::chain::RpcClientFactory;
use neura_swap::config::{load_wallets, BotConfig};
use neura_swap::error::SwapError;
use neura_swap::scheduler::{FleetPlan, FleetScheduler, RoundReport};
use neura_swap::tokens::{SubgraphCatalog, Token, TokenCatalog};
use neura_swap::units::parse_amount;

#[derive(Parser)]
#[command(name = "neura-swap")]
#[command(about = "Neura Testnet Swap Bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tokens available for swapping
    Tokens,

    /// Swap back and forth for every wallet, then repeat every 24 hours
    Run(PlanArgs),

    /// Run a single round over all wallets and exit
    Once(PlanArgs),
}

#[derive(clap::Args)]
struct PlanArgs {
    /// Symbol to swap from (ANKR for the native asset)
    #[arg(long)]
    from: String,

    /// Symbol to swap to
    #[arg(long)]
    to: String,

    /// Amount of `from` to swap each cycle, e.g. 0.1
    #[arg(long)]
    amount: String,

    /// Forward + swap-back cycles per wallet
    #[arg(long, default_value = "1")]
    repeats: u32,
}

impl PlanArgs {
    fn into_plan(self) -> Result<FleetPlan> {
        if self.from.eq_ignore_ascii_case(&self.to) {
            return Err(eyre!("--from and --to must be different tokens"));
        }
        if self.repeats == 0 {
            return Err(eyre!("--repeats must be at least 1"));
        }
        parse_amount(&self.amount).map_err(|e| eyre!("invalid --amount: {}", e))?;

        Ok(FleetPlan {
            from_symbol: self.from,
            to_symbol: self.to,
            amount: self.amount.trim().to_string(),
            repeats: self.repeats,
        })
    }
}

fn print_tokens(tokens: &[Token]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                      AVAILABLE TOKENS                        ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (index, token) in tokens.iter().enumerate() {
        println!(
            "║ {:>3}. {:<8} {:?} {:>2} dec ║",
            index + 1,
            token.symbol,
            token.address,
            token.decimals
        );
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

async fn run_tokens(config: &BotConfig) -> Result<()> {
    let catalog = SubgraphCatalog::new(&config.catalog_url)?;
    let tokens = catalog.fetch_tokens().await?;
    print_tokens(&tokens);
    Ok(())
}

fn build_scheduler(
    config: &BotConfig,
    args: PlanArgs,
    cancel: CancellationToken,
) -> Result<FleetScheduler<RpcClientFactory, SubgraphCatalog>> {
    let plan = args.into_plan()?;

    let wallets = load_wallets()?;
    if wallets.is_empty() {
        return Err(eyre!("No wallets configured. Set PRIVATE_KEY_1, PRIVATE_KEY_2, ..."));
    }
    info!("Loaded {} wallet(s)", wallets.len());
    for wallet in &wallets {
        info!("  {}", wallet.short_address());
    }

    Ok(FleetScheduler::new(
        RpcClientFactory::new(config),
        SubgraphCatalog::new(&config.catalog_url)?,
        wallets,
        plan,
        config.swap.clone(),
        cancel,
    ))
}

/// `RUST_LOG` directives on top of an `info` default
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Outcome of a single `once` round. Ctrl+C is a clean stop, like `run`.
fn finish_once(round: Result<RoundReport>) -> Result<()> {
    match round {
        Ok(report) => {
            info!(
                "Round finished: {} wallet(s) completed, {} failed",
                report.wallets_completed, report.wallets_failed
            );
            Ok(())
        }
        Err(e) if matches!(e.downcast_ref::<SwapError>(), Some(SwapError::Cancelled)) => {
            info!("Round stopped before finishing");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Cancels `cancel` on Ctrl+C
fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, stopping after the current step...");
            cancel.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(&rust_log))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = BotConfig::from_env()?;

    match cli.command {
        Commands::Tokens => run_tokens(&config).await,
        Commands::Run(args) => {
            config.log_config();
            let cancel = CancellationToken::new();
            let scheduler = build_scheduler(&config, args, cancel.clone())?;
            spawn_shutdown_listener(cancel);
            scheduler.run_forever().await
        }
        Commands::Once(args) => {
            config.log_config();
            let cancel = CancellationToken::new();
            let scheduler = build_scheduler(&config, args, cancel.clone())?;
            spawn_shutdown_listener(cancel);
            finish_once(scheduler.run_round().await)
        }
    }
}
