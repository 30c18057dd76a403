//! Subcommand handlers for the utxowatch CLI.

use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use utxowatch_core::config::WatchConfig;
use utxowatch_core::details::DetailGenerator;
use utxowatch_core::engine::spawn_engine;
use utxowatch_core::market::MarketGenerator;
use utxowatch_core::rates::{Currency, RateTable, fiat_to_sats, sats_to_fiat};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the live simulation and print each tick
    Watch {
        /// Number of ticks to observe before exiting
        #[arg(long, default_value_t = 10)]
        ticks: u64,

        /// Deterministic seed (overrides UTXOWATCH_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate one snapshot and print it
    Snapshot {
        /// Deterministic seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full snapshot as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Convert between satoshis and fiat at the reference rates
    Convert {
        /// Amount to convert (satoshis, or fiat with --from-fiat)
        amount: f64,

        /// Currency code (USD, EUR, GBP, JPY, CAD, AUD, CHF, CNY)
        #[arg(long, default_value = "USD")]
        currency: String,

        /// Treat the amount as fiat and convert to satoshis
        #[arg(long)]
        from_fiat: bool,
    },

    /// Fabricate an explorer detail record and print it as JSON
    Detail {
        #[command(subcommand)]
        kind: DetailKind,
    },
}

#[derive(Subcommand)]
pub enum DetailKind {
    /// Transaction detail for a txid
    Tx { txid: String },
    /// Block detail for a height or hash
    Block { identifier: String },
    /// Address detail
    Address { address: String },
}

pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Watch { ticks, seed } => watch(ticks, seed).await,
        Commands::Snapshot { seed, json } => snapshot(seed, json),
        Commands::Convert {
            amount,
            currency,
            from_fiat,
        } => convert(amount, &currency, from_fiat),
        Commands::Detail { kind } => detail(kind),
    }
}

async fn watch(ticks: u64, seed: Option<u64>) -> anyhow::Result<()> {
    let mut config = WatchConfig::from_env();
    if seed.is_some() {
        config.simulation.deterministic_seed = seed;
    }

    tracing::info!("Starting simulation engine for {ticks} ticks");
    let handle = spawn_engine(config);
    let mut subscription = handle.subscribe();

    let initial = subscription.borrow_and_update().clone();
    println!(
        "initial: price ${:.2}  mempool {}  fee {:.5} sat/vB",
        initial.market.current_price, initial.network.mempool_size, initial.network.avg_fee_rate
    );

    for _ in 0..ticks {
        subscription
            .changed()
            .await
            .context("engine stopped unexpectedly")?;
        let snapshot = subscription.borrow_and_update().clone();
        println!(
            "tick {:>4}: price ${:.2} ({:+.2} 24h)  mempool {}  fee {:.5} sat/vB  txs {}  blocks {}",
            snapshot.sequence,
            snapshot.market.current_price,
            snapshot.market.price_change_24h,
            snapshot.network.mempool_size,
            snapshot.network.avg_fee_rate,
            snapshot.transactions.len(),
            snapshot.blocks.len(),
        );
    }

    handle.shutdown().await?;
    Ok(())
}

fn snapshot(seed: Option<u64>, json: bool) -> anyhow::Result<()> {
    let mut config = WatchConfig::from_env();
    if seed.is_some() {
        config.simulation.deterministic_seed = seed;
    }

    let mut rng = seeded_rng(&config);
    let snapshot = MarketGenerator::new(config).snapshot(&mut rng, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("price    ${:.2}", snapshot.market.current_price);
        println!("mempool  {}", snapshot.network.mempool_size);
        println!("avg fee  {:.5} sat/vB", snapshot.network.avg_fee_rate);
        for block in snapshot.blocks.iter() {
            println!(
                "block {}  {} txs  {:.2} MB  mined by {}",
                block.height, block.transactions, block.size_mb, block.miner
            );
        }
        for tx in snapshot.transactions.iter() {
            println!(
                "tx {}  {:.8} BTC  fee {:.8}  {} conf",
                tx.hash, tx.amount, tx.fee, tx.confirmations
            );
        }
    }

    Ok(())
}

fn convert(amount: f64, currency: &str, from_fiat: bool) -> anyhow::Result<()> {
    let currency: Currency = currency.parse()?;
    let rates = RateTable::default();

    if from_fiat {
        let sats = fiat_to_sats(amount, currency, &rates)?;
        println!("{amount:.2} {currency} = {sats} sats");
    } else {
        if amount.fract() != 0.0 || amount < 0.0 {
            anyhow::bail!("satoshi amounts must be non-negative integers");
        }
        let fiat = sats_to_fiat(amount as u64, currency, &rates)?;
        println!("{} sats = {fiat:.2} {currency}", amount as u64);
    }

    Ok(())
}

fn detail(kind: DetailKind) -> anyhow::Result<()> {
    let config = WatchConfig::from_env();
    let mut rng = seeded_rng(&config);
    let generator = DetailGenerator::new(config);
    let now = Utc::now();

    let rendered = match kind {
        DetailKind::Tx { txid } => {
            serde_json::to_string_pretty(&generator.transaction(&mut rng, &txid, now))?
        }
        DetailKind::Block { identifier } => {
            serde_json::to_string_pretty(&generator.block(&mut rng, &identifier, now))?
        }
        DetailKind::Address { address } => {
            serde_json::to_string_pretty(&generator.address(&mut rng, &address, now))?
        }
    };
    println!("{rendered}");

    Ok(())
}

fn seeded_rng(config: &WatchConfig) -> ChaCha8Rng {
    match config.simulation.deterministic_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    }
}
