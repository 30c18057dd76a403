//! Detail-record fabrication for the explorer pages.
//!
//! Transaction, block, and address detail views are backed by synthetic
//! records generated on demand from the identifier in the route. The
//! records are display-only but internally consistent: input/output
//! totals, fees, and address balances all add up.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::WatchConfig;
use crate::market::{random_id, round8};

/// Identifier length for detail-level hashes (two 13-char segments).
const DETAIL_ID_LEN: usize = 26;

/// Miner labels on detail pages (one more than the feed set).
const DETAIL_MINERS: [&str; 5] = ["Antpool", "F2Pool", "Foundry USA", "ViaBTC", "Binance Pool"];

/// Heights at or above this value have no next block yet.
const CHAIN_TIP_HEIGHT: u64 = 850_000;

/// One spent output funding a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    pub address: String,
    pub amount: f64,
    pub txid: String,
    pub vout: u32,
}

/// One output of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount: f64,
    pub spent: bool,
}

/// Full fabricated view of a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub txid: String,
    pub block_height: u64,
    pub block_hash: String,
    pub confirmations: u32,
    pub timestamp: DateTime<Utc>,
    /// `total_input - total_output`
    pub fee: f64,
    /// Size in bytes
    pub size: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub total_input: f64,
    pub total_output: f64,
}

/// A member transaction listed on a block page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTransaction {
    pub txid: String,
    pub fee: f64,
    pub size: u32,
    pub input_count: u32,
    pub output_count: u32,
    pub amount: f64,
}

/// Full fabricated view of a single block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDetail {
    pub height: u64,
    pub hash: String,
    pub previous_block_hash: String,
    /// Absent at the chain tip
    pub next_block_hash: Option<String>,
    pub merkle_root: String,
    pub timestamp: DateTime<Utc>,
    /// Difficulty label, e.g. `57.23T`
    pub difficulty: String,
    pub nonce: u32,
    pub version: u32,
    /// Size in bytes
    pub size: u64,
    pub weight: u64,
    pub transaction_count: u32,
    /// Sum of member transaction fees
    pub total_fees: f64,
    pub block_reward: f64,
    pub miner: String,
    pub confirmations: u32,
    /// Listed members, capped at 50
    pub transactions: Vec<BlockTransaction>,
}

/// Direction of an address-page transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Sent,
    Received,
}

/// One entry in an address history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressTransaction {
    pub txid: String,
    pub kind: TransferKind,
    pub amount: f64,
    pub confirmations: u32,
    pub timestamp: DateTime<Utc>,
    pub block_height: u64,
}

/// Full fabricated view of an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDetail {
    pub address: String,
    /// `total_received - total_sent`, floored at zero for display
    pub balance: f64,
    pub total_received: f64,
    pub total_sent: f64,
    pub transaction_count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Newest first
    pub transactions: Vec<AddressTransaction>,
}

/// Fabricates detail records from route identifiers.
#[derive(Debug, Clone)]
pub struct DetailGenerator {
    config: WatchConfig,
}

impl DetailGenerator {
    pub fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    /// Fabricates the detail view for a transaction id.
    pub fn transaction<R: Rng>(
        &self,
        rng: &mut R,
        txid: &str,
        now: DateTime<Utc>,
    ) -> TransactionDetail {
        let feeds = &self.config.feeds;
        let input_count = rng.random_range(1..=5);
        let output_count = rng.random_range(1..=5);

        let inputs: Vec<TxInput> = (0..input_count)
            .map(|vout| TxInput {
                address: fabricated_address(rng),
                amount: round8(rng.random::<f64>() * 5.0 + 0.1),
                txid: random_id(rng, 13),
                vout,
            })
            .collect();

        let outputs: Vec<TxOutput> = (0..output_count)
            .map(|_| TxOutput {
                address: fabricated_address(rng),
                amount: round8(rng.random::<f64>() * 3.0 + 0.05),
                spent: rng.random_bool(0.5),
            })
            .collect();

        let total_input = round8(inputs.iter().map(|input| input.amount).sum());
        let total_output = round8(outputs.iter().map(|output| output.amount).sum());

        TransactionDetail {
            txid: txid.to_string(),
            block_height: feeds.block_height_base + rng.random_range(0..feeds.block_height_span),
            block_hash: random_id(rng, 13),
            confirmations: rng.random_range(0..100),
            timestamp: past_timestamp(rng, now, 7),
            fee: round8(total_input - total_output),
            size: rng.random_range(200..700),
            inputs,
            outputs,
            total_input,
            total_output,
        }
    }

    /// Fabricates the detail view for a block.
    ///
    /// A purely numeric identifier is treated as a height and a hash is
    /// fabricated; anything else is treated as the block hash.
    pub fn block<R: Rng>(&self, rng: &mut R, identifier: &str, now: DateTime<Utc>) -> BlockDetail {
        let feeds = &self.config.feeds;

        let parsed_height = identifier.parse::<u64>().ok();
        let height = parsed_height.unwrap_or_else(|| {
            feeds.block_height_base + rng.random_range(0..feeds.block_height_span)
        });
        let hash = match parsed_height {
            Some(_) => random_id(rng, DETAIL_ID_LEN),
            None => identifier.to_string(),
        };

        let transaction_count =
            rng.random_range(feeds.min_block_transactions..feeds.max_block_transactions);
        let listed = transaction_count.min(50);

        let transactions: Vec<BlockTransaction> = (0..listed)
            .map(|_| BlockTransaction {
                txid: random_id(rng, DETAIL_ID_LEN),
                fee: round8(rng.random::<f64>() * 0.01),
                size: rng.random_range(200..700),
                input_count: rng.random_range(1..=5),
                output_count: rng.random_range(1..=5),
                amount: round8(rng.random::<f64>() * 10.0 + 0.1),
            })
            .collect();

        let total_fees = round8(transactions.iter().map(|tx| tx.fee).sum());

        BlockDetail {
            height,
            hash,
            previous_block_hash: random_id(rng, DETAIL_ID_LEN),
            next_block_hash: (height < CHAIN_TIP_HEIGHT).then(|| random_id(rng, DETAIL_ID_LEN)),
            merkle_root: random_id(rng, DETAIL_ID_LEN),
            timestamp: past_timestamp(rng, now, 7),
            difficulty: format!("{:.2}T", rng.random::<f64>() * 10.0 + 50.0),
            nonce: rng.random::<u32>(),
            version: rng.random_range(1..=4),
            size: rng.random_range(500_000..2_500_000),
            weight: rng.random_range(1_000_000..5_000_000),
            transaction_count,
            total_fees,
            block_reward: 6.25,
            miner: DETAIL_MINERS[rng.random_range(0..DETAIL_MINERS.len())].to_string(),
            confirmations: rng.random_range(1..=100),
            transactions,
        }
    }

    /// Fabricates the detail view for an address, with exact running
    /// balance accounting over the fabricated history.
    pub fn address<R: Rng>(&self, rng: &mut R, address: &str, now: DateTime<Utc>) -> AddressDetail {
        let feeds = &self.config.feeds;
        let transaction_count = rng.random_range(10..60u32);

        let mut balance = 0.0;
        let mut total_received = 0.0;
        let mut total_sent = 0.0;

        let mut transactions: Vec<AddressTransaction> = (0..transaction_count)
            .map(|_| {
                let kind = if rng.random_bool(0.5) {
                    TransferKind::Received
                } else {
                    TransferKind::Sent
                };
                let amount = round8(rng.random::<f64>() * 2.0 + 0.01);

                match kind {
                    TransferKind::Received => {
                        balance += amount;
                        total_received += amount;
                    }
                    TransferKind::Sent => {
                        balance -= amount;
                        total_sent += amount;
                    }
                }

                AddressTransaction {
                    txid: random_id(rng, DETAIL_ID_LEN),
                    kind,
                    amount,
                    confirmations: rng.random_range(0..100),
                    timestamp: past_timestamp(rng, now, 30),
                    block_height: feeds.block_height_base
                        + rng.random_range(0..feeds.block_height_span),
                }
            })
            .collect();

        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let first_seen = transactions
            .last()
            .map_or(now, |tx| tx.timestamp);
        let last_seen = transactions
            .first()
            .map_or(now, |tx| tx.timestamp);

        AddressDetail {
            address: address.to_string(),
            balance: round8(balance.max(0.0)),
            total_received: round8(total_received),
            total_sent: round8(total_sent),
            transaction_count,
            first_seen,
            last_seen,
            transactions,
        }
    }
}

/// Fabricates a legacy-style address: `1` followed by 26 base-36 chars.
fn fabricated_address<R: Rng>(rng: &mut R) -> String {
    format!("1{}", random_id(rng, DETAIL_ID_LEN))
}

/// Uniform timestamp within the past `days` days.
fn past_timestamp<R: Rng>(rng: &mut R, now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let span_ms = days * 86_400_000;
    now - Duration::milliseconds(rng.random_range(0..span_ms))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn detail_generator() -> DetailGenerator {
        DetailGenerator::new(WatchConfig::default())
    }

    #[test]
    fn test_transaction_detail_totals_are_consistent() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let detail = detail_generator().transaction(&mut rng, "abc123", Utc::now());

        assert_eq!(detail.txid, "abc123");
        assert!(!detail.inputs.is_empty() && detail.inputs.len() <= 5);
        assert!(!detail.outputs.is_empty() && detail.outputs.len() <= 5);

        let input_sum: f64 = detail.inputs.iter().map(|i| i.amount).sum();
        let output_sum: f64 = detail.outputs.iter().map(|o| o.amount).sum();
        assert!((detail.total_input - input_sum).abs() < 1e-8);
        assert!((detail.total_output - output_sum).abs() < 1e-8);
        assert!((detail.fee - (detail.total_input - detail.total_output)).abs() < 1e-8);
    }

    #[test]
    fn test_block_detail_from_height_identifier() {
        let mut rng = ChaCha8Rng::seed_from_u64(32);
        let detail = detail_generator().block(&mut rng, "800123", Utc::now());

        assert_eq!(detail.height, 800_123);
        // Height below the tip always links to a next block
        assert!(detail.next_block_hash.is_some());
        assert_eq!(detail.hash.len(), 26);
    }

    #[test]
    fn test_block_detail_from_hash_identifier() {
        let mut rng = ChaCha8Rng::seed_from_u64(33);
        let detail = detail_generator().block(&mut rng, "deadbeefcafe", Utc::now());

        assert_eq!(detail.hash, "deadbeefcafe");
        assert!((800_000..801_000).contains(&detail.height));
    }

    #[test]
    fn test_block_detail_tip_has_no_next_hash() {
        let mut rng = ChaCha8Rng::seed_from_u64(34);
        let detail = detail_generator().block(&mut rng, "900000", Utc::now());

        assert!(detail.next_block_hash.is_none());
    }

    #[test]
    fn test_block_detail_fee_total_and_listing_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(35);
        let detail = detail_generator().block(&mut rng, "800500", Utc::now());

        assert!(detail.transactions.len() <= 50);
        let fee_sum: f64 = detail.transactions.iter().map(|tx| tx.fee).sum();
        assert!((detail.total_fees - fee_sum).abs() < 1e-8);
    }

    #[test]
    fn test_address_detail_balance_accounting() {
        let mut rng = ChaCha8Rng::seed_from_u64(36);
        let detail = detail_generator().address(&mut rng, "1BoatSLRHtKNngkdXEeobR76b53LETtpyT", Utc::now());

        let received: f64 = detail
            .transactions
            .iter()
            .filter(|tx| tx.kind == TransferKind::Received)
            .map(|tx| tx.amount)
            .sum();
        let sent: f64 = detail
            .transactions
            .iter()
            .filter(|tx| tx.kind == TransferKind::Sent)
            .map(|tx| tx.amount)
            .sum();

        assert!((detail.total_received - received).abs() < 1e-8);
        assert!((detail.total_sent - sent).abs() < 1e-8);
        assert!((detail.balance - (received - sent).max(0.0)).abs() < 1e-8);
    }

    #[test]
    fn test_address_history_is_newest_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(37);
        let detail = detail_generator().address(&mut rng, "1abc", Utc::now());

        assert!((10..60).contains(&detail.transaction_count));
        assert!(
            detail
                .transactions
                .windows(2)
                .all(|pair| pair[0].timestamp >= pair[1].timestamp)
        );
        assert!(detail.first_seen <= detail.last_seen);
    }
}
