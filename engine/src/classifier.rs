//! Transaction classification by shard relationship.

use tessera_primitives::{ChainConfig, Header, Transaction, TxCategory};

/// Decide how `tx` relates to the shard that produced `header`.
///
/// Before cross-shard transactions are accepted every transaction on its
/// origin shard is treated as same-shard, whatever its destination.
pub fn classify_transaction(config: &ChainConfig, header: &Header, tx: &Transaction) -> TxCategory {
    if let Some(kind) = tx.staking_kind() {
        return TxCategory::Staking(kind);
    }

    let origin = tx.shard_id();
    let Ok(destination) = tx.to_shard_id() else {
        return TxCategory::Invalid;
    };
    let epoch = header.epoch;

    if header.shard_id != origin {
        return TxCategory::Invalid;
    }
    if !config.accepts_cross_tx(epoch) || origin == destination {
        return TxCategory::SameShard;
    }
    if destination < config.shard_schedule.num_shards(epoch) {
        return TxCategory::SubtractionOnly;
    }
    TxCategory::Invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_primitives::{Address, ShardId, StakingKind, U256, ZERO_ADDRESS, ZERO_HASH};

    fn header(shard_id: ShardId, epoch: u64) -> Header {
        Header {
            shard_id,
            epoch,
            number: 1,
            parent_hash: ZERO_HASH,
            state_root: ZERO_HASH,
            timestamp: 0,
            gas_limit: 1_000_000,
            coinbase: ZERO_ADDRESS,
            slashes: Vec::new(),
        }
    }

    fn transfer(from: ShardId, to: ShardId) -> Transaction {
        Transaction::transfer(0, from, to, Address::repeat_byte(1), U256::from(1u64), 21_000, 1)
    }

    fn config(cross_tx_epoch: Option<u64>) -> ChainConfig {
        ChainConfig {
            cross_tx_epoch,
            ..ChainConfig::default()
        }
    }

    #[test]
    fn test_same_shard() {
        let cfg = config(Some(0));
        assert_eq!(classify_transaction(&cfg, &header(0, 1), &transfer(0, 0)), TxCategory::SameShard);
    }

    #[test]
    fn test_subtraction_only() {
        let cfg = config(Some(0));
        assert_eq!(
            classify_transaction(&cfg, &header(0, 1), &transfer(0, 2)),
            TxCategory::SubtractionOnly
        );
    }

    #[test]
    fn test_destination_out_of_range() {
        let cfg = config(Some(0));
        assert_eq!(classify_transaction(&cfg, &header(0, 1), &transfer(0, 4)), TxCategory::Invalid);
        assert_eq!(classify_transaction(&cfg, &header(0, 1), &transfer(0, 5)), TxCategory::Invalid);
    }

    #[test]
    fn test_wrong_origin_shard() {
        let cfg = config(Some(0));
        assert_eq!(classify_transaction(&cfg, &header(1, 1), &transfer(0, 0)), TxCategory::Invalid);
        assert_eq!(classify_transaction(&cfg, &header(1, 1), &transfer(0, 1)), TxCategory::Invalid);
    }

    #[test]
    fn test_cross_shard_epoch_threshold() {
        let cfg = config(Some(5));
        assert_eq!(classify_transaction(&cfg, &header(0, 4), &transfer(0, 2)), TxCategory::SameShard);
        assert_eq!(
            classify_transaction(&cfg, &header(0, 5), &transfer(0, 2)),
            TxCategory::SubtractionOnly
        );
    }

    #[test]
    fn test_cross_shard_never_enabled() {
        let cfg = config(None);
        assert_eq!(
            classify_transaction(&cfg, &header(0, 1_000), &transfer(0, 9)),
            TxCategory::SameShard
        );
    }

    #[test]
    fn test_staking_wins() {
        let cfg = config(Some(0));
        let tx = Transaction::staking(0, 3, StakingKind::CollectRewards, vec![], 30_000, 1);
        assert_eq!(
            classify_transaction(&cfg, &header(0, 1), &tx),
            TxCategory::Staking(StakingKind::CollectRewards)
        );
    }

    #[test]
    fn test_missing_destination_is_invalid() {
        let cfg = config(Some(0));
        let mut tx = transfer(0, 0);
        tx.to_shard_id = None;
        assert_eq!(classify_transaction(&cfg, &header(0, 1), &tx), TxCategory::Invalid);
    }

    #[test]
    fn test_shard_count_follows_schedule() {
        use tessera_primitives::{ShardSchedule, ShardingEpoch};
        let mut cfg = config(Some(0));
        cfg.shard_schedule = ShardSchedule::new(vec![
            ShardingEpoch {
                from_epoch: 0,
                num_shards: 2,
            },
            ShardingEpoch {
                from_epoch: 10,
                num_shards: 4,
            },
        ])
        .unwrap();
        assert_eq!(classify_transaction(&cfg, &header(0, 9), &transfer(0, 3)), TxCategory::Invalid);
        assert_eq!(
            classify_transaction(&cfg, &header(0, 10), &transfer(0, 3)),
            TxCategory::SubtractionOnly
        );
    }
}
