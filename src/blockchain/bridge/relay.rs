use tracing::info;

use crate::blockchain::bridge::{Confirmation, PacketStatus};
use crate::blockchain::traits::PacketIndexer;
use crate::tools::async_support::{poll_until, Clock, PollOutcome, PollPolicy};
use crate::utils::normalize_tx_hash;

/// Poll the indexer until it correlates `tx_hash` with a packet hash.
///
/// Indexer failures only cost an attempt. Running out of attempts is not an
/// error: the packet is reported as [`PacketStatus::Pending`].
pub async fn poll_packet_hash(
    indexer: &dyn PacketIndexer,
    clock: &dyn Clock,
    tx_hash: &str,
    policy: &PollPolicy,
) -> Confirmation {
    let tx_hash = normalize_tx_hash(tx_hash);
    info!(tx_hash = %tx_hash, max_attempts = policy.max_attempts, "Waiting for packet hash");

    let outcome = poll_until(clock, policy, "packet_hash", |_| indexer.packet_hash(&tx_hash)).await;

    let status = match outcome {
        PollOutcome::Found { value, attempt } => {
            info!(tx_hash = %tx_hash, packet_hash = %value, attempt, "Packet indexed");
            PacketStatus::Indexed { packet_hash: value }
        }
        PollOutcome::Exhausted { attempts } => PacketStatus::Pending { attempts },
    };

    Confirmation { tx_hash, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::bridge::mock::ScriptedIndexer;
    use crate::core::errors::BridgeError;
    use crate::tools::async_support::ManualClock;
    use chrono::Utc;
    use std::time::Duration;

    #[tokio::test]
    async fn found_on_third_call() {
        let indexer = ScriptedIndexer::new(vec![Ok(None), Ok(None), Ok(Some("0xdead".into()))]);
        let clock = ManualClock::new(Utc::now());
        let policy = PollPolicy::new(3, Duration::from_millis(10));

        let confirmation = poll_packet_hash(&indexer, &clock, "abc123", &policy).await;

        assert_eq!(confirmation.tx_hash, "0xabc123");
        assert_eq!(confirmation.packet_hash(), Some("0xdead"));
        assert_eq!(indexer.queries(), vec!["0xabc123"; 3]);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(10); 2]);
    }

    #[tokio::test]
    async fn no_queries_after_success() {
        let indexer = ScriptedIndexer::new(vec![Ok(Some("0x01".into())), Ok(Some("0x02".into()))]);
        let clock = ManualClock::new(Utc::now());

        let confirmation =
            poll_packet_hash(&indexer, &clock, "0xfeed", &PollPolicy::default()).await;

        assert_eq!(confirmation.packet_hash(), Some("0x01"));
        assert_eq!(indexer.queries().len(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn failures_then_exhaustion_is_pending() {
        let indexer = ScriptedIndexer::new(vec![
            Err(BridgeError::NetworkError("connection reset".into())),
            Err(BridgeError::IndexerError("HTTP 500".into())),
        ]);
        let clock = ManualClock::new(Utc::now());
        let policy = PollPolicy::new(4, Duration::from_secs(5));

        let confirmation = poll_packet_hash(&indexer, &clock, "0xfeed", &policy).await;

        assert_eq!(confirmation.status, PacketStatus::Pending { attempts: 4 });
        assert_eq!(indexer.queries().len(), 4);
        assert_eq!(clock.sleeps().len(), 3);
    }
}
