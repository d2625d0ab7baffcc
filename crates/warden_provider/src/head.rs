use std::collections::{BTreeMap, HashMap};

use alloy_primitives::B256;
use parking_lot::Mutex;
use tokio::sync::watch;
use warden_eth::block::BlockHeader;

/// The store of operator-trusted block hashes and the headers verified
/// against them.
///
/// A single writer advances the store through [`update`](Self::update) while
/// request tasks read from it; the mutex is never held across a suspension
/// point.
#[derive(Debug)]
pub struct TrustedHeadStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    latest_number: u64,
    hashes: BTreeMap<u64, B256>,
    headers: HashMap<B256, BlockHeader>,
    waiters: BTreeMap<u64, watch::Sender<bool>>,
}

impl TrustedHeadStore {
    /// Creates a store seeded with the initial trusted head.
    pub fn new(number: u64, hash: B256) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                latest_number: number,
                hashes: BTreeMap::from([(number, hash)]),
                headers: HashMap::new(),
                waiters: BTreeMap::new(),
            }),
        }
    }

    /// Records a freshly trusted block hash.
    ///
    /// A changed hash at a known height is a reorg: it is logged and the new
    /// hash takes precedence. When the head advances, every task waiting on a
    /// now-covered height is released.
    pub fn update(&self, hash: B256, number: u64) {
        let released = {
            let mut inner = self.inner.lock();

            if let Some(existing) = inner.hashes.get(&number) {
                if *existing != hash {
                    tracing::warn!(
                        number,
                        %existing,
                        %hash,
                        "reorg detected, overwriting trusted block hash"
                    );
                }
            }
            inner.hashes.insert(number, hash);

            if number > inner.latest_number {
                inner.latest_number = number;

                let covered: Vec<u64> = inner.waiters.range(..=number).map(|(n, _)| *n).collect();
                covered
                    .into_iter()
                    .filter_map(|n| inner.waiters.remove(&n))
                    .collect()
            } else {
                Vec::new()
            }
        };

        for waiter in released {
            waiter.send_replace(true);
        }
    }

    /// The highest trusted block number.
    pub fn latest_number(&self) -> u64 {
        self.inner.lock().latest_number
    }

    /// Suspends until the trusted head reaches the given block number.
    ///
    /// Returns immediately if the head is already there. There is no timeout;
    /// cancellation comes from dropping the future.
    pub async fn wait_for(&self, number: u64) {
        let mut receiver = {
            let mut inner = self.inner.lock();
            if number <= inner.latest_number {
                return;
            }
            inner
                .waiters
                .entry(number)
                .or_insert_with(|| watch::channel(false).0)
                .subscribe()
        };

        while !*receiver.borrow_and_update() {
            if receiver.changed().await.is_err() {
                // The store was dropped; there is nothing left to wait for.
                return;
            }
        }
    }

    /// The trusted hash recorded at the given height, if any.
    pub fn recorded_hash(&self, number: u64) -> Option<B256> {
        self.inner.lock().hashes.get(&number).copied()
    }

    /// Records a hash derived from a verified parent walk. Never overwrites
    /// an operator-supplied hash.
    pub fn record_derived_hash(&self, number: u64, hash: B256) {
        self.inner.lock().hashes.entry(number).or_insert(hash);
    }

    /// The closest recorded hash at or above the given height, to anchor a
    /// backward parent walk.
    pub fn nearest_recorded_at_or_above(&self, number: u64) -> Option<(u64, B256)> {
        self.inner
            .lock()
            .hashes
            .range(number..)
            .next()
            .map(|(n, hash)| (*n, *hash))
    }

    /// A verified header previously cached under its hash.
    pub fn cached_header(&self, hash: &B256) -> Option<BlockHeader> {
        self.inner.lock().headers.get(hash).cloned()
    }

    /// Caches a verified header under its hash.
    pub fn cache_header(&self, hash: B256, header: BlockHeader) {
        self.inner.lock().headers.insert(hash, header);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;

    #[test]
    fn latest_number_is_monotonic() {
        let store = TrustedHeadStore::new(100, B256::repeat_byte(1));
        assert_eq!(store.latest_number(), 100);

        store.update(B256::repeat_byte(2), 102);
        assert_eq!(store.latest_number(), 102);

        // An update below the head records the hash without regressing.
        store.update(B256::repeat_byte(3), 101);
        assert_eq!(store.latest_number(), 102);
        assert_eq!(store.recorded_hash(101), Some(B256::repeat_byte(3)));
    }

    #[test]
    fn reorg_overwrites_recorded_hash() {
        let store = TrustedHeadStore::new(100, B256::repeat_byte(1));
        store.update(B256::repeat_byte(9), 100);
        assert_eq!(store.recorded_hash(100), Some(B256::repeat_byte(9)));
    }

    #[test]
    fn derived_hashes_never_overwrite_trusted_ones() {
        let store = TrustedHeadStore::new(100, B256::repeat_byte(1));
        store.record_derived_hash(100, B256::repeat_byte(9));
        assert_eq!(store.recorded_hash(100), Some(B256::repeat_byte(1)));

        store.record_derived_hash(99, B256::repeat_byte(5));
        assert_eq!(store.recorded_hash(99), Some(B256::repeat_byte(5)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn wait_for_releases_on_update() {
        let store = Arc::new(TrustedHeadStore::new(100, B256::repeat_byte(1)));

        // Both waiters join the same slot.
        let mut waiting = tokio::task::JoinSet::new();
        for _ in 0..2 {
            let store = store.clone();
            waiting.spawn(async move { store.wait_for(102).await });
        }

        // Give the waiters a chance to park.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(waiting.try_join_next().is_none());

        // An update below the awaited height must not release them.
        store.update(B256::repeat_byte(2), 101);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(waiting.try_join_next().is_none());

        store.update(B256::repeat_byte(3), 103);
        tokio::time::timeout(Duration::from_secs(1), async {
            while waiting.join_next().await.is_some() {}
        })
        .await
        .expect("all waiters are released by the crossing update");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn wait_for_returns_immediately_when_covered() {
        let store = TrustedHeadStore::new(100, B256::repeat_byte(1));
        // Must not suspend.
        tokio::time::timeout(Duration::from_millis(50), store.wait_for(100))
            .await
            .expect("no waiting below the head");
    }
}
