use crate::{Catalog, CatalogError, PackKey, RarityGroups};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

type Slot = Arc<Mutex<Option<Arc<RarityGroups>>>>;

/// Per-pack rarity groups, built once and shared read-only afterwards.
///
/// The outer map lock is only held long enough to find a key's slot. Builds
/// lock that slot, so concurrent callers for one pack wait for a single
/// catalog fetch while other packs proceed.
#[derive(Debug, Default)]
pub struct RarityGroupCache {
    slots: Mutex<HashMap<PackKey, Slot>>,
}

impl RarityGroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<F>(
        &self,
        key: &PackKey,
        build: F,
    ) -> Result<Arc<RarityGroups>, CatalogError>
    where
        F: FnOnce() -> Result<RarityGroups, CatalogError>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.clone()).or_default().clone()
        };
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(groups) = entry.as_ref() {
            return Ok(groups.clone());
        }
        let groups = match build() {
            Ok(groups) => Arc::new(groups),
            Err(err) => {
                drop(entry);
                self.forget_empty(key, &slot);
                return Err(err);
            }
        };
        log::debug!(
            "built rarity groups for {key}: {} cards in {} rarities",
            groups.card_count(),
            groups.rarities().count()
        );
        *entry = Some(groups.clone());
        Ok(groups)
    }

    pub fn load(
        &self,
        catalog: &dyn Catalog,
        key: &PackKey,
    ) -> Result<Arc<RarityGroups>, CatalogError> {
        self.get_or_build(key, || catalog.rarity_groups(key))
    }

    /// Drops `key` after a failed build, unless another caller replaced the
    /// slot, filled it, or is building into it right now.
    fn forget_empty(&self, key: &PackKey, slot: &Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = slots.get(key) else {
            return;
        };
        if !Arc::ptr_eq(stored, slot) {
            return;
        }
        let empty = match stored.try_lock() {
            Ok(entry) => entry.is_none(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().is_none(),
            Err(TryLockError::WouldBlock) => false,
        };
        if empty {
            slots.remove(key);
        }
    }

    pub fn get(&self, key: &PackKey) -> Option<Arc<RarityGroups>> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(key)?.clone()
        };
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.clone()
    }

    /// Drops one pack's groups, for callers whose catalog changed.
    pub fn invalidate(&self, key: &PackKey) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.clear();
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Card;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(name: &str) -> PackKey {
        PackKey {
            name: name.to_string(),
            series: "Base".to_string(),
            release_date: "1999-01-09".to_string(),
            code: "BS".to_string(),
        }
    }

    fn groups() -> RarityGroups {
        RarityGroups::from_cards(vec![Card::new("c1", "1", "Common")])
    }

    #[test]
    fn builds_once_per_key() {
        let cache = RarityGroupCache::new();
        let builds = AtomicUsize::new(0);
        let build = || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(groups())
        };
        let first = cache.get_or_build(&key("Base"), build).expect("first");
        let second = cache.get_or_build(&key("Base"), build).expect("second");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_build_is_not_cached() {
        let cache = RarityGroupCache::new();
        let err = cache
            .get_or_build(&key("Base"), || Err(CatalogError::Source("offline".into())))
            .expect_err("error");
        assert_eq!(err, CatalogError::Source("offline".into()));
        assert!(cache.get(&key("Base")).is_none());
        cache.get_or_build(&key("Base"), || Ok(groups())).expect("retry");
        assert!(cache.get(&key("Base")).is_some());
    }

    #[test]
    fn failed_builds_leave_no_entries() {
        let cache = RarityGroupCache::new();
        for idx in 0..1000 {
            let missing = key(&format!("Missing {idx}"));
            let err = cache
                .get_or_build(&missing, || Err(CatalogError::UnknownPack(missing.clone())))
                .expect_err("unknown");
            assert!(matches!(err, CatalogError::UnknownPack(_)));
        }
        assert!(cache.is_empty());
        assert!(cache.slots.lock().expect("map").is_empty());

        cache.get_or_build(&key("Base"), || Ok(groups())).expect("build");
        let _ = cache.get_or_build(&key("Jungle"), || Err(CatalogError::Source("down".into())));
        let slots = cache.slots.lock().expect("map");
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key(&key("Base")));
    }

    #[test]
    fn concurrent_callers_share_one_build() {
        let cache = Arc::new(RarityGroupCache::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let builds = builds.clone();
                std::thread::spawn(move || {
                    cache
                        .get_or_build(&key("Base"), || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            Ok(groups())
                        })
                        .expect("build")
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("join"))
            .collect();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let cache = RarityGroupCache::new();
        cache.get_or_build(&key("Base"), || Ok(groups())).expect("build");
        cache.invalidate(&key("Base"));
        assert!(cache.is_empty());
        let rebuilt = cache
            .get_or_build(&key("Base"), || Ok(RarityGroups::default()))
            .expect("rebuild");
        assert!(rebuilt.is_empty());
    }
}
