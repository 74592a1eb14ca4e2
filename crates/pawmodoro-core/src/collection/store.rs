//! Unlocked collectibles and the companion selection.
//!
//! [`Collection`] keeps the full entry list in memory, writes it back to a
//! [`KvStore`] after every mutation and notifies subscribers of new unlocks.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::catalog::{Catalog, CollectibleDefinition};
use super::progress::{session_xp, CompanionProgress};
use crate::storage::KvStore;

/// kv key holding the persisted entry array.
pub const COLLECTION_KEY: &str = "collection";

/// One unlocked collectible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    #[serde(rename = "petId")]
    pub collectible_id: String,
    pub unlocked_at: DateTime<Utc>,
    pub is_companion: bool,
    pub progress: CompanionProgress,
}

/// Operations the reward path needs from a collection.
pub trait CollectionStore {
    /// Create an entry for `id`. Returns `false` (and does nothing) if the
    /// id is already unlocked or unknown.
    fn unlock(&mut self, id: &str) -> bool;

    /// Make `id` the only companion. Returns `false` if `id` is not unlocked.
    fn set_companion(&mut self, id: &str) -> bool;

    fn is_unlocked(&self, id: &str) -> bool;

    fn list_unlocked(&self) -> &[CollectionEntry];
}

pub type UnlockSubscriber = Box<dyn FnMut(&CollectibleDefinition)>;

/// Persisted collection.
pub struct Collection<K> {
    kv: K,
    catalog: Arc<Catalog>,
    entries: Vec<CollectionEntry>,
    subscribers: Vec<UnlockSubscriber>,
}

/// Lenient on-disk shape: every field but the id may be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    pet_id: String,
    #[serde(default)]
    unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_companion: bool,
    #[serde(default)]
    progress: Option<CompanionProgress>,
}

impl<K: KvStore> Collection<K> {
    /// Read the persisted collection once and normalize it.
    ///
    /// Unreadable data falls back to an empty collection. When nothing was
    /// persisted yet, the catalog's starter is granted.
    pub fn load(kv: K, catalog: Arc<Catalog>) -> Self {
        let raw = match kv.kv_get(COLLECTION_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read collection; starting empty");
                None
            }
        };

        let fresh = raw.is_none();
        let stored: Vec<StoredEntry> = match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "unparseable collection data; starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut collection = Self {
            kv,
            entries: normalize(stored, &catalog),
            catalog,
            subscribers: Vec::new(),
        };

        if fresh {
            if let Some(starter) = collection.catalog.starter().map(String::from) {
                collection.unlock(&starter);
            }
        }
        collection
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Register a callback fired with the definition of every new unlock.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CollectibleDefinition) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn entry(&self, id: &str) -> Option<&CollectionEntry> {
        self.entries.iter().find(|e| e.collectible_id == id)
    }

    /// Definition of the current companion, if any.
    pub fn companion(&self) -> Option<&CollectibleDefinition> {
        let entry = self.entries.iter().find(|e| e.is_companion)?;
        self.catalog.get(&entry.collectible_id)
    }

    pub fn companion_entry(&self) -> Option<&CollectionEntry> {
        self.entries.iter().find(|e| e.is_companion)
    }

    pub fn progress(&self, id: &str) -> Option<CompanionProgress> {
        self.entry(id).map(|e| e.progress)
    }

    /// Grant XP for a finished run to the companion. Returns the XP granted.
    pub fn award_session_xp(&mut self, work_minutes: u32, cycles: u32) -> u32 {
        let xp = session_xp(work_minutes, cycles);
        let Some(entry) = self.entries.iter_mut().find(|e| e.is_companion) else {
            return 0;
        };
        let levels = entry.progress.add_xp(xp);
        if levels > 0 {
            info!(
                id = %entry.collectible_id,
                level = entry.progress.level,
                "companion levelled up"
            );
        }
        self.persist();
        xp
    }

    /// Locked catalog entries in catalog order.
    pub fn locked(&self) -> Vec<&CollectibleDefinition> {
        self.catalog
            .entries()
            .iter()
            .filter(|d| !self.is_unlocked(&d.id))
            .collect()
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to encode collection");
                return;
            }
        };
        if let Err(e) = self.kv.kv_set(COLLECTION_KEY, &json) {
            warn!(error = %e, "failed to persist collection");
        }
    }
}

impl<K: KvStore> CollectionStore for Collection<K> {
    fn unlock(&mut self, id: &str) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        let Some(def) = self.catalog.get(id).cloned() else {
            warn!(id, "ignoring unlock of unknown collectible");
            return false;
        };

        let first = self.entries.is_empty();
        self.entries.push(CollectionEntry {
            collectible_id: def.id.clone(),
            unlocked_at: Utc::now(),
            is_companion: first,
            progress: CompanionProgress::default(),
        });
        self.persist();
        info!(id = %def.id, rarity = ?def.rarity, "collectible unlocked");

        for subscriber in &mut self.subscribers {
            subscriber(&def);
        }
        true
    }

    fn set_companion(&mut self, id: &str) -> bool {
        if !self.is_unlocked(id) {
            return false;
        }
        for entry in &mut self.entries {
            entry.is_companion = entry.collectible_id == id;
        }
        self.persist();
        true
    }

    fn is_unlocked(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.collectible_id == id)
    }

    fn list_unlocked(&self) -> &[CollectionEntry] {
        &self.entries
    }
}

impl<K> fmt::Debug for Collection<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

/// Default missing fields, drop unknown and duplicate ids, keep at most
/// one companion.
fn normalize(stored: Vec<StoredEntry>, catalog: &Catalog) -> Vec<CollectionEntry> {
    let now = Utc::now();
    let mut entries: Vec<CollectionEntry> = Vec::with_capacity(stored.len());
    let mut has_companion = false;

    for s in stored {
        if !catalog.contains(&s.pet_id) {
            warn!(id = %s.pet_id, "dropping collection entry not in catalog");
            continue;
        }
        if entries.iter().any(|e| e.collectible_id == s.pet_id) {
            continue;
        }
        let is_companion = s.is_companion && !has_companion;
        has_companion |= is_companion;
        entries.push(CollectionEntry {
            collectible_id: s.pet_id,
            unlocked_at: s.unlocked_at.unwrap_or(now),
            is_companion,
            progress: s.progress.unwrap_or_default(),
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fresh() -> Collection<Rc<MemoryKv>> {
        Collection::load(Rc::new(MemoryKv::new()), Arc::new(Catalog::builtin()))
    }

    #[test]
    fn fresh_install_grants_starter_as_companion() {
        let c = fresh();
        assert_eq!(c.list_unlocked().len(), 1);
        assert!(c.is_unlocked("focus-buddy"));
        assert_eq!(c.companion().map(|d| d.id.as_str()), Some("focus-buddy"));
        // The starter levels up from scratch like any other unlock.
        assert_eq!(c.progress("focus-buddy"), Some(CompanionProgress::default()));
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut c = fresh();
        assert!(c.unlock("nobita"));
        let first = c.entry("nobita").unwrap().unlocked_at;
        assert!(!c.unlock("nobita"));
        assert_eq!(c.list_unlocked().iter().filter(|e| e.collectible_id == "nobita").count(), 1);
        assert_eq!(c.entry("nobita").unwrap().unlocked_at, first);
    }

    #[test]
    fn later_unlocks_are_not_companions() {
        let mut c = fresh();
        c.unlock("nobita");
        assert!(!c.entry("nobita").unwrap().is_companion);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut c = fresh();
        assert!(!c.unlock("pikachu"));
        assert!(!c.set_companion("pikachu"));
        assert_eq!(c.list_unlocked().len(), 1);
    }

    #[test]
    fn set_companion_moves_flag() {
        let mut c = fresh();
        c.unlock("shizuka");
        assert!(c.set_companion("shizuka"));
        let companions: Vec<_> = c
            .list_unlocked()
            .iter()
            .filter(|e| e.is_companion)
            .map(|e| e.collectible_id.as_str())
            .collect();
        assert_eq!(companions, vec!["shizuka"]);
    }

    #[test]
    fn set_companion_on_locked_id_is_noop() {
        let mut c = fresh();
        assert!(!c.set_companion("doraemon"));
        assert_eq!(c.companion().map(|d| d.id.as_str()), Some("focus-buddy"));
        // The starter levels up from scratch like any other unlock.
        assert_eq!(c.progress("focus-buddy"), Some(CompanionProgress::default()));
    }

    #[test]
    fn subscribers_receive_new_unlocks_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut c = fresh();
        let sink = Rc::clone(&seen);
        c.subscribe(move |def| sink.borrow_mut().push(def.id.clone()));
        c.unlock("nobita");
        c.unlock("nobita");
        c.unlock("suneo");
        assert_eq!(*seen.borrow(), vec!["nobita".to_string(), "suneo".to_string()]);
    }

    #[test]
    fn mutations_are_persisted_and_reloaded() {
        let kv = Rc::new(MemoryKv::new());
        let catalog = Arc::new(Catalog::builtin());
        {
            let mut c = Collection::load(Rc::clone(&kv), Arc::clone(&catalog));
            c.unlock("suneo");
            c.set_companion("suneo");
        }
        let c = Collection::load(kv, catalog);
        assert!(c.is_unlocked("suneo"));
        assert!(c.is_unlocked("focus-buddy"));
        assert_eq!(c.companion().map(|d| d.id.as_str()), Some("suneo"));
    }

    #[test]
    fn load_normalizes_stored_entries() {
        let kv = MemoryKv::new();
        kv.kv_set(
            COLLECTION_KEY,
            r#"[
                {"petId": "nobita", "isCompanion": true},
                {"petId": "nobita", "isCompanion": false},
                {"petId": "ghost", "isCompanion": true},
                {"petId": "suneo", "isCompanion": true, "progress": {"level": 3, "xp": 5, "xpToNextLevel": 300}}
            ]"#,
        )
        .unwrap();
        let c = Collection::load(kv, Arc::new(Catalog::builtin()));
        let ids: Vec<_> = c.list_unlocked().iter().map(|e| e.collectible_id.as_str()).collect();
        assert_eq!(ids, vec!["nobita", "suneo"]);
        assert!(c.entry("nobita").unwrap().is_companion);
        assert!(!c.entry("suneo").unwrap().is_companion);
        assert_eq!(c.progress("nobita"), Some(CompanionProgress::default()));
        assert_eq!(c.progress("suneo").unwrap().level, 3);
        // Persisted data existed, so no starter grant.
        assert!(!c.is_unlocked("focus-buddy"));
    }

    #[test]
    fn unparseable_data_falls_back_to_empty() {
        let kv = MemoryKv::new();
        kv.kv_set(COLLECTION_KEY, "not json").unwrap();
        let c = Collection::load(kv, Arc::new(Catalog::builtin()));
        assert!(c.list_unlocked().is_empty());
        assert!(c.companion().is_none());
    }

    #[test]
    fn award_session_xp_goes_to_companion() {
        let mut c = fresh();
        assert_eq!(c.award_session_xp(25, 4), 100);
        let p = c.progress("focus-buddy").unwrap();
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0);
    }

    #[test]
    fn award_without_companion_grants_nothing() {
        let kv = MemoryKv::new();
        kv.kv_set(COLLECTION_KEY, "[]").unwrap();
        let mut c = Collection::load(kv, Arc::new(Catalog::builtin()));
        assert_eq!(c.award_session_xp(25, 4), 0);
    }
}
