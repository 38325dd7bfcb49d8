//! In-memory document store.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;

use crate::store::model::next_timestamp;
use crate::store::{ObjectId, Store, StoreError, Track, Webhook};

/// Thread-safe store keeping every collection in a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tracks: DashMap<ObjectId, Track>,
    webhooks: DashMap<ObjectId, Webhook>,
    /// Held for writing while a track is stamped and inserted, and for reading
    /// by timestamp scans, so a scan never sees a later `ts` without every
    /// earlier one.
    track_order: RwLock<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_order(&self) -> RwLockReadGuard<'_, ()> {
        self.track_order.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_order(&self) -> RwLockWriteGuard<'_, ()> {
        self.track_order.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn sorted_tracks(&self) -> Vec<Track> {
        let _order = self.read_order();
        let mut tracks: Vec<Track> = self.tracks.iter().map(|r| r.value().clone()).collect();
        tracks.sort_by_key(|t| (t.ts, t.id));
        tracks
    }
}

impl Store for MemoryStore {
    fn insert_track(&self, mut track: Track) -> Result<Track, StoreError> {
        let _order = self.write_order();
        if self.tracks.contains_key(&track.id) {
            return Err(StoreError::DuplicateId(track.id));
        }
        track.ts = next_timestamp();
        self.tracks.insert(track.id, track.clone());
        Ok(track)
    }

    fn track(&self, id: &ObjectId) -> Result<Option<Track>, StoreError> {
        Ok(self.tracks.get(id).map(|r| r.value().clone()))
    }

    fn track_ids(&self) -> Result<Vec<ObjectId>, StoreError> {
        Ok(self.sorted_tracks().into_iter().map(|t| t.id).collect())
    }

    fn track_count(&self) -> Result<u64, StoreError> {
        Ok(self.tracks.len() as u64)
    }

    fn tracks_after(&self, ts: i64, limit: usize) -> Result<Vec<Track>, StoreError> {
        Ok(self
            .sorted_tracks()
            .into_iter()
            .filter(|t| t.ts > ts)
            .take(limit)
            .collect())
    }

    fn latest_timestamp(&self) -> Result<Option<i64>, StoreError> {
        let _order = self.read_order();
        Ok(self.tracks.iter().map(|r| r.value().ts).max())
    }

    fn delete_tracks(&self) -> Result<u64, StoreError> {
        let _order = self.write_order();
        let count = self.tracks.len() as u64;
        self.tracks.clear();
        Ok(count)
    }

    fn insert_webhook(&self, webhook: Webhook) -> Result<ObjectId, StoreError> {
        let id = webhook.id;
        if self.webhooks.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.webhooks.insert(id, webhook);
        Ok(id)
    }

    fn webhook(&self, id: &ObjectId) -> Result<Option<Webhook>, StoreError> {
        Ok(self.webhooks.get(id).map(|r| r.value().clone()))
    }

    fn delete_webhook(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self.webhooks.remove(id).is_some())
    }

    fn record_new_track(&self, now: i64) -> Result<Vec<Webhook>, StoreError> {
        let mut due = Vec::new();
        for mut entry in self.webhooks.iter_mut() {
            let hook = entry.value_mut();
            hook.trigger_count -= 1;
            if hook.trigger_count <= 0 {
                due.push(hook.clone());
                hook.trigger_count = hook.min_trigger_value;
                hook.last_invoked = now;
            }
        }
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewWebhook;

    fn track(pilot: &str) -> Track {
        Track {
            id: ObjectId::new(),
            ts: 0,
            h_date: String::new(),
            pilot: pilot.to_string(),
            glider: String::new(),
            glider_id: String::new(),
            track_length: "0.00km".into(),
            track_src_url: String::new(),
        }
    }

    #[test]
    fn test_tracks_after_is_ordered_and_limited() {
        let store = MemoryStore::new();
        let stamped: Vec<i64> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|p| store.insert_track(track(p)).unwrap().ts)
            .collect();
        assert!(stamped.windows(2).all(|w| w[0] < w[1]));

        let page: Vec<String> = store.tracks_after(0, 3).unwrap().into_iter().map(|t| t.pilot).collect();
        assert_eq!(page, vec!["a", "b", "c"]);

        let page: Vec<String> = store
            .tracks_after(stamped[2], 3)
            .unwrap()
            .into_iter()
            .map(|t| t.pilot)
            .collect();
        assert_eq!(page, vec!["d", "e"]);

        assert!(store.tracks_after(stamped[4], 3).unwrap().is_empty());
        assert_eq!(store.latest_timestamp().unwrap(), Some(stamped[4]));
    }

    #[test]
    fn test_insert_overrides_caller_timestamp() {
        let store = MemoryStore::new();
        let mut early = track("early");
        early.ts = i64::MAX;
        let first = store.insert_track(early).unwrap();
        let second = store.insert_track(track("late")).unwrap();

        assert!(first.ts < second.ts);
        let page = store.tracks_after(0, 1).unwrap();
        assert_eq!(page[0].pilot, "early");
    }

    #[test]
    fn test_paging_sees_concurrent_inserts_in_order() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.insert_track(track(&format!("{}-{}", n, i))).unwrap();
                    }
                })
            })
            .collect();

        // A reader paging on the last seen timestamp must end up with every track.
        let mut seen = 0;
        let mut after = 0;
        loop {
            let done = handles.iter().all(|h| h.is_finished());
            let page = store.tracks_after(after, 7).unwrap();
            if page.is_empty() {
                if done {
                    break;
                }
                std::thread::yield_now();
                continue;
            }
            seen += page.len();
            after = page[page.len() - 1].ts;
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(seen, 200);
        assert_eq!(store.track_count().unwrap(), 200);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let first = store.insert_track(track("a")).unwrap();
        assert_eq!(
            store.insert_track(first.clone()),
            Err(StoreError::DuplicateId(first.id))
        );
        assert_eq!(store.track_count().unwrap(), 1);
    }

    #[test]
    fn test_delete_tracks() {
        let store = MemoryStore::new();
        store.insert_track(track("a")).unwrap();
        store.insert_track(track("b")).unwrap();

        assert_eq!(store.track_count().unwrap(), 2);
        assert_eq!(store.delete_tracks().unwrap(), 2);
        assert_eq!(store.track_count().unwrap(), 0);
        assert_eq!(store.latest_timestamp().unwrap(), None);
    }

    #[test]
    fn test_record_new_track_counts_down() {
        let store = MemoryStore::new();
        let mut hook = Webhook::new(NewWebhook {
            webhook_url: "http://hook.test".into(),
            min_trigger_value: 2,
        });
        hook.last_invoked = 100;
        let id = store.insert_webhook(hook).unwrap();

        assert!(store.record_new_track(200).unwrap().is_empty());

        let due = store.record_new_track(300).unwrap();
        assert_eq!(due.len(), 1);
        // The snapshot carries the previous invocation time
        assert_eq!(due[0].last_invoked, 100);

        let stored = store.webhook(&id).unwrap().unwrap();
        assert_eq!(stored.trigger_count, 2);
        assert_eq!(stored.last_invoked, 300);

        assert!(store.delete_webhook(&id).unwrap());
        assert!(!store.delete_webhook(&id).unwrap());
    }
}
