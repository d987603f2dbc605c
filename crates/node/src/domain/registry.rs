use bourse_core::{ShareKey, ShareId, ShareRecord, ShareType};
use std::collections::{BTreeMap, HashMap};

/// In-memory share registry for one market node
///
/// Plain data: callers provide the synchronization. Records are grouped by
/// share type and kept ordered by share id so listings are stable.
#[derive(Debug, Default)]
pub struct ShareRegistry {
    shares: HashMap<ShareType, BTreeMap<ShareId, ShareRecord>>,
}

impl ShareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ShareKey) -> Option<&ShareRecord> {
        self.shares.get(&key.share_type)?.get(&key.share_id)
    }

    pub fn get_mut(&mut self, key: &ShareKey) -> Option<&mut ShareRecord> {
        self.shares.get_mut(&key.share_type)?.get_mut(&key.share_id)
    }

    /// Insert a new record. Hands the record back if the key is taken.
    pub fn insert(&mut self, record: ShareRecord) -> Result<(), ShareRecord> {
        let by_type = self.shares.entry(record.share_type).or_default();
        if by_type.contains_key(&record.id) {
            return Err(record);
        }
        by_type.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn remove(&mut self, key: &ShareKey) -> Option<ShareRecord> {
        let by_type = self.shares.get_mut(&key.share_type)?;
        let removed = by_type.remove(&key.share_id);
        if by_type.is_empty() {
            self.shares.remove(&key.share_type);
        }
        removed
    }

    /// Snapshot of every record of one type, ordered by share id
    pub fn list(&self, share_type: ShareType) -> Vec<ShareRecord> {
        self.shares
            .get(&share_type)
            .map(|by_type| by_type.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.shares.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
