use crate::models::PropertyRecord;
use std::collections::HashMap;

/// Result of matching ranked identifiers back onto the inventory
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    /// Matched properties in ranked order
    pub properties: Vec<PropertyRecord>,
    /// Ranked identifiers with no property in the snapshot
    pub unmatched: Vec<u64>,
}

/// Lookup index over one inventory snapshot
///
/// Built once per request so reconciliation runs in
/// O(|ranked| + |inventory|) instead of scanning the inventory per id.
#[derive(Debug)]
pub struct InventoryIndex {
    slots: Vec<Option<PropertyRecord>>,
    by_id: HashMap<u64, usize>,
}

impl InventoryIndex {
    pub fn new(inventory: Vec<PropertyRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(inventory.len());

        for (slot, record) in inventory.iter().enumerate() {
            // Store ids are positive; anything else can never be ranked
            if let Ok(id) = u64::try_from(record.id) {
                by_id.entry(id).or_insert(slot);
            }
        }

        Self {
            slots: inventory.into_iter().map(Some).collect(),
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Emit the indexed properties in `ranked` order
    ///
    /// Unknown ids are skipped and reported in [`Reconciled::unmatched`].
    /// A repeated id yields its property only once.
    pub fn reconcile(mut self, ranked: &[u64]) -> Reconciled {
        let mut result = Reconciled {
            properties: Vec::with_capacity(ranked.len().min(self.slots.len())),
            unmatched: Vec::new(),
        };

        for id in ranked {
            match self.by_id.get(id) {
                Some(&slot) => {
                    if let Some(record) = self.slots[slot].take() {
                        result.properties.push(record);
                    }
                }
                None => {
                    tracing::debug!("Ranked property {} is not in the inventory snapshot", id);
                    result.unmatched.push(*id);
                }
            }
        }

        result
    }
}

/// Reconcile ranked identifiers against an inventory snapshot
pub fn reconcile(ranked: &[u64], inventory: Vec<PropertyRecord>) -> Reconciled {
    InventoryIndex::new(inventory).reconcile(ranked)
}
