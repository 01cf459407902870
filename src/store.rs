use crate::purchase::{Field, FieldValue, PurchaseDraft, PurchaseEntry, PurchaseId};
use crate::summary::Summary;
use tracing::debug;

/// Fields to replace on an existing purchase. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseUpdate {
    pub units: Option<FieldValue>,
    pub price: Option<FieldValue>,
}

impl PurchaseUpdate {
    pub fn units(value: impl Into<FieldValue>) -> Self {
        PurchaseUpdate {
            units: Some(value.into()),
            price: None,
        }
    }

    pub fn price(value: impl Into<FieldValue>) -> Self {
        PurchaseUpdate {
            units: None,
            price: Some(value.into()),
        }
    }

    pub fn field(field: Field, value: impl Into<FieldValue>) -> Self {
        match field {
            Field::Units => Self::units(value),
            Field::Price => Self::price(value),
        }
    }
}

/// Owns the ordered list of purchases and every mutation of it.
///
/// The store does not look at field contents; validation happens in the editor.
#[derive(Debug, Clone)]
pub struct PurchaseStore {
    entries: Vec<PurchaseEntry>,
    next_id: u64,
    revision: u64,
}

impl Default for PurchaseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PurchaseStore {
    /// A fresh calculator: one purchase with nothing entered.
    pub fn new() -> PurchaseStore {
        let mut store = Self::empty();
        store.add();
        store.revision = 0;
        store
    }

    pub fn empty() -> PurchaseStore {
        PurchaseStore {
            entries: Vec::new(),
            next_id: 1,
            revision: 0,
        }
    }

    pub fn from_drafts(drafts: Vec<PurchaseDraft>) -> PurchaseStore {
        let mut store = Self::empty();
        for draft in drafts {
            let id = store.fresh_id();
            store
                .entries
                .push(PurchaseEntry::new(id, draft.units, draft.price));
        }
        store
    }

    fn fresh_id(&mut self) -> PurchaseId {
        // never rewound, so ids stay unique across resets
        let id = PurchaseId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append an empty purchase and return its id.
    pub fn add(&mut self) -> PurchaseId {
        let id = self.fresh_id();
        self.entries.push(PurchaseEntry::new(
            id,
            FieldValue::default(),
            FieldValue::default(),
        ));
        self.revision += 1;
        debug!(%id, len = self.entries.len(), "purchase added");
        id
    }

    /// Replace the given fields of purchase `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: PurchaseId, update: PurchaseUpdate) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) else {
            debug!(%id, "update for unknown purchase ignored");
            return false;
        };
        if let Some(units) = update.units {
            entry.units = units;
        }
        if let Some(price) = update.price {
            entry.price = price;
        }
        self.revision += 1;
        true
    }

    /// Remove purchase `id` if present.
    pub fn remove(&mut self, id: PurchaseId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        let removed = self.entries.len() != before;
        if removed {
            self.revision += 1;
            debug!(%id, len = self.entries.len(), "purchase removed");
        }
        removed
    }

    /// Drop every purchase.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.revision += 1;
        debug!("purchases reset");
    }

    pub fn entries(&self) -> &[PurchaseEntry] {
        &self.entries
    }

    pub fn get(&self, id: PurchaseId) -> Option<&PurchaseEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<PurchaseId> {
        self.entries.iter().map(PurchaseEntry::id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped by every mutation, used to tell when a cached summary is stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.entries)
    }
}
