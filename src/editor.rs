use crate::input::{sanitize, validate};
use crate::purchase::{Field, FieldValue, PurchaseEntry, PurchaseId};
use crate::store::{PurchaseStore, PurchaseUpdate};
use std::collections::HashMap;
use tracing::debug;

/// Turns keystrokes into store updates and keeps the inline error messages.
///
/// Validation is soft: a failing value is still written to the store so the
/// user can keep typing towards a valid one.
#[derive(Debug, Clone, Default)]
pub struct RowEditor {
    errors: HashMap<(PurchaseId, Field), String>,
}

impl RowEditor {
    pub fn new() -> RowEditor {
        RowEditor::default()
    }

    /// Sanitize `raw`, validate it and store it as the new text of `field`.
    /// Returns the cleaned text.
    pub fn edit(
        &mut self,
        store: &mut PurchaseStore,
        id: PurchaseId,
        field: Field,
        raw: &str,
    ) -> String {
        let cleaned = sanitize(raw);
        if store.get(id).is_none() {
            return cleaned;
        }
        self.record(id, field, &cleaned);
        store.update(
            id,
            PurchaseUpdate::field(field, FieldValue::RawText(cleaned.clone())),
        );
        debug!(%id, %field, raw, cleaned = cleaned.as_str(), "field edited");
        cleaned
    }

    /// Validate both fields of an entry that did not come through `edit`,
    /// e.g. one loaded from a file.
    pub fn check_entry(&mut self, entry: &PurchaseEntry) {
        for field in [Field::Units, Field::Price] {
            let text = entry.get(field).text();
            self.record(entry.id(), field, &text);
        }
    }

    fn record(&mut self, id: PurchaseId, field: Field, text: &str) {
        match validate(field, text) {
            Ok(_) => {
                self.errors.remove(&(id, field));
            }
            Err(e) => {
                self.errors.insert((id, field), e.to_string());
            }
        }
    }

    pub fn error(&self, id: PurchaseId, field: Field) -> Option<&str> {
        self.errors.get(&(id, field)).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drop messages of a removed row.
    pub fn forget(&mut self, id: PurchaseId) {
        self.errors.retain(|(row, _), _| *row != id);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchase::PurchaseDraft;

    #[test]
    fn test_edit_stores_cleaned_text() {
        let mut store = PurchaseStore::new();
        let mut editor = RowEditor::new();
        let id = store.ids()[0];

        assert_eq!(editor.edit(&mut store, id, Field::Units, "1.2.3"), "1.23");
        assert_eq!(editor.edit(&mut store, id, Field::Price, "10."), "10.");

        let entry = store.get(id).unwrap();
        assert_eq!(entry.units, FieldValue::from("1.23"));
        assert_eq!(entry.price, FieldValue::from("10."));
        assert!(!editor.has_errors());
    }

    #[test]
    fn test_whitespace_clears_field() {
        let mut store = PurchaseStore::new();
        let mut editor = RowEditor::new();
        let id = store.ids()[0];
        editor.edit(&mut store, id, Field::Units, "5");
        editor.edit(&mut store, id, Field::Units, "   ");
        assert!(store.get(id).unwrap().units.is_empty());
        assert_eq!(editor.error(id, Field::Units), None);
    }

    #[test]
    fn test_edit_only_touches_one_field() {
        let mut store = PurchaseStore::from_drafts(vec![PurchaseDraft {
            units: 3.0.into(),
            price: (-2.0).into(),
        }]);
        let mut editor = RowEditor::new();
        let id = store.ids()[0];
        editor.check_entry(store.get(id).unwrap());
        assert_eq!(
            editor.error(id, Field::Price),
            Some("Price must be a non-negative number")
        );

        editor.edit(&mut store, id, Field::Units, "4");
        assert_eq!(store.get(id).unwrap().price, FieldValue::Parsed(-2.0));
        assert!(editor.error(id, Field::Price).is_some());

        editor.edit(&mut store, id, Field::Price, "2");
        assert_eq!(editor.error(id, Field::Price), None);
    }

    #[test]
    fn test_invalid_value_is_still_stored() {
        let mut store = PurchaseStore::from_drafts(vec![PurchaseDraft {
            units: "abc".into(),
            price: "".into(),
        }]);
        let mut editor = RowEditor::new();
        let id = store.ids()[0];
        let entry = store.get(id).unwrap().clone();
        editor.check_entry(&entry);
        assert_eq!(
            editor.error(id, Field::Units),
            Some("Units must be a non-negative number")
        );
        assert_eq!(store.summary().total_units, 0.0);

        editor.edit(&mut store, id, Field::Units, "7");
        assert!(!editor.has_errors());
        assert_eq!(store.summary().total_units, 7.0);
    }

    #[test]
    fn test_unknown_row_is_ignored() {
        let mut store = PurchaseStore::new();
        let mut editor = RowEditor::new();
        let id = store.ids()[0];
        store.remove(id);
        editor.edit(&mut store, id, Field::Units, "5");
        assert!(store.is_empty());
    }

    #[test]
    fn test_forget_and_clear() {
        let mut store = PurchaseStore::from_drafts(vec![
            PurchaseDraft {
                units: (-1.0).into(),
                price: "x".into(),
            },
            PurchaseDraft {
                units: "y".into(),
                price: 1.0.into(),
            },
        ]);
        let mut editor = RowEditor::new();
        for entry in store.entries() {
            editor.check_entry(entry);
        }
        let ids = store.ids();
        editor.forget(ids[0]);
        assert_eq!(editor.error(ids[0], Field::Units), None);
        assert!(editor.error(ids[1], Field::Units).is_some());

        store.reset();
        editor.clear();
        assert!(!editor.has_errors());
    }
}
