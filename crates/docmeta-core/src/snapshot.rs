//! Current/original value maps for every registered field.

use std::collections::HashMap;

use crate::fields::{FieldDescriptor, FIELDS};

/// The values of all fields for one open document.
///
/// `original` is the state last loaded or committed; `current` holds the
/// values being edited. Both maps always carry every registry id and never
/// hold a missing value (absent fields are empty strings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSnapshot {
    current: HashMap<&'static str, String>,
    original: HashMap<&'static str, String>,
}

impl MetadataSnapshot {
    /// Build a snapshot by reading every field in registry order.
    pub fn read_with<F>(mut read: F) -> Self
    where
        F: FnMut(&FieldDescriptor) -> String,
    {
        let mut current = HashMap::with_capacity(FIELDS.len());
        for field in FIELDS.iter() {
            current.insert(field.id, read(field));
        }
        let original = current.clone();
        Self { current, original }
    }

    /// A snapshot with every field empty.
    pub fn empty() -> Self {
        Self::read_with(|_| String::new())
    }

    /// Current value of a field (empty for unknown ids).
    pub fn current(&self, id: &str) -> &str {
        self.current.get(id).map(String::as_str).unwrap_or("")
    }

    /// Value as of the last load or commit.
    pub fn original(&self, id: &str) -> &str {
        self.original.get(id).map(String::as_str).unwrap_or("")
    }

    /// Fields paired with their current values, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &str)> + '_ {
        FIELDS.iter().map(move |f| (f, self.current(f.id)))
    }

    /// Fields whose current value differs from the original.
    pub fn changed_fields(&self) -> Vec<&'static FieldDescriptor> {
        FIELDS
            .iter()
            .filter(|f| self.current(f.id) != self.original(f.id))
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        FIELDS
            .iter()
            .any(|f| self.current(f.id) != self.original(f.id))
    }

    pub(crate) fn set_current(&mut self, id: &'static str, value: String) {
        self.current.insert(id, value);
    }

    pub(crate) fn trim_current(&mut self) {
        for value in self.current.values_mut() {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }

    /// Make the current values the new baseline.
    pub(crate) fn commit(&mut self) {
        self.original = self.current.clone();
    }

    /// Drop uncommitted edits.
    pub(crate) fn revert(&mut self) {
        self.current = self.original.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetadataSnapshot {
        MetadataSnapshot::read_with(|f| match f.id {
            "dc:title" => "Report".to_string(),
            "Company" => "Acme".to_string(),
            _ => String::new(),
        })
    }

    #[test]
    fn test_fresh_snapshot_has_no_changes() {
        let snap = sample();
        for f in FIELDS.iter() {
            assert_eq!(snap.current(f.id), snap.original(f.id));
        }
        assert!(!snap.has_changes());
        assert_eq!(snap.current("dc:title"), "Report");
        assert_eq!(snap.current("Manager"), "");
    }

    #[test]
    fn test_original_is_not_aliased() {
        let mut snap = sample();
        snap.set_current("dc:title", "Changed".to_string());
        assert_eq!(snap.original("dc:title"), "Report");
        assert!(snap.has_changes());
        let changed: Vec<_> = snap.changed_fields().iter().map(|f| f.id).collect();
        assert_eq!(changed, vec!["dc:title"]);
    }

    #[test]
    fn test_commit_and_revert() {
        let mut snap = sample();
        snap.set_current("Company", "Globex".to_string());
        snap.revert();
        assert_eq!(snap.current("Company"), "Acme");

        snap.set_current("Company", "Globex".to_string());
        snap.commit();
        assert_eq!(snap.original("Company"), "Globex");
        assert!(!snap.has_changes());
    }

    #[test]
    fn test_iter_follows_registry_order() {
        let snap = MetadataSnapshot::empty();
        let ids: Vec<_> = snap.iter().map(|(f, _)| f.id).collect();
        let expected: Vec<_> = FIELDS.iter().map(|f| f.id).collect();
        assert_eq!(ids, expected);
    }
}
