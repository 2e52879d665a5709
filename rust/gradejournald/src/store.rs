use crate::schema::{Field, StudentRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{} must not be empty", .field.name())]
    Validation { field: Field },
    #[error("no student selected")]
    NoSelection,
    #[error("index {index} out of range for {len} records")]
    IndexOutOfRange { index: i64, len: usize },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation { .. } => "validation_failed",
            StoreError::NoSelection => "no_selection",
            StoreError::IndexOutOfRange { .. } => "index_out_of_range",
        }
    }
}

/// The session's record collection plus the edit-form selection.
#[derive(Debug, Default)]
pub struct JournalStore {
    records: Vec<StudentRecord>,
    selected: Option<usize>,
    loaded_at: Option<DateTime<Utc>>,
    source: Option<String>,
}

impl JournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn bulk_load(&mut self, records: Vec<StudentRecord>, source: impl Into<String>) {
        self.records = records;
        self.selected = None;
        self.loaded_at = Some(Utc::now());
        self.source = Some(source.into());
    }

    pub fn select(&mut self, index: i64) -> Result<&StudentRecord, StoreError> {
        let len = self.records.len();
        let idx = usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        self.selected = Some(idx);
        Ok(&self.records[idx])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Appends and returns the new index. Selection is left as is.
    pub fn add(&mut self, record: StudentRecord) -> Result<usize, StoreError> {
        let record = validated(record)?;
        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    /// Overwrites the selected record and clears the selection.
    pub fn update_selected(&mut self, record: StudentRecord) -> Result<usize, StoreError> {
        let idx = self.selected_index()?;
        let record = validated(record)?;
        self.records[idx] = record;
        self.selected = None;
        Ok(idx)
    }

    pub fn delete_selected(&mut self) -> Result<(usize, StudentRecord), StoreError> {
        let idx = self.selected_index()?;
        let removed = self.records.remove(idx);
        self.selected = None;
        Ok((idx, removed))
    }

    /// Distinct non-empty classes in plain string order ("10A" < "9A").
    pub fn enumerate_classes(&self) -> Vec<String> {
        enumerate_classes(&self.records)
    }

    fn selected_index(&self) -> Result<usize, StoreError> {
        match self.selected {
            Some(i) if i < self.records.len() => Ok(i),
            _ => Err(StoreError::NoSelection),
        }
    }
}

pub fn enumerate_classes(records: &[StudentRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.class.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn validated(mut record: StudentRecord) -> Result<StudentRecord, StoreError> {
    record.class = record.class.trim().to_string();
    record.full_name = record.full_name.trim().to_string();
    if record.class.is_empty() {
        return Err(StoreError::Validation { field: Field::Class });
    }
    if record.full_name.is_empty() {
        return Err(StoreError::Validation {
            field: Field::FullName,
        });
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(class: &str, name: &str) -> StudentRecord {
        StudentRecord {
            class: class.to_string(),
            full_name: name.to_string(),
            math: "4".to_string(),
            ..Default::default()
        }
    }

    fn five() -> JournalStore {
        let mut store = JournalStore::new();
        store.bulk_load(
            (0..5).map(|i| rec("10A", &format!("Student {i}"))).collect(),
            "test",
        );
        store
    }

    #[test]
    fn delete_selected_shifts_later_records_down() {
        let mut store = five();
        store.select(2).expect("select");
        let (idx, removed) = store.delete_selected().expect("delete");
        assert_eq!(idx, 2);
        assert_eq!(removed.full_name, "Student 2");
        assert_eq!(store.len(), 4);
        let names: Vec<&str> = store.records().iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["Student 0", "Student 1", "Student 3", "Student 4"]);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn bulk_load_clears_selection() {
        let mut store = five();
        store.select(1).expect("select");
        store.bulk_load(vec![rec("9A", "Other")], "reload");
        assert_eq!(store.selected(), None);
        assert_eq!(store.update_selected(rec("9A", "X")), Err(StoreError::NoSelection));
        assert_eq!(store.delete_selected().unwrap_err(), StoreError::NoSelection);
        assert_eq!(store.len(), 1);
        assert_eq!(store.source(), Some("reload"));
        assert!(store.loaded_at().is_some());
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut store = five();
        assert_eq!(
            store.select(5).unwrap_err(),
            StoreError::IndexOutOfRange { index: 5, len: 5 }
        );
        assert_eq!(
            store.select(-1).unwrap_err(),
            StoreError::IndexOutOfRange { index: -1, len: 5 }
        );
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn add_requires_class_and_name() {
        let mut store = JournalStore::new();
        assert_eq!(
            store.add(rec("  ", "Name")),
            Err(StoreError::Validation { field: Field::Class })
        );
        assert_eq!(
            store.add(rec("10A", "")),
            Err(StoreError::Validation {
                field: Field::FullName
            })
        );
        assert!(store.is_empty());
        assert_eq!(store.add(rec(" 10A ", " Иванов ")), Ok(0));
        assert_eq!(store.records()[0].class, "10A");
        assert_eq!(store.records()[0].full_name, "Иванов");
    }

    #[test]
    fn add_keeps_selection() {
        let mut store = five();
        store.select(3).expect("select");
        store.add(rec("11A", "New")).expect("add");
        assert_eq!(store.selected(), Some(3));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn update_overwrites_in_place_then_deselects() {
        let mut store = five();
        store.select(1).expect("select");
        let idx = store.update_selected(rec("11B", "Renamed")).expect("update");
        assert_eq!(idx, 1);
        assert_eq!(store.records()[1].full_name, "Renamed");
        assert_eq!(store.len(), 5);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn rejected_update_leaves_store_and_selection() {
        let mut store = five();
        store.select(4).expect("select");
        assert!(store.update_selected(rec("", "Nobody")).is_err());
        assert_eq!(store.selected(), Some(4));
        assert_eq!(store.records()[4].full_name, "Student 4");
    }

    #[test]
    fn classes_sort_lexicographically() {
        let mut store = JournalStore::new();
        store.bulk_load(
            vec![rec("10B", "a"), rec("10A", "b"), rec("9A", "c"), rec(" 10A", "d"), rec("", "e")],
            "test",
        );
        assert_eq!(store.enumerate_classes(), vec!["10A", "10B", "9A"]);
    }
}
